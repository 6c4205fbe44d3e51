//! Entity model: typed, weighted graph nodes with ordered additional fields.
//!
//! An entity owns its fields exclusively; field order is encoding order.

mod field;

pub use field::{Field, MatchingRule};

use crate::error::{Result, TransformError};
use crate::xml::{self, ToXml};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::io::Write;

/// Field carrying the text Maltego renders on the incoming edge
pub const EDGE_LABEL_FIELD: &str = "link#maltego.link.label";
/// Field telling Maltego to display the edge label
pub const EDGE_SHOW_LABEL_FIELD: &str = "link#maltego.link.show-label";
/// Prefix of edge property fields, followed by the property index
pub const EDGE_PROPERTY_PREFIX: &str = "link#";

/// An entity returned to Maltego.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    entity_type: String,
    value: String,
    weight: i32,
    fields: Vec<Field>,
    #[serde(skip)]
    has_edge_label: bool,
}

impl Entity {
    /// Create an entity with weight 0 and no fields
    pub fn new(entity_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            weight: 0,
            fields: Vec::new(),
            has_edge_label: false,
        }
    }

    /// Builder for callers whose type or value may be missing
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Vec<Field> {
        &mut self.fields
    }

    pub fn has_edge_label(&self) -> bool {
        self.has_edge_label
    }

    /// Append a field; returns the entity for chaining
    pub fn add_field(&mut self, field: Field) -> &mut Self {
        self.fields.push(field);
        self
    }

    /// Build a field and append it in one step
    pub fn add_additional_field(
        &mut self,
        name: impl Into<String>,
        display_name: Option<&str>,
        value: Option<&str>,
        matching_rule: MatchingRule,
    ) -> Result<&mut Self> {
        let mut field = Field::new(name)?.with_matching_rule(matching_rule);
        if let Some(display_name) = display_name {
            field = field.with_display_name(display_name);
        }
        if let Some(value) = value {
            field = field.with_value(value);
        }
        Ok(self.add_field(field))
    }

    /// Attach an edge label and optional edge properties as `(name, value)` pairs.
    ///
    /// Appends the label field, the show-label field and one `link#<i>` field
    /// per property. Only one edge label per entity is allowed.
    pub fn add_edge_label(&mut self, label: impl Into<String>, properties: &[(&str, &str)]) -> Result<()> {
        if self.has_edge_label {
            return Err(TransformError::InvalidState(
                "Only one edge label per edge is allowed".to_string(),
            ));
        }

        self.fields
            .push(Field::named(EDGE_LABEL_FIELD.to_string()).with_value(label));
        self.fields
            .push(Field::named(EDGE_SHOW_LABEL_FIELD.to_string()).with_value("1"));

        for (i, (name, value)) in properties.iter().enumerate() {
            self.fields.push(
                Field::named(format!("{}{}", EDGE_PROPERTY_PREFIX, i))
                    .with_display_name(*name)
                    .with_value(*value),
            );
        }

        self.has_edge_label = true;
        Ok(())
    }
}

impl ToXml for Entity {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("Entity");
        xml::push_attribute(&mut start, "Type", &self.entity_type);
        writer.write_event(Event::Start(start))?;

        xml::write_text_element(writer, "Value", &self.value)?;
        xml::write_text_element(writer, "Weight", &self.weight.to_string())?;

        writer.write_event(Event::Start(BytesStart::new("AdditionalFields")))?;
        for field in &self.fields {
            field.write_xml(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new("AdditionalFields")))?;

        writer.write_event(Event::End(BytesEnd::new("Entity")))?;
        Ok(())
    }
}

/// Collects entity parts that may be absent and validates them on `build`.
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entity_type: Option<String>,
    value: Option<String>,
    weight: i32,
    fields: Vec<Field>,
}

impl EntityBuilder {
    pub fn entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Fails with `InvalidArgument` if the type or the value was never set.
    ///
    /// An entity whose fields already include an edge label field counts as
    /// labelled, so `add_edge_label` on it fails.
    pub fn build(self) -> Result<Entity> {
        let entity_type = self.entity_type.ok_or_else(|| {
            TransformError::InvalidArgument("Entity type cannot be absent".to_string())
        })?;
        let value = self.value.ok_or_else(|| {
            TransformError::InvalidArgument("Entity value cannot be absent".to_string())
        })?;

        let mut entity = Entity::new(entity_type, value).with_weight(self.weight);
        entity.has_edge_label = self
            .fields
            .iter()
            .any(|field| field.name() == EDGE_LABEL_FIELD);
        entity.fields = self.fields;
        Ok(entity)
    }
}
