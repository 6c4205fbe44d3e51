use crate::entity::{Entity, Field, MatchingRule};
use crate::error::{Result, TransformError};
use crate::xml::Element;

/// Read every `Entity` element of a response document, in document order
pub(super) fn decode_entities(xml: &str) -> Result<Vec<Entity>> {
    let root = Element::parse(xml)?;

    let entities = root
        .descendants_or_self("Entity")
        .into_iter()
        .map(decode_entity)
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Decoded {} entities from <{}>", entities.len(), root.name());
    Ok(entities)
}

fn decode_entity(element: &Element) -> Result<Entity> {
    let mut builder = Entity::builder();
    if let Some(entity_type) = element.attribute("Type") {
        builder = builder.entity_type(entity_type);
    }
    if let Some(value) = element.child("Value") {
        builder = builder.value(value.text());
    }

    let weight = element
        .child("Weight")
        .ok_or_else(|| TransformError::Structure("Entity has no <Weight> element".to_string()))?;
    builder = builder.weight(parse_weight(&weight.text())?);

    let additional_fields = element.child("AdditionalFields").ok_or_else(|| {
        TransformError::Structure("Entity has no <AdditionalFields> element".to_string())
    })?;
    for field in additional_fields.elements() {
        builder = builder.field(decode_field(field)?);
    }

    builder.build()
}

fn parse_weight(text: &str) -> Result<i32> {
    text.trim()
        .parse()
        .map_err(|e| TransformError::Format(format!("Weight {:?} is not an integer: {}", text, e)))
}

fn decode_field(element: &Element) -> Result<Field> {
    let matching_rule: MatchingRule = element
        .attribute("MatchingRule")
        .ok_or_else(|| {
            TransformError::Format(format!(
                "<{}> has no MatchingRule attribute",
                element.name()
            ))
        })?
        .parse()?;

    let mut field = Field::new(element.attribute("Name").unwrap_or_default())?
        .with_value(element.text())
        .with_matching_rule(matching_rule);
    if let Some(display_name) = element.attribute("DisplayName") {
        field = field.with_display_name(display_name);
    }
    Ok(field)
}
