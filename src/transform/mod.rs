//! Transformation: input arguments in, response document out.
//!
//! A transformation is built either from the command line the host tool
//! passes to a local transform, or from a response document produced earlier.

mod args;
mod decode;
pub mod signal;

pub use args::{parse_arguments, parse_field_pack, ParsedArguments, ENTITY_VALUE_KEY};

use crate::entity::Entity;
use crate::error::Result;
use crate::xml::ToXml;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Write;

const RESPONSE_ELEMENTS: [&str; 3] = ["MaltegoMessage", "MaltegoTransformResponseMessage", "_entities"];

/// One transform invocation: the decoded input and the entities to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    input_arguments: HashMap<String, String>,
    optional_parameter: Option<String>,
    entities: Vec<Entity>,
}

impl Transformation {
    /// Build from the positional arguments the host tool passed (program name excluded)
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let parsed = parse_arguments(&args)?;

        Ok(Self {
            input_arguments: parsed.input_arguments,
            optional_parameter: parsed.optional_parameter,
            entities: Vec::new(),
        })
    }

    /// Build from a response document. Input arguments stay empty.
    ///
    /// Entities that already carry a `link#maltego.link.label` field are
    /// treated as labelled: `add_edge_label` on them fails.
    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(Self {
            input_arguments: HashMap::new(),
            optional_parameter: None,
            entities: decode::decode_entities(xml)?,
        })
    }

    pub fn input_arguments(&self) -> &HashMap<String, String> {
        &self.input_arguments
    }

    /// Value of the input entity. `None` only for transformations read from XML.
    pub fn entity_value(&self) -> Option<&str> {
        self.input_arguments.get(ENTITY_VALUE_KEY).map(String::as_str)
    }

    /// Leading argument of a three-argument invocation
    pub fn optional_parameter(&self) -> Option<&str> {
        self.optional_parameter.as_deref()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut Vec<Entity> {
        &mut self.entities
    }

    pub fn push_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Append a new entity and return it for further decoration
    pub fn add_entity(
        &mut self,
        entity_type: impl Into<String>,
        value: impl Into<String>,
        weight: i32,
    ) -> &mut Entity {
        let index = self.entities.len();
        self.entities
            .push(Entity::new(entity_type, value).with_weight(weight));
        &mut self.entities[index]
    }

    /// Print a debug message to Maltego
    pub fn debug(&self, message: &str) {
        signal::debug(message);
    }

    /// Set Maltego's progress bar; fails outside 0-100
    pub fn progress(&self, percent: i32) -> Result<()> {
        signal::progress(percent)
    }

    pub fn write_debug<W: Write>(&self, out: &mut W, message: &str) -> std::io::Result<()> {
        signal::write_debug(out, message)
    }

    pub fn write_progress<W: Write>(&self, out: &mut W, percent: i32) -> Result<()> {
        signal::write_progress(out, percent)
    }
}

impl ToXml for Transformation {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        for name in RESPONSE_ELEMENTS {
            writer.write_event(Event::Start(BytesStart::new(name)))?;
        }
        for entity in &self.entities {
            entity.write_xml(writer)?;
        }
        for name in RESPONSE_ELEMENTS.iter().rev() {
            writer.write_event(Event::End(BytesEnd::new(*name)))?;
        }
        Ok(())
    }
}
