use crate::error::{Result, TransformError};
use crate::xml::{self, ToXml};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Whether a field takes part in Maltego's entity-equality comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingRule {
    /// Two entities of the same type with different values for this field
    /// are distinct nodes.
    Strict,
    /// The field is ignored when Maltego merges entities of the same type.
    #[default]
    Loose,
}

impl MatchingRule {
    /// Wire form: always the lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchingRule::Strict => "strict",
            MatchingRule::Loose => "loose",
        }
    }
}

impl fmt::Display for MatchingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchingRule {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        if token.eq_ignore_ascii_case("strict") {
            Ok(MatchingRule::Strict)
        } else if token.eq_ignore_ascii_case("loose") {
            Ok(MatchingRule::Loose)
        } else {
            Err(TransformError::Format(format!(
                "Unknown matching rule: {:?}",
                s
            )))
        }
    }
}

/// Additional field of an entity, shown in the property panel in Maltego
/// and passed on to the next transform as input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    display_name: Option<String>,
    value: Option<String>,
    matching_rule: MatchingRule,
}

impl Field {
    /// Create a field with no display name, no value and a loose matching rule.
    ///
    /// Fails with `InvalidArgument` if `name` is empty.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TransformError::InvalidArgument(
                "Field name is mandatory and cannot be empty".to_string(),
            ));
        }
        Ok(Self::named(name))
    }

    /// Internal constructor for names known to be valid
    pub(crate) fn named(name: String) -> Self {
        Self {
            name,
            display_name: None,
            value: None,
            matching_rule: MatchingRule::default(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_matching_rule(mut self, matching_rule: MatchingRule) -> Self {
        self.matching_rule = matching_rule;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn matching_rule(&self) -> MatchingRule {
        self.matching_rule
    }
}

impl ToXml for Field {
    /// `<Field Name=".." [DisplayName=".."] MatchingRule="..">value</Field>`
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new("Field");
        xml::push_attribute(&mut start, "Name", &self.name);
        if let Some(display_name) = &self.display_name {
            xml::push_attribute(&mut start, "DisplayName", display_name);
        }
        xml::push_attribute(&mut start, "MatchingRule", self.matching_rule.as_str());

        writer.write_event(Event::Start(start))?;
        xml::write_text(writer, self.value().unwrap_or_default())?;
        writer.write_event(Event::End(BytesEnd::new("Field")))?;
        Ok(())
    }
}
