//! Positional argument grammar of a local transform invocation.
//!
//! Maltego calls a local transform with up to three arguments:
//! `[optional] <entity value> [field1=value1#field2=value2...]`.

use crate::error::{Result, TransformError};
use std::collections::HashMap;

/// Key under which the input entity's value is stored
pub const ENTITY_VALUE_KEY: &str = "EntityValue";

const FIELD_SEPARATOR: char = '#';
const KEY_VALUE_SEPARATOR: char = '=';

/// Decoded invocation arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArguments {
    pub input_arguments: HashMap<String, String>,
    /// First argument of a three-argument call; not part of `input_arguments`
    pub optional_parameter: Option<String>,
}

/// Split the command line arguments into the input argument mapping
pub fn parse_arguments(args: &[String]) -> Result<ParsedArguments> {
    let (optional_parameter, entity_value, field_pack) = match args {
        [entity_value] => (None, entity_value, None),
        [entity_value, field_pack] => (None, entity_value, Some(field_pack)),
        [optional, entity_value, field_pack] => {
            (Some(optional.clone()), entity_value, Some(field_pack))
        }
        _ => {
            return Err(TransformError::OutOfRange(format!(
                "Wrong number of arguments ({}). Only 1-3 arguments are allowed.",
                args.len()
            )));
        }
    };

    let mut input_arguments = HashMap::new();
    input_arguments.insert(ENTITY_VALUE_KEY.to_string(), entity_value.clone());

    if let Some(field_pack) = field_pack {
        for (key, value) in parse_field_pack(field_pack)? {
            if let Some(previous) = input_arguments.insert(key.clone(), value) {
                log::warn!("Input argument {} given twice; dropping earlier value {:?}", key, previous);
            }
        }
    }

    log::debug!("Parsed {} input arguments", input_arguments.len());

    Ok(ParsedArguments {
        input_arguments,
        optional_parameter,
    })
}

/// Split a field pack of the form `field1=value1#field2=value2` into pairs.
///
/// Every `#`-separated segment must contain exactly one `=`.
pub fn parse_field_pack(field_pack: &str) -> Result<Vec<(String, String)>> {
    field_pack
        .split(FIELD_SEPARATOR)
        .map(|segment| {
            let parts: Vec<&str> = segment.split(KEY_VALUE_SEPARATOR).collect();
            match parts.as_slice() {
                [key, value] => Ok((key.to_string(), value.to_string())),
                _ => Err(TransformError::Format(format!(
                    "Field segment {:?} cannot be split at \"=\"",
                    segment
                ))),
            }
        })
        .collect()
}
