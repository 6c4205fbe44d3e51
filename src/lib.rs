pub mod config;
pub mod entity;
pub mod error;
pub mod transform;
pub mod xml;

pub use config::Config;
pub use entity::{Entity, EntityBuilder, Field, MatchingRule};
pub use error::{Result, TransformError};
pub use transform::Transformation;
pub use xml::ToXml;
