pub mod config;
pub mod error;
pub mod load;
pub mod model;
pub mod operation_ids;
pub mod projection;
pub mod validate;

pub use error::{ConfigError, DocumentError, ParseError, ResolveError, SerializeError};
pub use model::{Document, DocumentOperation, SchemaType};
