pub mod callback;
pub mod components;
pub mod document;
pub mod example;
pub mod header;
pub mod info;
pub mod link;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod path_item;
pub mod reference;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod server;

pub use components::Components;
pub use document::{Document, DocumentOperation, SchemaType};
pub use info::{Contact, ExternalDocs, Info, License, Tag};
pub use media_type::MediaType;
pub use operation::Operation;
pub use parameter::{Parameter, ParameterKind, ParameterOrRef};
pub use path_item::{HttpMethod, PathItem, PathItemOrRef};
pub use reference::{RefOr, Referenceable};
pub use request_body::RequestBody;
pub use response::{Response, ResponseOrRef};
pub use schema::{JsonType, Schema, SchemaOrRef};
pub use server::{Server, TransferScheme};
