//! Projection of the document model to and from the Swagger 2.0 and
//! OpenAPI 3 wire formats.

pub mod detect;
pub mod masking;
pub mod read;
pub mod refs;
pub mod write;

pub use detect::{detect_schema_type, detect_value_schema_type};
pub use masking::{EntityKind, ignored_fields, is_ignored};
pub use read::from_value;
pub use write::to_value;

/// Schema keywords Swagger 2.0 writes inline on non-body parameters and
/// response headers.
pub(crate) const INLINE_SCHEMA_KEYWORDS: &[&str] = &[
    "type",
    "format",
    "items",
    "default",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "enum",
    "multipleOf",
];
