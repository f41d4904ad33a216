pub mod schema;
pub mod validation;

pub use schema::{CompletionSchema, SchemaHandle};
pub use validation::{audit_payload, decode_strict};
