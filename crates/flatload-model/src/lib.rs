pub mod error;
pub mod schema;
pub mod typecode;
pub mod value;

pub use error::{Result, SchemaError};
pub use schema::{FieldSpec, RecordSchema};
pub use typecode::TypeCode;
pub use value::{TypedRow, Value};
