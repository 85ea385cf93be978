pub mod error;
pub mod field;
pub mod record;
pub mod value;

pub use error::{ModelError, Result};
pub use field::{CHECKBOX_SEPARATOR, Choice, FieldMeta, FieldType, RawFieldMeta, parse_choices};
pub use record::{Record, Value};
pub use value::SqlValue;
