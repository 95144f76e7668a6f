//! Domain model for generic record storage.
//!
//! Rows travel between adapters and services as [`Record`] values whose
//! fields are [`FieldValue`] tagged unions. Column names are validated
//! against the owning [`Collection`] before any adapter touches them.

mod collection;
mod page;
mod record;
mod value;

pub use collection::{Collection, task_columns, user_columns};
pub use page::Page;
pub use record::Record;
pub use value::{FieldMap, FieldValue};
