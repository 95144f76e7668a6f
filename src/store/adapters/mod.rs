//! Record store adapters.

pub mod memory;
pub mod postgres;

mod cursor;

pub use cursor::BufferedCursor;
