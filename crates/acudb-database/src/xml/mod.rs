mod read;
mod write;

pub(crate) use read::{parse_database, DatabaseDocument};
pub(crate) use write::write_database;
pub use write::FORMAT_VERSION;
