pub mod entry;
pub mod level;

pub use entry::{format_entry, LogValue};
pub use level::{Level, LevelSet};
