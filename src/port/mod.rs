pub mod object_store;
pub mod scheduler;

pub use object_store::ObjectStore;
pub use scheduler::{FlushCallback, FlushScheduler, ScheduleHandle};
