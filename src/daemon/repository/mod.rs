pub mod interval;
pub mod notification;
pub mod storage;

pub use interval::IntervalStorage;
pub use notification::NotificationConfiguration;
pub use storage::KeyValueStore;
