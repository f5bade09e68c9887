pub mod interval;
pub mod notification;

pub use interval::IntervalRepository;
pub use notification::NotificationRepository;
