pub mod dialog;
pub mod interval;
pub mod notification;
pub mod snapshot;
pub mod state;

pub use dialog::{Dialog, DialogEvent, DialogOutcome, DialogState, DialogTransitionError};
pub use interval::CountdownInterval;
pub use notification::NotificationMessage;
pub use snapshot::{RemainingLabel, TickSnapshot};
pub use state::CountdownState;
