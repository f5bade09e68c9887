pub mod app;
pub mod outbound;

pub use app::ApplicationCore;
