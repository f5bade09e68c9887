mod core;
mod service;

pub use core::{ApplicationCore, SetupApplicationCoreError};
