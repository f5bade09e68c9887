pub mod client;
pub mod command;
pub mod connector;
pub mod prompt;

pub use client::{Client, ClientError};
pub use command::{Command, QueryArguments, SetArguments};
pub use prompt::{Prompt, PromptError};
