pub mod cli;
pub mod config;
pub mod error;
pub mod picker;
pub mod search;
pub mod session;
pub mod tmux;

pub use error::{Error, Result};
