mod command;
mod manager;

pub use command::{CommandRunner, SystemRunner, TmuxCommand};
pub use manager::{inside_tmux, SessionManager, TMUX_ENV};
