mod naming;
mod workspace;

pub use naming::sanitize;
pub use workspace::{basename, determine_session_name, match_workspace};
