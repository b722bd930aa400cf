use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The user closed the picker without choosing anything.
    #[error("Nothing selected")]
    Cancelled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tmux error: {0}")]
    Tmux(String),

    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("Picker failed: {0}")]
    PickerLaunch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn tmux(msg: impl Into<String>) -> Self {
        Self::Tmux(msg.into())
    }

    pub fn tool(tool: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::ExternalTool {
            tool: tool.into(),
            message: msg.into(),
        }
    }

    pub fn picker(msg: impl Into<String>) -> Self {
        Self::PickerLaunch(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Errors caused by bad command-line input rather than by the environment.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidInput(_))
    }
}
