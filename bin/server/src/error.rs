//! Errors that stop the server from starting or keep it from serving.

use std::fmt;

#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// A component rejected its configuration.
    Component { component: &'static str, details: String },
    /// The listen address could not be bound.
    Bind { addr: String, details: String },
    /// The server loop failed.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::Component { component, details } => {
                write!(f, "failed to build {component}: {details}")
            }
            Self::Bind { addr, details } => write!(f, "failed to bind to '{addr}': {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_component() {
        let err = StartupError::Component {
            component: "session codec",
            details: "key too short".to_string(),
        };
        assert_eq!(err.to_string(), "failed to build session codec: key too short");
    }
}
