use thiserror::Error;

/// Core error type shared by the daoforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A required attribute is absent from a definition element.
    #[error("element <{element}> is missing required attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute is present but its value cannot be interpreted.
    #[error("element <{element}> attribute '{attribute}': {message}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        message: String,
    },

    /// An attribute is present that no reader consulted.
    #[error("element <{element}> carries unrecognized attribute '{attribute}'")]
    UnknownAttribute { element: String, attribute: String },

    /// A child element is not recognized under its parent.
    #[error("element <{parent}> contains unrecognized child element <{element}>")]
    UnknownElement { parent: String, element: String },

    /// The definition violates a structural invariant.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A definition document could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A definition document is not well-formed JSON.
    #[error("malformed definition document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used across the daoforge crates.
pub type Result<T> = std::result::Result<T, Error>;
