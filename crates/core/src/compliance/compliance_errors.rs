use thiserror::Error;

/// Errors from the compliance engine.
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// A measurement call was made before `initialize`.
    #[error("Compliance settings not initialized")]
    NotInitialized,

    /// The settings lock was poisoned by a panicking writer.
    #[error("Settings lock poisoned: {0}")]
    Lock(String),
}
