use thiserror::Error;

/// Errors a [`PageSession`](super::PageSession) implementation can produce.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The page failed to load or transition.
    #[error("Navigation failed: {message}")]
    Navigation { message: String },

    /// A bounded wait elapsed without the page settling.
    #[error("Timed out while {operation}")]
    Timeout { operation: String },

    /// Nothing on the page matched the selector.
    #[error("No element matched selector {selector}")]
    MissingElement { selector: String },

    /// The select exists but offers no such option.
    #[error("Select {selector} has no option {value}")]
    InvalidOption { selector: String, value: String },

    /// A lower-level browser failure (launch, CDP transport, script
    /// evaluation).
    #[error("Browser error: {message}")]
    Browser { message: String },
}
