use thiserror::Error;

/// The unified error type for the `flight_data_ingestor` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A browser-session failure (launch, CDP plumbing, timeouts).
    #[error("Session error: {0}")]
    Session(#[from] crate::session::errors::SessionError),

    /// A page-level navigation failure, including unknown airport codes.
    #[error("Navigation error: {0}")]
    Navigation(#[from] crate::navigator::NavigatorError),

    /// An error while serializing fetched records.
    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
