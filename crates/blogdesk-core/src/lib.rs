//! Core types, access gating and form reconciliation for blogdesk

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod blog;
pub mod config;
pub mod error;
pub mod export;
pub mod form;
pub mod gate;
pub mod listing;
pub mod session;
pub mod shell;
pub mod types;

// Re-export commonly used types
pub use blog::BlogForm;
pub use config::{Config, LoggingConfig};
pub use error::{Error, Result};
pub use form::{
    FormPayload, PayloadValue, Resource, ResourceBackend, ResourceFormReconciler, StagedFile,
    SubmitFailure, SubmitOutcome,
};
pub use gate::{AccessGate, AuthState, Gate, Route};
pub use session::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use types::{Blog, Contact, ContactStatus, ScheduledCall};

/// Initialize the logging system
///
/// `RUST_LOG` wins over the configured level. `format = "json"` selects structured output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|err| Error::Other(format!("Failed to initialize logging: {err}")))
}
