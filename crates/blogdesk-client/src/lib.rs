//! REST client for the blogdesk admin API
//!
//! Wraps every endpoint the dashboard uses and implements the blog
//! [`ResourceBackend`](blogdesk_core::ResourceBackend) so the form reconciler can persist
//! through it.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
mod backend;
pub mod error;
pub mod session;

pub use api_client::{ApiClient, LOGIN_REQUIRED};
pub use error::{ClientError, ClientResult};
pub use session::{LOGGED_OUT, LOGIN_FAILED};
