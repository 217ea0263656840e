//! Rust and Python-facing client library for the Charon tracking API.
//!
//! Public API layers:
//! - [`Config`]: API token and base URL, resolved once from arguments or the environment.
//! - [`Session`]: one method per resource operation on projects, samples and
//!   library preparations.
//! - [`Validated`]: transport stage translating status codes into [`ClientError`]s.
//! - [`Transport`]/[`HttpTransport`]: the HTTP round-trip seam and its blocking implementation.

mod config;
mod error;
mod resource;
mod session;
mod transport;
mod validate;

pub use config::{API_TOKEN_VAR, BASE_URL_VAR, Config};
/// Error type returned by all client operations.
pub use error::ClientError;
/// Known failure kinds carried by [`ClientError::Access`].
pub use error::AccessFailure;
pub use resource::{
    LIBPREP_PARAMS, LibprepFields, PROJECT_PARAMS, ProjectFields, SAMPLE_PARAMS, SampleFields,
};
pub use session::{API_PREFIX, API_TOKEN_HEADER, Session, construct_address};
pub use transport::{HttpTransport, Request, Response, Transport};
pub use validate::{Outcome, SUCCESS_CODES, Validated, check, classify, validate_response};

#[cfg(feature = "python")]
mod python;
