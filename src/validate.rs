//! Status-code validation for Charon responses.
//!
//! Every call a [`crate::Session`] makes passes through [`Validated`], so
//! callers only ever see a successful [`Response`] or a typed [`ClientError`].

use tracing::debug;

use crate::transport::{Request, Response, Transport};
use crate::{AccessFailure, ClientError};

/// Status codes accepted as success.
pub const SUCCESS_CODES: [u16; 3] = [200, 201, 204];

/// Classification of one response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Known(AccessFailure),
    Unknown,
}

/// Classifies `status` against the success set and the known failure table.
pub fn classify(status: u16) -> Outcome {
    if SUCCESS_CODES.contains(&status) {
        return Outcome::Success;
    }
    AccessFailure::from_status(status).map_or(Outcome::Unknown, Outcome::Known)
}

/// Returns `response` unchanged when its status is a success, or the matching
/// error otherwise.
pub fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status;
    let error = match classify(status) {
        Outcome::Success => return Ok(response),
        Outcome::Known(kind) => ClientError::Access {
            kind,
            status,
            url: response.url,
        },
        Outcome::Unknown => ClientError::Unclassified {
            reason: response.reason,
            status,
            url: response.url,
        },
    };

    debug!(status, "{error}");
    Err(error)
}

/// Runs one verb invocation and validates what it returns.
///
/// Transport errors pass through untouched.
pub fn validate_response<F>(call: F) -> Result<Response, ClientError>
where
    F: FnOnce() -> Result<Response, ClientError>,
{
    check(call()?)
}

/// Transport stage that validates every response of the wrapped transport.
#[derive(Debug, Clone, Default)]
pub struct Validated<T> {
    inner: T,
}

impl<T: Transport> Validated<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for Validated<T> {
    fn execute(&self, request: Request) -> Result<Response, ClientError> {
        validate_response(|| self.inner.execute(request))
    }
}
