use std::fmt;

use thiserror::Error;

macro_rules! access_failures {
    ($($code:literal => $variant:ident: $description:literal),* $(,)?) => {
        /// A rejected request with a dedicated meaning in the Charon API.
        ///
        /// Each kind is tied to exactly one HTTP status code.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum AccessFailure {
            $(
                #[doc = $description]
                $variant,
            )*
        }

        impl AccessFailure {
            /// Looks up the failure kind registered for `status`, if any.
            pub fn from_status(status: u16) -> Option<Self> {
                match status {
                    $($code => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The HTTP status code this kind is registered under.
            pub fn status(self) -> u16 {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            /// Human-readable description of the condition.
            pub fn description(self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)*
                }
            }
        }
    };
}

access_failures! {
    400 => InvalidInput: "invalid input data",
    404 => NotFound: "no such object in database",
    405 => MethodNotAllowed: "method not allowed",
    409 => Conflict: "document revision conflict",
}

impl fmt::Display for AccessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Errors returned by Charon client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required configuration value was neither passed in nor set in the environment.
    #[error("could not get required environment variable \"{0}\"; cannot connect to database")]
    MissingConfig(&'static str),

    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// A constructed resource address could not be parsed as a URL.
    #[error("invalid resource address '{0}'")]
    InvalidAddress(String),

    /// The service rejected the request with a known failure code.
    #[error("Charon access failure: {kind} (code {status}) (url {url})")]
    Access {
        kind: AccessFailure,
        status: u16,
        url: String,
    },

    /// The service returned a non-success status outside the known failure table.
    #[error("Charon access failure: {reason} (code {status}) (url {url})")]
    Unclassified {
        reason: String,
        status: u16,
        url: String,
    },

    /// HTTP transport-layer request failure.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A body could not be encoded or decoded as JSON.
    #[error("failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The HTTP status code of a rejected response.
    ///
    /// Returns `None` for errors raised before or outside a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Access { status, .. } | Self::Unclassified { status, .. } => Some(*status),
            Self::Request(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// The known failure kind, when the service rejected the request with one.
    pub fn access_failure(&self) -> Option<AccessFailure> {
        match self {
            Self::Access { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AccessFailure, ClientError};

    #[test]
    fn known_codes_round_trip_through_the_table() {
        for code in [400, 404, 405, 409] {
            let kind = AccessFailure::from_status(code).expect("registered code");
            assert_eq!(kind.status(), code);
        }
        assert_eq!(AccessFailure::from_status(500), None);
        assert_eq!(AccessFailure::from_status(200), None);
    }

    #[test]
    fn access_message_names_condition_code_and_url() {
        let error = ClientError::Access {
            kind: AccessFailure::Conflict,
            status: 409,
            url: "http://host/api/v1/project/P1".to_owned(),
        };
        assert_eq!(
            error.to_string(),
            "Charon access failure: document revision conflict (code 409) \
             (url http://host/api/v1/project/P1)"
        );
        assert_eq!(error.status(), Some(409));
        assert_eq!(error.access_failure(), Some(AccessFailure::Conflict));
    }

    #[test]
    fn missing_config_names_the_variable() {
        let error = ClientError::MissingConfig("CHARON_API_TOKEN");
        assert!(error.to_string().contains("\"CHARON_API_TOKEN\""));
        assert_eq!(error.status(), None);
    }
}
