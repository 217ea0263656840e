use std::fmt;

use url::Url;

use crate::ClientError;

/// Environment variable holding the API token.
pub const API_TOKEN_VAR: &str = "CHARON_API_TOKEN";
/// Environment variable holding the service base URL.
pub const BASE_URL_VAR: &str = "CHARON_BASE_URL";

/// Immutable connection settings for a [`crate::Session`].
///
/// Resolve this once at startup and hand it to the session; library code never
/// reads the environment on its own.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_token: String,
    base_url: String,
}

impl Config {
    /// Creates a config from explicit values.
    ///
    /// Trailing slashes are stripped from `base_url`, which must parse as an
    /// absolute URL.
    pub fn new(api_token: impl Into<String>, base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(ClientError::MissingConfig(API_TOKEN_VAR));
        }
        if base_url.as_ref().is_empty() {
            return Err(ClientError::MissingConfig(BASE_URL_VAR));
        }

        let base_url = strip_trailing_slashes(base_url.as_ref());
        Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self {
            api_token,
            base_url: base_url.to_owned(),
        })
    }

    /// Reads both values from `CHARON_API_TOKEN` and `CHARON_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::resolve(None, None)
    }

    /// Uses the explicit values where given and falls back to the environment
    /// for the rest.
    pub fn resolve(api_token: Option<String>, base_url: Option<String>) -> Result<Self, ClientError> {
        Self::resolve_with(api_token, base_url, |name| std::env::var(name).ok())
    }

    /// Like [`Config::resolve`], with a custom variable lookup.
    pub fn resolve_with<F>(
        api_token: Option<String>,
        base_url: Option<String>,
        lookup: F,
    ) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = pick(api_token, API_TOKEN_VAR, &lookup)?;
        let base_url = pick(base_url, BASE_URL_VAR, &lookup)?;
        Self::new(api_token, base_url)
    }

    /// The opaque API token sent with every request.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// The base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn pick<F>(explicit: Option<String>, name: &'static str, lookup: &F) -> Result<String, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|value| !value.is_empty())
        .or_else(|| lookup(name).filter(|value| !value.is_empty()))
        .ok_or(ClientError::MissingConfig(name))
}

/// Cuts `url` after its last word character, dropping any trailing slashes.
///
/// An address without word characters is returned unchanged.
pub(crate) fn strip_trailing_slashes(url: &str) -> &str {
    match url.char_indices().rev().find(|(_, c)| c.is_alphanumeric() || *c == '_') {
        Some((index, c)) => &url[..index + c.len_utf8()],
        None => url,
    }
}
