use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::ClientError;

/// One HTTP call described as plain data.
///
/// Built by [`crate::Session`] and handed to a [`Transport`] for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body, if the verb carries one.
    pub body: Option<String>,
}

/// The raw outcome of one HTTP call.
///
/// The body is kept as text and never interpreted by the client itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub url: String,
    pub body: String,
}

impl Response {
    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Executes a single [`Request`] and reports the raw [`Response`].
///
/// Implementations must not interpret the status code; that is the job of
/// [`crate::Validated`].
pub trait Transport {
    fn execute(&self, request: Request) -> Result<Response, ClientError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: Request) -> Result<Response, ClientError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by [`reqwest::blocking::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a preconfigured client, e.g. one with custom timeouts or proxies.
    pub fn with_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: Request) -> Result<Response, ClientError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .header(reqwest::header::ACCEPT, "application/json");

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text()?;

        Ok(Response {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown Status").to_owned(),
            url,
            body,
        })
    }
}
