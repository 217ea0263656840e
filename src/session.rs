use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::config::strip_trailing_slashes;
use crate::resource::{LibprepBody, LibprepFields, ProjectBody, ProjectFields, SampleBody, SampleFields};
use crate::transport::{HttpTransport, Request, Response, Transport};
use crate::{ClientError, Config, Validated};

/// Header carrying the API token on every request.
pub const API_TOKEN_HEADER: &str = "X-Charon-API-token";

/// Versioned path prefix of every resource address.
pub const API_PREFIX: &str = "api/v1";

/// Builds `{base}/api/v1/{segments joined by '/'}`.
///
/// Trailing slashes on `base_url` are stripped. Segments are rendered with
/// their `Display` impl and joined in the given order.
pub fn construct_address(base_url: &str, segments: &[&dyn Display]) -> String {
    let path = segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{API_PREFIX}/{path}", strip_trailing_slashes(base_url))
}

/// Authenticated, validating session against the Charon API.
///
/// Every operation performs exactly one call through the wrapped transport and
/// returns the raw response when its status is a success.
#[derive(Debug, Clone)]
pub struct Session<T = HttpTransport> {
    config: Config,
    transport: Validated<T>,
}

impl Session<HttpTransport> {
    /// Creates a session over a default blocking HTTP client.
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }

    /// Creates a session from `CHARON_API_TOKEN` and `CHARON_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(Config::from_env()?))
    }
}

impl<T: Transport> Session<T> {
    /// Creates a session over a custom transport.
    ///
    /// The transport is wrapped in [`Validated`], so it only needs to perform
    /// the round-trip.
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self {
            config,
            transport: Validated::new(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        self.transport.inner()
    }

    /// Builds the address of `segments` under this session's base URL.
    pub fn construct_address(&self, segments: &[&dyn Display]) -> String {
        construct_address(self.config.base_url(), segments)
    }

    pub fn project_create(&self, projectid: &str, fields: &ProjectFields) -> Result<Response, ClientError> {
        let body = ProjectBody { projectid, fields };
        self.post(&[&"project"], &body)
    }

    pub fn project_get(&self, projectid: &str) -> Result<Response, ClientError> {
        self.get(&[&"project", &projectid])
    }

    pub fn project_update(&self, projectid: &str, fields: &ProjectFields) -> Result<Response, ClientError> {
        let body = ProjectBody { projectid, fields };
        self.put(&[&"project", &projectid], &body)
    }

    pub fn projects_get_all(&self) -> Result<Response, ClientError> {
        self.get(&[&"projects"])
    }

    pub fn project_delete(&self, projectid: &str) -> Result<Response, ClientError> {
        self.delete(&[&"project", &projectid])
    }

    pub fn sample_create(
        &self,
        projectid: &str,
        sampleid: &str,
        fields: &SampleFields,
    ) -> Result<Response, ClientError> {
        let body = SampleBody { sampleid, fields };
        self.post(&[&"sample", &projectid], &body)
    }

    pub fn sample_get(&self, projectid: &str, sampleid: &str) -> Result<Response, ClientError> {
        self.get(&[&"sample", &projectid, &sampleid])
    }

    pub fn sample_update(
        &self,
        projectid: &str,
        sampleid: &str,
        fields: &SampleFields,
    ) -> Result<Response, ClientError> {
        let body = SampleBody { sampleid, fields };
        self.put(&[&"sample", &projectid, &sampleid], &body)
    }

    pub fn samples_get_all(&self, projectid: &str) -> Result<Response, ClientError> {
        self.get(&[&"samples", &projectid])
    }

    pub fn libprep_create(
        &self,
        projectid: &str,
        sampleid: &str,
        libprepid: &str,
        fields: &LibprepFields,
    ) -> Result<Response, ClientError> {
        let body = LibprepBody { libprepid, fields };
        self.post(&[&"libprep", &projectid, &sampleid], &body)
    }

    pub fn libprep_get(&self, projectid: &str, sampleid: &str, libprepid: &str) -> Result<Response, ClientError> {
        self.get(&[&"libprep", &projectid, &sampleid, &libprepid])
    }

    pub fn libprep_update(
        &self,
        projectid: &str,
        sampleid: &str,
        libprepid: &str,
        fields: &LibprepFields,
    ) -> Result<Response, ClientError> {
        let body = LibprepBody { libprepid, fields };
        self.put(&[&"libprep", &projectid, &sampleid, &libprepid], &body)
    }

    pub fn libpreps_get_all(&self, projectid: &str, sampleid: &str) -> Result<Response, ClientError> {
        self.get(&[&"libpreps", &projectid, &sampleid])
    }

    fn get(&self, segments: &[&dyn Display]) -> Result<Response, ClientError> {
        self.send(Method::GET, segments, None)
    }

    fn post(&self, segments: &[&dyn Display], body: &impl Serialize) -> Result<Response, ClientError> {
        self.send(Method::POST, segments, Some(serde_json::to_string(body)?))
    }

    fn put(&self, segments: &[&dyn Display], body: &impl Serialize) -> Result<Response, ClientError> {
        self.send(Method::PUT, segments, Some(serde_json::to_string(body)?))
    }

    fn delete(&self, segments: &[&dyn Display]) -> Result<Response, ClientError> {
        self.send(Method::DELETE, segments, None)
    }

    fn send(
        &self,
        method: Method,
        segments: &[&dyn Display],
        body: Option<String>,
    ) -> Result<Response, ClientError> {
        let url = self.resource_url(segments)?;

        debug!(%method, %url, "sending Charon request");
        self.transport.execute(Request {
            method,
            url,
            headers: vec![(API_TOKEN_HEADER.to_owned(), self.config.api_token().to_owned())],
            body,
        })
    }

    /// Builds the request URL with every segment percent-encoded as one path
    /// segment, so identifiers can never reach another resource.
    ///
    /// Empty, `.` and `..` segments are rejected.
    fn resource_url(&self, segments: &[&dyn Display]) -> Result<Url, ClientError> {
        let invalid = || ClientError::InvalidAddress(self.construct_address(segments));

        let rendered: Vec<String> = segments.iter().map(ToString::to_string).collect();
        if rendered
            .iter()
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(invalid());
        }

        let mut url = Url::parse(self.config.base_url()).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(API_PREFIX.split('/'))
            .extend(&rendered);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use reqwest::Method;
    use serde_json::{Value, json};

    use super::{API_TOKEN_HEADER, Session, construct_address};
    use crate::resource::{LibprepFields, ProjectFields, SampleFields};
    use crate::transport::{Request, Response, Transport};
    use crate::{AccessFailure, ClientError, Config};

    /// Records every request and answers with scripted statuses.
    #[derive(Default)]
    struct Recorder {
        requests: RefCell<Vec<Request>>,
        statuses: RefCell<VecDeque<u16>>,
    }

    impl Recorder {
        fn answering(statuses: &[u16]) -> Self {
            Self {
                requests: RefCell::default(),
                statuses: RefCell::new(statuses.iter().copied().collect()),
            }
        }

        fn last(&self) -> Request {
            self.requests.borrow().last().cloned().expect("a request was sent")
        }

        fn last_body(&self) -> Value {
            let body = self.last().body.expect("request has a body");
            serde_json::from_str(&body).expect("body is json")
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: Request) -> Result<Response, ClientError> {
            let status = self.statuses.borrow_mut().pop_front().unwrap_or(200);
            let url = request.url.to_string();
            self.requests.borrow_mut().push(request);
            Ok(Response {
                status,
                reason: "Scripted".to_owned(),
                url,
                body: String::new(),
            })
        }
    }

    fn session(recorder: &Recorder) -> Session<&Recorder> {
        let config = Config::new("secret", "http://host/").expect("valid config");
        Session::with_transport(config, recorder)
    }

    #[test]
    fn construct_address_joins_segments_under_versioned_prefix() {
        assert_eq!(
            construct_address("http://host/", &[&"project", &"P123"]),
            "http://host/api/v1/project/P123"
        );
        assert_eq!(
            construct_address("http://host", &[&"libprep", &"P1", &42, &'A']),
            "http://host/api/v1/libprep/P1/42/A"
        );
    }

    #[test]
    fn every_request_carries_the_token_header() {
        let recorder = Recorder::default();
        session(&recorder).projects_get_all().expect("200 response");
        assert_eq!(
            recorder.last().headers,
            vec![(API_TOKEN_HEADER.to_owned(), "secret".to_owned())]
        );
    }

    #[test]
    fn project_create_posts_full_parameter_set() {
        let recorder = Recorder::answering(&[201]);
        let fields = ProjectFields {
            name: Some("Foo".to_owned()),
            ..ProjectFields::default()
        };
        let response = session(&recorder).project_create("P1", &fields).expect("201 response");
        assert_eq!(response.status, 201);

        let request = recorder.last();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "http://host/api/v1/project");
        assert_eq!(
            recorder.last_body(),
            json!({"projectid": "P1", "name": "Foo", "status": null, "pipeline": null, "bpa": null})
        );
    }

    #[test]
    fn project_create_conflict_reports_the_request_url() {
        let recorder = Recorder::answering(&[409]);
        let error = session(&recorder)
            .project_create("P1", &ProjectFields::default())
            .expect_err("409 response");
        assert_eq!(error.access_failure(), Some(AccessFailure::Conflict));
        assert!(error.to_string().contains("http://host/api/v1/project"));
    }

    #[test]
    fn project_item_operations_address_the_item() {
        let recorder = Recorder::default();
        let session = session(&recorder);

        session.project_get("P1").expect("get");
        assert_eq!(recorder.last().method, Method::GET);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/project/P1");
        assert!(recorder.last().body.is_none());

        session
            .project_update("P1", &ProjectFields {
                status: Some("OPEN".to_owned()),
                ..ProjectFields::default()
            })
            .expect("update");
        assert_eq!(recorder.last().method, Method::PUT);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/project/P1");
        assert_eq!(recorder.last_body()["status"], "OPEN");
        assert_eq!(recorder.last_body()["projectid"], "P1");

        session.project_delete("P1").expect("delete");
        assert_eq!(recorder.last().method, Method::DELETE);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/project/P1");

        session.projects_get_all().expect("list");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/projects");
    }

    #[test]
    fn sample_operations_are_scoped_by_project() {
        let recorder = Recorder::default();
        let session = session(&recorder);

        session
            .sample_create("P1", "S1", &SampleFields::default())
            .expect("create");
        assert_eq!(recorder.last().method, Method::POST);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/sample/P1");
        let body = recorder.last_body();
        assert_eq!(body["sampleid"], "S1");
        assert!(body.get("projectid").is_none());
        assert_eq!(body.as_object().map(serde_json::Map::len), Some(8));

        session.sample_get("P1", "S1").expect("get");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/sample/P1/S1");

        session
            .sample_update("P1", "S1", &SampleFields::default())
            .expect("update");
        assert_eq!(recorder.last().method, Method::PUT);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/sample/P1/S1");

        session.samples_get_all("P1").expect("list");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/samples/P1");
    }

    #[test]
    fn libprep_update_uses_libprep_parameter_set() {
        let recorder = Recorder::default();
        let fields = LibprepFields {
            limsid: Some("L-7".to_owned()),
            ..LibprepFields::default()
        };
        session(&recorder)
            .libprep_update("P1", "S1", "A", &fields)
            .expect("update");

        assert_eq!(recorder.last().method, Method::PUT);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/libprep/P1/S1/A");
        assert_eq!(
            recorder.last_body(),
            json!({"libprepid": "A", "limsid": "L-7", "status": null})
        );
    }

    #[test]
    fn libprep_collection_operations_are_scoped_by_project_and_sample() {
        let recorder = Recorder::default();
        let session = session(&recorder);

        session
            .libprep_create("P1", "S1", "A", &LibprepFields::default())
            .expect("create");
        assert_eq!(recorder.last().method, Method::POST);
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/libprep/P1/S1");
        assert_eq!(recorder.last_body()["libprepid"], "A");

        session.libprep_get("P1", "S1", "A").expect("get");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/libprep/P1/S1/A");

        session.libpreps_get_all("P1", "S1").expect("list");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/libpreps/P1/S1");
    }

    #[test]
    fn identifiers_are_encoded_as_single_path_segments() {
        let recorder = Recorder::default();
        let session = session(&recorder);

        session.project_delete("P2/../P1").expect("delete");
        assert_eq!(recorder.last().method, Method::DELETE);
        assert_eq!(
            recorder.last().url.as_str(),
            "http://host/api/v1/project/P2%2F..%2FP1"
        );

        session.project_delete("P1#archive").expect("delete");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/project/P1%23archive");
        assert_eq!(recorder.last().url.fragment(), None);

        session.sample_get("P1", "S1?full=1").expect("get");
        assert_eq!(recorder.last().url.as_str(), "http://host/api/v1/sample/P1/S1%3Ffull=1");
        assert_eq!(recorder.last().url.query(), None);
    }

    #[test]
    fn dot_segments_are_rejected_before_sending() {
        let recorder = Recorder::default();
        let session = session(&recorder);

        let error = session.libprep_get("P1", "..", "..").expect_err("dot segments");
        match error {
            ClientError::InvalidAddress(address) => {
                assert_eq!(address, "http://host/api/v1/libprep/P1/../..");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(session.project_delete("."), Err(ClientError::InvalidAddress(_))));
        assert!(matches!(session.project_get(""), Err(ClientError::InvalidAddress(_))));
        assert!(recorder.requests.borrow().is_empty());
    }

    #[test]
    fn base_url_path_is_kept_in_front_of_the_prefix() {
        let recorder = Recorder::default();
        let config = Config::new("secret", "https://lims.example/charon/").expect("valid config");
        Session::with_transport(config, &recorder)
            .samples_get_all("P1")
            .expect("list");
        assert_eq!(
            recorder.last().url.as_str(),
            "https://lims.example/charon/api/v1/samples/P1"
        );
    }

    #[test]
    fn failures_stop_after_a_single_call() {
        let recorder = Recorder::answering(&[503]);
        let error = session(&recorder).sample_get("P1", "S1").expect_err("503 response");
        assert!(matches!(error, ClientError::Unclassified { status: 503, .. }));
        assert_eq!(recorder.requests.borrow().len(), 1);
    }
}
