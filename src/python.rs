use std::sync::Mutex;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyTuple;

use crate::{AccessFailure, ClientError, Config, LibprepFields, ProjectFields, Response, SampleFields, Session};

#[pyclass(name = "Session")]
pub struct PySession {
    inner: Mutex<Session>,
}

impl PySession {
    fn call<F>(&self, operation: F) -> PyResult<String>
    where
        F: FnOnce(&Session) -> Result<Response, ClientError>,
    {
        let session = self
            .inner
            .lock()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        operation(&session)
            .map(|response| response.body)
            .map_err(to_py_error)
    }
}

#[pymethods]
impl PySession {
    #[new]
    #[pyo3(signature = (api_token=None, base_url=None))]
    fn new(api_token: Option<String>, base_url: Option<String>) -> PyResult<Self> {
        let config = Config::resolve(api_token, base_url).map_err(to_py_error)?;
        Ok(Self {
            inner: Mutex::new(Session::new(config)),
        })
    }

    /// Each positional argument is rendered with `str()` and appended in order.
    #[pyo3(signature = (*segments))]
    fn construct_address(&self, segments: &Bound<'_, PyTuple>) -> PyResult<String> {
        let rendered = segments
            .iter()
            .map(|segment| Ok(segment.str()?.to_string()))
            .collect::<PyResult<Vec<String>>>()?;
        let segments: Vec<&dyn std::fmt::Display> = rendered
            .iter()
            .map(|segment| segment as &dyn std::fmt::Display)
            .collect();

        let session = self
            .inner
            .lock()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(session.construct_address(&segments))
    }

    #[pyo3(signature = (projectid, name=None, status=None, pipeline=None, bpa=None))]
    fn project_create(
        &self,
        projectid: &str,
        name: Option<String>,
        status: Option<String>,
        pipeline: Option<String>,
        bpa: Option<String>,
    ) -> PyResult<String> {
        let fields = ProjectFields {
            name,
            status,
            pipeline,
            bpa,
        };
        self.call(|session| session.project_create(projectid, &fields))
    }

    fn project_get(&self, projectid: &str) -> PyResult<String> {
        self.call(|session| session.project_get(projectid))
    }

    #[pyo3(signature = (projectid, name=None, status=None, pipeline=None, bpa=None))]
    fn project_update(
        &self,
        projectid: &str,
        name: Option<String>,
        status: Option<String>,
        pipeline: Option<String>,
        bpa: Option<String>,
    ) -> PyResult<String> {
        let fields = ProjectFields {
            name,
            status,
            pipeline,
            bpa,
        };
        self.call(|session| session.project_update(projectid, &fields))
    }

    fn projects_get_all(&self) -> PyResult<String> {
        self.call(Session::projects_get_all)
    }

    fn project_delete(&self, projectid: &str) -> PyResult<String> {
        self.call(|session| session.project_delete(projectid))
    }

    #[pyo3(signature = (
        projectid, sampleid, status=None, received=None, qc_status=None,
        genotyping_status=None, genotyping_concordance=None, lims_initial_qc=None,
        total_autosomal_coverage=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn sample_create(
        &self,
        projectid: &str,
        sampleid: &str,
        status: Option<String>,
        received: Option<String>,
        qc_status: Option<String>,
        genotyping_status: Option<String>,
        genotyping_concordance: Option<f64>,
        lims_initial_qc: Option<String>,
        total_autosomal_coverage: Option<f64>,
    ) -> PyResult<String> {
        let fields = SampleFields {
            status,
            received,
            qc_status,
            genotyping_status,
            genotyping_concordance,
            lims_initial_qc,
            total_autosomal_coverage,
        };
        self.call(|session| session.sample_create(projectid, sampleid, &fields))
    }

    fn sample_get(&self, projectid: &str, sampleid: &str) -> PyResult<String> {
        self.call(|session| session.sample_get(projectid, sampleid))
    }

    #[pyo3(signature = (
        projectid, sampleid, status=None, received=None, qc_status=None,
        genotyping_status=None, genotyping_concordance=None, lims_initial_qc=None,
        total_autosomal_coverage=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn sample_update(
        &self,
        projectid: &str,
        sampleid: &str,
        status: Option<String>,
        received: Option<String>,
        qc_status: Option<String>,
        genotyping_status: Option<String>,
        genotyping_concordance: Option<f64>,
        lims_initial_qc: Option<String>,
        total_autosomal_coverage: Option<f64>,
    ) -> PyResult<String> {
        let fields = SampleFields {
            status,
            received,
            qc_status,
            genotyping_status,
            genotyping_concordance,
            lims_initial_qc,
            total_autosomal_coverage,
        };
        self.call(|session| session.sample_update(projectid, sampleid, &fields))
    }

    fn samples_get_all(&self, projectid: &str) -> PyResult<String> {
        self.call(|session| session.samples_get_all(projectid))
    }

    #[pyo3(signature = (projectid, sampleid, libprepid, status=None, limsid=None))]
    fn libprep_create(
        &self,
        projectid: &str,
        sampleid: &str,
        libprepid: &str,
        status: Option<String>,
        limsid: Option<String>,
    ) -> PyResult<String> {
        let fields = LibprepFields { limsid, status };
        self.call(|session| session.libprep_create(projectid, sampleid, libprepid, &fields))
    }

    fn libprep_get(&self, projectid: &str, sampleid: &str, libprepid: &str) -> PyResult<String> {
        self.call(|session| session.libprep_get(projectid, sampleid, libprepid))
    }

    #[pyo3(signature = (projectid, sampleid, libprepid, status=None, limsid=None))]
    fn libprep_update(
        &self,
        projectid: &str,
        sampleid: &str,
        libprepid: &str,
        status: Option<String>,
        limsid: Option<String>,
    ) -> PyResult<String> {
        let fields = LibprepFields { limsid, status };
        self.call(|session| session.libprep_update(projectid, sampleid, libprepid, &fields))
    }

    fn libpreps_get_all(&self, projectid: &str, sampleid: &str) -> PyResult<String> {
        self.call(|session| session.libpreps_get_all(projectid, sampleid))
    }
}

#[pymodule]
fn charon_client(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySession>()?;
    Ok(())
}

/// Rejected input and missing objects surface as `ValueError`, everything
/// else as `RuntimeError`.
fn to_py_error(error: ClientError) -> PyErr {
    match &error {
        ClientError::Access {
            kind: AccessFailure::MethodNotAllowed,
            ..
        }
        | ClientError::Unclassified { .. }
        | ClientError::Request(_) => PyRuntimeError::new_err(error.to_string()),
        _ => PyValueError::new_err(error.to_string()),
    }
}
