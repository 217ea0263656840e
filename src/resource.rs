//! Request bodies for the three Charon resource kinds.
//!
//! Each body serializes exactly the resource's parameter set. Absent optional
//! fields are written as `null` rather than omitted.

use serde::Serialize;

/// Field names accepted in project create/update bodies, in wire order.
pub const PROJECT_PARAMS: [&str; 5] = ["projectid", "name", "status", "pipeline", "bpa"];

/// Field names accepted in sample create/update bodies, in wire order.
pub const SAMPLE_PARAMS: [&str; 8] = [
    "sampleid",
    "status",
    "received",
    "qc_status",
    "genotyping_status",
    "genotyping_concordance",
    "lims_initial_qc",
    "total_autosomal_coverage",
];

/// Field names accepted in library preparation create/update bodies, in wire order.
pub const LIBPREP_PARAMS: [&str; 3] = ["libprepid", "limsid", "status"];

/// Optional project fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectFields {
    pub name: Option<String>,
    pub status: Option<String>,
    pub pipeline: Option<String>,
    pub bpa: Option<String>,
}

/// Optional sample fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleFields {
    pub status: Option<String>,
    pub received: Option<String>,
    pub qc_status: Option<String>,
    pub genotyping_status: Option<String>,
    pub genotyping_concordance: Option<f64>,
    pub lims_initial_qc: Option<String>,
    pub total_autosomal_coverage: Option<f64>,
}

/// Optional library preparation fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibprepFields {
    pub limsid: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProjectBody<'a> {
    pub projectid: &'a str,
    #[serde(flatten)]
    pub fields: &'a ProjectFields,
}

#[derive(Debug, Serialize)]
pub(crate) struct SampleBody<'a> {
    pub sampleid: &'a str,
    #[serde(flatten)]
    pub fields: &'a SampleFields,
}

#[derive(Debug, Serialize)]
pub(crate) struct LibprepBody<'a> {
    pub libprepid: &'a str,
    #[serde(flatten)]
    pub fields: &'a LibprepFields,
}
