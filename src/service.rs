use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::data::{
    normalize_records, DataPoint, PcpRecord, QualitySample, RawPcpRecord, VariablePoint,
};

/// The read-only endpoints this crate consumes. `clusters: None` leaves the
/// query parameter off, which the service interprets as its default count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    MdsPoints { clusters: Option<u32> },
    MdsVariables,
    KmeansMse,
    PcpData { clusters: Option<u32> },
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::MdsPoints { clusters } => with_clusters("/data/mds-points", *clusters),
            Endpoint::MdsVariables => "/data/mds-variables".to_owned(),
            Endpoint::KmeansMse => "/data/kmeans-mse".to_owned(),
            Endpoint::PcpData { clusters } => with_clusters("/data/pcp-data", *clusters),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn with_clusters(base: &str, clusters: Option<u32>) -> String {
    match clusters {
        Some(k) => format!("{base}?clusters={k}"),
        None => base.to_owned(),
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service transport failed: {0}")]
    Transport(String),
    #[error("service responded with status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("empty payload")]
    EmptyPayload,
}

/// The seam to whatever carries the bytes. Implementations return the raw
/// JSON body for an endpoint; decoding stays on this side of the boundary.
pub trait DataService: Send + Sync {
    fn fetch(&self, endpoint: &Endpoint) -> Result<String, ServiceError>;
}

pub fn mds_points(
    service: &dyn DataService,
    clusters: Option<u32>,
) -> Result<Vec<DataPoint>, ServiceError> {
    decode_rows(&service.fetch(&Endpoint::MdsPoints { clusters })?)
}

pub fn mds_variables(service: &dyn DataService) -> Result<Vec<VariablePoint>, ServiceError> {
    decode_rows(&service.fetch(&Endpoint::MdsVariables)?)
}

pub fn kmeans_mse(service: &dyn DataService) -> Result<Vec<QualitySample>, ServiceError> {
    decode_rows(&service.fetch(&Endpoint::KmeansMse)?)
}

pub fn pcp_data(
    service: &dyn DataService,
    clusters: Option<u32>,
) -> Result<Vec<PcpRecord>, ServiceError> {
    let raw: Vec<RawPcpRecord> = decode_rows(&service.fetch(&Endpoint::PcpData { clusters })?)?;
    Ok(normalize_records(raw))
}

/// Decode a JSON array payload. Zero rows is an error here: an empty result
/// has no extent to build scale domains from, and the coordinator turns it
/// into a per-view no-data state.
fn decode_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ServiceError> {
    let rows: Vec<T> = serde_json::from_str(body)?;
    if rows.is_empty() {
        return Err(ServiceError::EmptyPayload);
    }
    Ok(rows)
}

/// A `DataService` backed by an in-memory path-to-body map. The demo binary
/// feeds it bundled JSON; tests feed it whatever shape they need.
///
/// Lookup tries the exact path first, then the path with its query string
/// stripped, so one fixture can stand in for every cluster count.
#[derive(Debug, Default)]
pub struct FixtureService {
    bodies: HashMap<String, String>,
}

impl FixtureService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, body: impl Into<String>) {
        self.bodies.insert(path.into(), body.into());
    }

    pub fn with(mut self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(path, body);
        self
    }
}

impl DataService for FixtureService {
    fn fetch(&self, endpoint: &Endpoint) -> Result<String, ServiceError> {
        let path = endpoint.path();
        if let Some(body) = self.bodies.get(&path) {
            return Ok(body.clone());
        }
        let bare = path.split('?').next().unwrap_or(&path);
        self.bodies
            .get(bare)
            .cloned()
            .ok_or_else(|| ServiceError::Transport(format!("no fixture for {path}")))
    }
}
