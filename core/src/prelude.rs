use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::map::GeoPoint;

/// Geographic reference point used to anchor the map projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub lat: f64,
    pub lon: f64,
}

impl Default for Origin {
    /// Tokyo Station.
    fn default() -> Self {
        Self {
            lat: 35.681236,
            lon: 139.767125,
        }
    }
}

/// Projection applied to map nodes; also handed to the validator's `-p` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    #[default]
    Mgrs,
    Utm,
    Local,
}

impl ProjectionMode {
    pub fn as_flag(&self) -> &'static str {
        match self {
            ProjectionMode::Mgrs => "mgrs",
            ProjectionMode::Utm => "utm",
            ProjectionMode::Local => "local",
        }
    }
}

/// Shared configuration for reading a map file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MapConfig {
    pub origin: Origin,
    pub projection: ProjectionMode,
}

/// Common error type for the core pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map parse error: {0}")]
    MapParse(String),
    #[error("{kind} {id} references missing {target} {target_id}")]
    MissingReference {
        kind: &'static str,
        id: i64,
        target: &'static str,
        target_id: i64,
    },
    #[error("malformed primitive {id}: {reason}")]
    MalformedPrimitive { id: i64, reason: String },
    #[error("projection failure: {0}")]
    Projection(String),
    #[error("failed to launch validator {program}: {source}")]
    ToolSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("validator exited with status {}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into()))]
    ToolFailed {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    #[error("validation report not found at {0}")]
    ReportMissing(PathBuf),
    #[error("malformed validation report {path}: {source}")]
    ReportMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("lookup table error: {0}")]
    Lookup(String),
    #[error("lookup table not found at {0}")]
    LookupMissing(PathBuf),
    #[error("figure formatting failed")]
    Format(#[from] std::fmt::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Converts geographic node coordinates into the planar map frame.
pub trait Projector {
    fn forward(&self, point: &GeoPoint) -> CoreResult<[f64; 3]>;
}
