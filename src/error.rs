use std::io;

use thiserror::Error;

/// Errors raised while decoding the TDR container into regions, vertices and datasets.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),                          // File I/O errors (e.g., file not found)

    #[error("TDR source error: {0}")]
    Source(String),                                 // Missing group/attribute/dataset or backend failure

    #[error("malformed element block: {reason}")]
    MalformedElementBlock { reason: String },       // Inconsistent type tags or truncated block

    #[error("region '{region}' has {found}-dimensional elements, expected {expected}")]
    UnexpectedElementShape {
        region: String,
        expected: usize,
        found: usize,
    },

    #[error("unsupported vertex dimension {0}, expected 2 or 3")]
    UnsupportedVertexDimension(usize),

    #[error("region '{region}' has unsupported type code {code}")]
    UnsupportedRegionType { region: String, code: i64 },

    #[error("expecting only 1 part in region '{region}', found {parts}")]
    UnexpectedPartCount { region: String, parts: i64 },

    #[error("dataset '{dataset}' has {values} values, expected {nodes} nodes x {rows} rows")]
    DatasetSizeMismatch {
        dataset: String,
        nodes: usize,
        rows: usize,
        values: usize,
    },
}

/// Errors raised while verifying and repairing boundary linkage.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("could not find attachment for contact '{contact}'")]
    OrphanContact { contact: String },

    #[error("interface '{interface}' disappeared after removing contact nodes")]
    VanishedInterface { interface: String },

    #[error("region '{region}' references missing bulk region {reference}")]
    DanglingReference { region: String, reference: usize },

    #[error("cannot extract a surface from {dim}-dimensional region '{region}'")]
    SurfaceOfLowDimension { region: String, dim: usize },

    #[error("region '{region}' uses node {node} but the device has {nodes} vertices")]
    NodeOutOfRange { region: String, node: usize, nodes: usize },
}

/// Writer errors for output operations
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{format} output needs a {expected}-dimensional mesh, got {found}")]
    UnsupportedDimension {
        format: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{format} output needs a {min}- to {max}-dimensional mesh, got {found}")]
    DimensionOutOfRange {
        format: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("{format} output cannot store elements with {nodes} nodes")]
    UnsupportedElement { format: &'static str, nodes: usize },

    #[error("VTK error: {0}")]
    Vtk(String),

    #[error("NetCDF error: {0}")]
    NetCdf(String),

    #[error("{0} support was not enabled at build time")]
    FeatureDisabled(&'static str),
}

// vtkio's error does not implement std::error::Error, so keep only its message
impl From<vtkio::Error> for WriterError {
    fn from(err: vtkio::Error) -> Self {
        WriterError::Vtk(format!("{:?}", err))
    }
}

#[cfg(feature = "exodus")]
impl From<netcdf::Error> for WriterError {
    fn from(err: netcdf::Error) -> Self {
        WriterError::NetCdf(err.to_string())
    }
}

/// Top level error of a full conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Writer(#[from] WriterError),
}
