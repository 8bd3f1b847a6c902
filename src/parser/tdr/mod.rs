//! Reader side of the converter: TDR container access and decoding.

pub mod datasets;
pub mod elements;
pub mod regions;
pub mod source;

use std::path::Path;

use crate::error::ParseError;

pub use datasets::DatasetLoader;
pub use elements::ElementBlockDecoder;
pub use regions::{TdrGeometry, TdrGeometryParser};
pub use source::{MemorySource, TdrSource};

#[cfg(feature = "hdf5")]
pub use source::Hdf5Source;

/// Open a TDR file from disk
#[cfg(feature = "hdf5")]
pub fn open_tdr<P: AsRef<Path>>(path: P) -> Result<Box<dyn TdrSource>, ParseError> {
    Ok(Box::new(Hdf5Source::open(path)?))
}

/// Open a TDR file from disk
#[cfg(not(feature = "hdf5"))]
pub fn open_tdr<P: AsRef<Path>>(path: P) -> Result<Box<dyn TdrSource>, ParseError> {
    Err(ParseError::Source(format!(
        "cannot read {}: built without the `hdf5` feature",
        path.as_ref().display()
    )))
}
