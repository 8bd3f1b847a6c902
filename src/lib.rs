// src/lib.rs

// Top-level modules (each has its own mod.rs or file):
pub mod convert;
pub mod error;
pub mod parser;
pub mod structs_and_impls;
pub mod topology;
pub mod unify;
pub mod writer;

pub use convert::{convert, Conversion, ConvertOptions};
pub use error::{ConvertError, ParseError, TopologyError, WriterError};
pub use unify::{MeshUnifier, NodeField, UnifiedMesh};
