//! Output formats fed from the unified mesh.

pub mod devsim_script;
pub mod exodus;
pub mod gmsh;
pub mod summary;
pub mod tetgen;
pub mod xml_writer;

pub use devsim_script::DevsimScriptWriter;
pub use exodus::{ExodusBlock, ExodusModel, ExodusWriter};
pub use gmsh::GmshWriter;
pub use summary::DeviceSummary;
pub use tetgen::TetgenWriter;
pub use xml_writer::VTUWriter;
