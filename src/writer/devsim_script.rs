use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::WriterError;
use crate::unify::UnifiedMesh;

/// Python script that rebuilds the device in DEVSIM from the written GMSH file
pub struct DevsimScriptWriter;

impl DevsimScriptWriter {
    pub fn write<P: AsRef<Path>>(
        mesh: &UnifiedMesh,
        gmsh_file: &str,
        device_name: &str,
        path: P,
    ) -> Result<(), WriterError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_to(&mut writer, mesh, gmsh_file, device_name)?;
        writer.flush()?;
        info!("Wrote DEVSIM import script {}", path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(
        writer: &mut W,
        mesh: &UnifiedMesh,
        gmsh_file: &str,
        device: &str,
    ) -> Result<(), WriterError> {
        writeln!(writer, "import ds")?;
        writeln!(writer, "ds.create_gmsh_mesh(file=\"{}\", mesh=\"{}\")", gmsh_file, device)?;

        for block in mesh.bulk_blocks() {
            writeln!(
                writer,
                "ds.add_gmsh_region(mesh=\"{}\", gmsh_name=\"{}\", region=\"{}\", material=\"{}\")",
                device,
                block.name,
                block.name,
                block.material().unwrap_or_default()
            )?;
        }
        for block in mesh.interface_blocks() {
            let (region0, region1) = match block.bulk_names.as_slice() {
                [r0, r1] => (r0.as_str(), r1.as_str()),
                _ => ("", ""),
            };
            writeln!(
                writer,
                "ds.add_gmsh_interface(mesh=\"{}\", gmsh_name=\"{}\", name=\"{}\", region0=\"{}\", region1=\"{}\")",
                device, block.name, block.name, region0, region1
            )?;
        }
        for block in mesh.contact_blocks() {
            writeln!(
                writer,
                "ds.add_gmsh_contact(mesh=\"{}\", gmsh_name=\"{}\", name=\"{}\", region=\"{}\", material=\"{}\")",
                device,
                block.name,
                block.name,
                block.bulk_names.first().map(String::as_str).unwrap_or_default(),
                block.material().unwrap_or_default()
            )?;
        }

        writeln!(writer, "ds.finalize_mesh(mesh=\"{}\")", device)?;
        writeln!(writer, "ds.create_device(mesh=\"{}\", device=\"{}\")", device, device)?;
        Ok(())
    }
}
