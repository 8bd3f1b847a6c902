use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::WriterError;
use crate::structs_and_impls::PhysicalGroup;
use crate::unify::UnifiedMesh;

/// TetGen `.node`, `.ele` and `.face` files sharing one basename.
/// Bulk regions become tetrahedra, contacts and interfaces become faces,
/// both tagged with the physical group index.
pub struct TetgenWriter;

impl TetgenWriter {
    pub fn write<P: AsRef<Path>>(mesh: &UnifiedMesh, basename: P) -> Result<(), WriterError> {
        Self::check_dimension(mesh)?;
        let groups = mesh.physical_groups();

        let path = Self::with_suffix(basename.as_ref(), "node");
        let mut writer = BufWriter::new(File::create(&path)?);
        Self::write_nodes(&mut writer, mesh)?;
        writer.flush()?;
        info!("Wrote TetGen nodes {}", path.display());

        let path = Self::with_suffix(basename.as_ref(), "ele");
        let mut writer = BufWriter::new(File::create(&path)?);
        Self::write_elements(&mut writer, mesh, &groups)?;
        writer.flush()?;
        info!("Wrote TetGen elements {}", path.display());

        let path = Self::with_suffix(basename.as_ref(), "face");
        let mut writer = BufWriter::new(File::create(&path)?);
        Self::write_faces(&mut writer, mesh, &groups)?;
        writer.flush()?;
        info!("Wrote TetGen faces {}", path.display());

        Ok(())
    }

    fn check_dimension(mesh: &UnifiedMesh) -> Result<(), WriterError> {
        if mesh.dimension != 3 {
            return Err(WriterError::UnsupportedDimension {
                format: "TetGen",
                expected: 3,
                found: mesh.dimension,
            });
        }
        Ok(())
    }

    // `device` + "node" gives `device.node`, any dots in the basename are kept
    fn with_suffix(basename: &Path, suffix: &str) -> PathBuf {
        let mut name = basename.as_os_str().to_os_string();
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Node count, 3 dimensions, no attribute, no boundary marker
    pub fn write_nodes<W: Write>(writer: &mut W, mesh: &UnifiedMesh) -> Result<(), WriterError> {
        writeln!(writer, "{} 3 0 0", mesh.num_nodes())?;
        for (i, p) in mesh.coordinates.iter().enumerate() {
            writeln!(writer, "{} {} {} {}", i + 1, p[0], p[1], p[2])?;
        }
        Ok(())
    }

    /// Tetrahedron count, 4 nodes per tetrahedron, 1 region attribute
    pub fn write_elements<W: Write>(
        writer: &mut W,
        mesh: &UnifiedMesh,
        groups: &[PhysicalGroup],
    ) -> Result<(), WriterError> {
        Self::write_groups(writer, mesh, groups, 4, |n| format!("{} 4 1", n))
    }

    /// Face count, 1 boundary marker
    pub fn write_faces<W: Write>(
        writer: &mut W,
        mesh: &UnifiedMesh,
        groups: &[PhysicalGroup],
    ) -> Result<(), WriterError> {
        Self::write_groups(writer, mesh, groups, 3, |n| format!("{} 1", n))
    }

    fn write_groups<W: Write>(
        writer: &mut W,
        mesh: &UnifiedMesh,
        groups: &[PhysicalGroup],
        nodes_per_element: usize,
        header: impl Fn(usize) -> String,
    ) -> Result<(), WriterError> {
        let selected: Vec<&PhysicalGroup> = groups
            .iter()
            .filter(|g| g.dim + 1 == nodes_per_element)
            .collect();

        let count: usize = selected.iter().map(|g| mesh.blocks[g.region].len).sum();
        writeln!(writer, "{}", header(count))?;

        let mut index = 1;
        for group in selected {
            for element in mesh.block_elements(&mesh.blocks[group.region]) {
                if element.nodes.len() != nodes_per_element {
                    return Err(WriterError::UnsupportedElement {
                        format: "TetGen",
                        nodes: element.nodes.len(),
                    });
                }
                write!(writer, "{}", index)?;
                for node in &element.nodes {
                    write!(writer, " {}", node + 1)?;
                }
                writeln!(writer, " {}", group.index)?;
                index += 1;
            }
        }
        Ok(())
    }
}
