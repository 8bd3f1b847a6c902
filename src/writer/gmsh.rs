use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::WriterError;
use crate::unify::UnifiedMesh;

/// GMSH 2.2 ASCII writer
pub struct GmshWriter;

impl GmshWriter {
    pub fn write<P: AsRef<Path>>(mesh: &UnifiedMesh, path: P) -> Result<(), WriterError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_to(&mut writer, mesh)?;
        writer.flush()?;
        info!("Wrote GMSH mesh {}", path.display());
        Ok(())
    }

    pub fn write_to<W: Write>(writer: &mut W, mesh: &UnifiedMesh) -> Result<(), WriterError> {
        let groups = mesh.physical_groups();

        writeln!(writer, "$MeshFormat")?;
        writeln!(writer, "2.2 0 8")?;
        writeln!(writer, "$EndMeshFormat")?;

        writeln!(writer, "$PhysicalNames")?;
        writeln!(writer, "{}", groups.len())?;
        for group in &groups {
            writeln!(writer, "{} {} \"{}\"", group.dim, group.index, group.name)?;
        }
        writeln!(writer, "$EndPhysicalNames")?;

        writeln!(writer, "$Nodes")?;
        writeln!(writer, "{}", mesh.num_nodes())?;
        for (i, p) in mesh.coordinates.iter().enumerate() {
            writeln!(writer, "{} {} {} {}", i + 1, p[0], p[1], p[2])?;
        }
        writeln!(writer, "$EndNodes")?;

        // Boundaries first, in physical group order
        writeln!(writer, "$Elements")?;
        writeln!(writer, "{}", mesh.num_elements())?;
        let mut index = 1;
        for group in &groups {
            let block = &mesh.blocks[group.region];
            for element in mesh.block_elements(block) {
                // elm-type number-of-tags physical-tag elementary-tag
                write!(
                    writer,
                    "{} {} 2 {} {}",
                    index, group.element_shape_code, group.index, group.index
                )?;
                for node in &element.nodes {
                    write!(writer, " {}", node + 1)?;
                }
                writeln!(writer)?;
                index += 1;
            }
        }
        writeln!(writer, "$EndElements")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs_and_impls::*;
    use crate::unify::MeshUnifier;

    fn square_mesh() -> UnifiedMesh {
        let vertices = Vertices {
            dimension: 2,
            points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        };
        let regions = vec![
            Region::new(
                0,
                "silicon",
                RegionKind::Bulk { material: "Silicon".into() },
                ElementTable::new(ElementShape::Triangle, vec![vec![0, 1, 2], vec![1, 3, 2]]),
            ),
            Region::new(
                1,
                "anode",
                RegionKind::Contact { material: CONTACT_MATERIAL.into(), bulk: 0 },
                ElementTable::new(ElementShape::Edge, vec![vec![0, 1]]),
            ),
        ];
        MeshUnifier::unify(2, &vertices, &regions, 0.5).unwrap()
    }

    #[test]
    fn test_write_gmsh_sections() {
        let mut buffer = Vec::new();
        GmshWriter::write_to(&mut buffer, &square_mesh()).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let expected = "\
$MeshFormat
2.2 0 8
$EndMeshFormat
$PhysicalNames
2
1 1 \"anode\"
2 2 \"silicon\"
$EndPhysicalNames
$Nodes
4
1 0 0 0
2 0.5 0 0
3 0 0.5 0
4 0.5 0.5 0
$EndNodes
$Elements
3
1 1 2 1 1 1 2
2 2 2 2 2 1 2 3
3 2 2 2 2 2 4 3
$EndElements
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_write_gmsh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.msh");
        GmshWriter::write(&square_mesh(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("$MeshFormat\n2.2 0 8\n"));
        assert!(text.ends_with("$EndElements\n"));
    }
}
