use vtkio::model::*; // import model definition of a VTK file

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::WriterError;
use crate::structs_and_impls::ElementShape;
use crate::unify::{NodeField, UnifiedMesh};

/// VTK XML unstructured grid (.vtu) writer
pub struct VTUWriter;

impl VTUWriter {
    pub fn write_vtu<P: AsRef<Path>>(
        mesh: &UnifiedMesh,
        node_fields: &[NodeField],
        output_path: P,
    ) -> Result<(), WriterError> {
        let vtu = Self::to_xml(mesh, node_fields)?;
        fs::write(output_path.as_ref(), &vtu)?;
        info!("Wrote VTU mesh {}", output_path.as_ref().display());
        Ok(())
    }

    /// Serialize the whole mesh, every region is kept and tagged by its physical index
    pub fn to_xml(mesh: &UnifiedMesh, node_fields: &[NodeField]) -> Result<Vec<u8>, WriterError> {
        let mut vtu = Vec::new();

        // 1. Points, always 3 components
        let points_data: Vec<f64> = mesh
            .coordinates
            .iter()
            .flat_map(|p| p.iter().copied())
            .collect();

        // 2. Connectivity and offsets
        let total_connectivity: usize = mesh.elements.iter().map(|e| e.nodes.len()).sum();
        let mut connectivity = Vec::with_capacity(total_connectivity);
        let mut offsets = Vec::with_capacity(mesh.num_elements());
        let mut cell_types = Vec::with_capacity(mesh.num_elements());
        let mut physical = Vec::with_capacity(mesh.num_elements());
        let mut current_offset = 0;

        for element in &mesh.elements {
            connectivity.extend(element.nodes.iter().map(|&id| id as u64));
            current_offset += element.nodes.len() as u64;
            offsets.push(current_offset);
            cell_types.push(Self::cell_type(element.shape));
            physical.push(element.physical_index as i32);
        }

        // 3. Node fields as scalar point data
        let point_attributes = node_fields
            .iter()
            .map(|field| Attribute::scalars(field.name.as_str(), 1).with_data(IOBuffer::F64(field.values.clone())))
            .collect();

        debug!(
            "VTU: {} points, {} cells, {} point fields",
            mesh.num_nodes(),
            cell_types.len(),
            node_fields.len()
        );

        Vtk {
            version: Version { major: 2, minor: 2 },
            title: String::new(),
            byte_order: ByteOrder::LittleEndian,
            file_path: None,
            data: DataSet::inline(UnstructuredGridPiece {
                points: IOBuffer::F64(points_data),
                cells: Cells {
                    cell_verts: VertexNumbers::XML {
                        connectivity,
                        offsets,
                    },
                    types: cell_types,
                },
                data: Attributes {
                    point: point_attributes,
                    cell: vec![Attribute::scalars("physical", 1).with_data(IOBuffer::I32(physical))],
                },
            }),
        }
        .write_xml(&mut vtu)?;

        Ok(vtu)
    }

    pub fn cell_type(shape: ElementShape) -> CellType {
        match shape {
            ElementShape::Point => CellType::Vertex,
            ElementShape::Edge => CellType::Line,
            ElementShape::Triangle => CellType::Triangle,
            ElementShape::Tetrahedron => CellType::Tetra,
        }
    }
}
