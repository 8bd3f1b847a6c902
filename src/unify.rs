use tracing::{debug, warn};

use crate::error::TopologyError;
use crate::structs_and_impls::*;

/// One element of the unified stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshElement {
    pub shape: ElementShape,
    pub physical_index: usize,
    pub nodes: Vec<usize>,              // Global (0-based) vertex indices
}

/// Contiguous slice of the element stream that belongs to one region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionBlock {
    pub name: String,
    pub kind: RegionKind,
    pub shape: ElementShape,
    pub physical_index: usize,
    pub start: usize,                   // First element of the block in `UnifiedMesh::elements`
    pub len: usize,
    pub coordinates: Vec<usize>,        // Vertices used by the region, sorted
    pub bulk_names: Vec<String>,        // Names of the bulk regions a boundary is attached to
}

impl RegionBlock {
    pub fn material(&self) -> Option<&str> {
        match &self.kind {
            RegionKind::Bulk { material } | RegionKind::Contact { material, .. } => Some(material),
            RegionKind::Interface { .. } => None,
        }
    }

    pub fn dimension(&self) -> usize {
        self.shape.dimension()
    }
}

/// Global per-node field built from per-region datasets
#[derive(Debug, Clone, PartialEq)]
pub struct NodeField {
    pub name: String,
    pub values: Vec<f64>,
}

/// Single mesh shared by every writer: one vertex table, one element stream,
/// one physical index per region.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedMesh {
    pub dimension: usize,
    pub coordinates: Vec<[f64; 3]>,
    pub physical_names: Vec<String>,
    pub elements: Vec<MeshElement>,
    pub blocks: Vec<RegionBlock>,
}

impl UnifiedMesh {
    pub fn num_nodes(&self) -> usize {
        self.coordinates.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn block_elements(&self, block: &RegionBlock) -> &[MeshElement] {
        &self.elements[block.start..block.start + block.len]
    }

    pub fn bulk_blocks(&self) -> impl Iterator<Item = &RegionBlock> {
        self.blocks.iter().filter(|b| matches!(b.kind, RegionKind::Bulk { .. }))
    }

    pub fn contact_blocks(&self) -> impl Iterator<Item = &RegionBlock> {
        self.blocks.iter().filter(|b| matches!(b.kind, RegionKind::Contact { .. }))
    }

    pub fn interface_blocks(&self) -> impl Iterator<Item = &RegionBlock> {
        self.blocks.iter().filter(|b| matches!(b.kind, RegionKind::Interface { .. }))
    }

    /// Flat stream `type_code, physical_index, nodes...` for every element in region order
    pub fn element_stream(&self) -> Vec<usize> {
        let mut stream = Vec::new();
        for element in &self.elements {
            stream.push(element.shape.type_code());
            stream.push(element.physical_index);
            stream.extend_from_slice(&element.nodes);
        }
        stream
    }

    /// Physical tags for the exported formats: contacts, then interfaces, then bulk regions
    pub fn physical_groups(&self) -> Vec<PhysicalGroup> {
        self.contact_blocks()
            .chain(self.interface_blocks())
            .chain(self.bulk_blocks())
            .enumerate()
            .map(|(i, block)| PhysicalGroup {
                dim: block.dimension(),
                name: block.name.clone(),
                index: i + 1,
                element_shape_code: block.shape.gmsh_code(),
                region: block.physical_index,
            })
            .collect()
    }

    /// Scatter region datasets onto the global node numbering.
    ///
    /// Each component gets one zero-initialised array. Regions sharing a node
    /// overwrite each other in dataset order, so the last region wins.
    pub fn node_fields(&self, datasets: &[Dataset]) -> Vec<NodeField> {
        let mut fields: Vec<NodeField> = Vec::new();

        for dataset in datasets {
            let block = match self.blocks.iter().find(|b| b.physical_index == dataset.region) {
                Some(block) => block,
                None => {
                    warn!("Dataset {} refers to unknown region {}", dataset.name, dataset.region);
                    continue;
                }
            };
            if dataset.node_count() != block.coordinates.len() {
                warn!(
                    "Dataset {} has {} nodes, region {} has {}",
                    dataset.name,
                    dataset.node_count(),
                    block.name,
                    block.coordinates.len()
                );
                continue;
            }

            for (name, row) in dataset.component_names().into_iter().zip(&dataset.rows) {
                let position = match fields.iter().position(|f| f.name == name) {
                    Some(position) => position,
                    None => {
                        fields.push(NodeField {
                            name,
                            values: vec![0.0; self.num_nodes()],
                        });
                        fields.len() - 1
                    }
                };
                let values = &mut fields[position].values;
                for (&node, &value) in block.coordinates.iter().zip(row) {
                    values[node] = value;
                }
            }
        }
        fields
    }
}

pub struct MeshUnifier;

impl MeshUnifier {
    /// Number the regions in order and flatten them into one mesh.
    /// Coordinates are multiplied by `scale` on every axis.
    pub fn unify(
        dimension: usize,
        vertices: &Vertices,
        regions: &[Region],
        scale: f64,
    ) -> Result<UnifiedMesh, TopologyError> {
        let coordinates = vertices
            .points
            .iter()
            .map(|p| [p[0] * scale, p[1] * scale, p[2] * scale])
            .collect();

        let mut elements = Vec::new();
        let mut blocks = Vec::with_capacity(regions.len());
        let mut physical_names = Vec::with_capacity(regions.len());
        let mut physical_index = 0;

        for region in regions {
            if let Some(&node) = region.elements.coordinates.last() {
                if node >= vertices.len() {
                    return Err(TopologyError::NodeOutOfRange {
                        region: region.name.clone(),
                        node,
                        nodes: vertices.len(),
                    });
                }
            }

            let bulk_names = region
                .bulk_references()
                .into_iter()
                .map(|reference| {
                    regions
                        .get(reference)
                        .map(|bulk| bulk.name.clone())
                        .ok_or_else(|| TopologyError::DanglingReference {
                            region: region.name.clone(),
                            reference,
                        })
                })
                .collect::<Result<Vec<String>, TopologyError>>()?;

            let start = elements.len();
            elements.extend(region.elements.elements.iter().map(|nodes| MeshElement {
                shape: region.elements.shape,
                physical_index,
                nodes: nodes.clone(),
            }));

            debug!(
                "physical {} '{}': {} {}",
                physical_index,
                region.name,
                region.elements.len(),
                region.elements.shape.name()
            );

            blocks.push(RegionBlock {
                name: region.name.clone(),
                kind: region.kind.clone(),
                shape: region.elements.shape,
                physical_index,
                start,
                len: region.elements.len(),
                coordinates: region.elements.coordinates.clone(),
                bulk_names,
            });
            physical_names.push(region.name.clone());
            physical_index += 1;
        }

        Ok(UnifiedMesh {
            dimension,
            coordinates,
            physical_names,
            elements,
            blocks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertices() -> Vertices {
        Vertices {
            dimension: 2,
            points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        }
    }

    fn regions() -> Vec<Region> {
        let bulk = Region::new(
            0,
            "silicon",
            RegionKind::Bulk { material: "Silicon".into() },
            ElementTable::new(ElementShape::Triangle, vec![vec![0, 1, 2], vec![1, 3, 2]]),
        );
        let contact = Region::new(
            1,
            "anode",
            RegionKind::Contact { material: CONTACT_MATERIAL.into(), bulk: 0 },
            ElementTable::new(ElementShape::Edge, vec![vec![0, 1]]),
        );
        let cathode = Region::new(
            2,
            "cathode",
            RegionKind::Contact { material: CONTACT_MATERIAL.into(), bulk: 0 },
            ElementTable::new(ElementShape::Edge, vec![vec![2, 3]]),
        );
        vec![bulk, contact, cathode]
    }

    #[test]
    fn test_unified_numbering() {
        let mesh = MeshUnifier::unify(2, &vertices(), &regions(), 1.0).unwrap();

        assert_eq!(mesh.num_elements(), 4);
        assert_eq!(mesh.physical_names, vec!["silicon", "anode", "cathode"]);

        let physical: Vec<usize> = mesh.elements.iter().map(|e| e.physical_index).collect();
        assert_eq!(physical, vec![0, 0, 1, 2]);

        // 1-based node ids stay within [1, num_nodes]
        for element in &mesh.elements {
            for node in &element.nodes {
                assert!((1..=mesh.num_nodes()).contains(&(node + 1)));
            }
        }

        assert_eq!(
            mesh.element_stream(),
            vec![2, 0, 0, 1, 2, 2, 0, 1, 3, 2, 1, 1, 0, 1, 1, 2, 2, 3]
        );
        assert_eq!(mesh.blocks[1].bulk_names, vec!["silicon"]);
        assert_eq!(mesh.block_elements(&mesh.blocks[2])[0].nodes, vec![2, 3]);
    }

    #[test]
    fn test_coordinates_are_scaled() {
        let mesh = MeshUnifier::unify(2, &vertices(), &regions(), 1e-4).unwrap();
        assert_relative_eq!(mesh.coordinates[3][0], 1e-4);
        assert_relative_eq!(mesh.coordinates[3][1], 1e-4);
        assert_relative_eq!(mesh.coordinates[3][2], 0.0);
    }

    #[test]
    fn test_physical_groups_put_boundaries_first() {
        let mesh = MeshUnifier::unify(2, &vertices(), &regions(), 1.0).unwrap();
        let groups = mesh.physical_groups();

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["anode", "cathode", "silicon"]);
        assert_eq!(groups.iter().map(|g| g.index).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(groups[0].dim, 1);
        assert_eq!(groups[0].element_shape_code, 1);
        assert_eq!(groups[2].element_shape_code, 2);
        assert_eq!(groups[2].region, 0);
    }

    #[test]
    fn test_node_out_of_range() {
        let mut regions = regions();
        regions[1].elements = ElementTable::new(ElementShape::Edge, vec![vec![3, 7]]);
        let err = MeshUnifier::unify(2, &vertices(), &regions, 1.0).unwrap_err();
        assert!(matches!(err, TopologyError::NodeOutOfRange { node: 7, nodes: 4, .. }));
    }

    #[test]
    fn test_node_fields_last_region_wins() {
        let left = Region::new(
            0,
            "left",
            RegionKind::Bulk { material: "Silicon".into() },
            ElementTable::new(ElementShape::Triangle, vec![vec![0, 1, 2]]),
        );
        let right = Region::new(
            1,
            "right",
            RegionKind::Bulk { material: "Oxide".into() },
            ElementTable::new(ElementShape::Triangle, vec![vec![1, 3, 2]]),
        );
        let mesh = MeshUnifier::unify(2, &vertices(), &[left, right], 1.0).unwrap();

        let datasets = vec![
            Dataset { name: "Potential".into(), region: 0, rows: vec![vec![1.0, 2.0, 3.0]] },
            Dataset { name: "Potential".into(), region: 1, rows: vec![vec![20.0, 30.0, 40.0]] },
            Dataset { name: "E".into(), region: 1, rows: vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]] },
        ];
        let fields = mesh.node_fields(&datasets);

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "Potential");
        // nodes 1 and 2 are shared, region 1 is merged last
        assert_eq!(fields[0].values, vec![1.0, 20.0, 30.0, 40.0]);
        assert_eq!(fields[1].name, "E_0");
        assert_eq!(fields[1].values, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(fields[2].values, vec![0.0, 4.0, 5.0, 6.0]);
    }
}
