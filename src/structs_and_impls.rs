use std::collections::BTreeSet;

/// Material recorded for every contact region, TDR contacts carry no material of their own.
pub const CONTACT_MATERIAL: &str = "metal";

/// Simplex shapes found in TDR element blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementShape {
    Point,                          // 1 node,  dimension 0
    Edge,                           // 2 nodes, dimension 1
    Triangle,                       // 3 nodes, dimension 2
    Tetrahedron,                    // 4 nodes, dimension 3
}

impl ElementShape {
    pub fn from_dimension(dim: usize) -> Option<ElementShape> {
        match dim {
            0 => Some(ElementShape::Point),
            1 => Some(ElementShape::Edge),
            2 => Some(ElementShape::Triangle),
            3 => Some(ElementShape::Tetrahedron),
            _ => None,
        }
    }

    /// Element tag used inside TDR `elements_0` blocks
    pub fn from_tdr_tag(tag: i64) -> Option<ElementShape> {
        match tag {
            0 => Some(ElementShape::Point),
            1 => Some(ElementShape::Edge),
            2 => Some(ElementShape::Triangle),
            5 => Some(ElementShape::Tetrahedron),
            _ => None,
        }
    }

    pub fn tdr_tag(self) -> i64 {
        match self {
            ElementShape::Point => 0,
            ElementShape::Edge => 1,
            ElementShape::Triangle => 2,
            ElementShape::Tetrahedron => 5,
        }
    }

    pub fn dimension(self) -> usize {
        match self {
            ElementShape::Point => 0,
            ElementShape::Edge => 1,
            ElementShape::Triangle => 2,
            ElementShape::Tetrahedron => 3,
        }
    }

    pub fn nodes_per_element(self) -> usize {
        self.dimension() + 1
    }

    /// Type code of the unified element stream (point=0 .. tetrahedron=3)
    pub fn type_code(self) -> usize {
        self.dimension()
    }

    /// GMSH element type number
    pub fn gmsh_code(self) -> usize {
        match self {
            ElementShape::Point => 15,          // 1-node point
            ElementShape::Edge => 1,            // 2-node line
            ElementShape::Triangle => 2,        // 3-node triangle
            ElementShape::Tetrahedron => 4,     // 4-node tetrahedron
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementShape::Point => "points",
            ElementShape::Edge => "edges",
            ElementShape::Triangle => "triangles",
            ElementShape::Tetrahedron => "tetrahedra",
        }
    }

    /// Shape of the boundary facets, None for points
    pub fn facet_shape(self) -> Option<ElementShape> {
        self.dimension()
            .checked_sub(1)
            .and_then(ElementShape::from_dimension)
    }
}

/// A face of a region boundary, node indices kept sorted ascending so that
/// equal faces compare equal regardless of the element orientation they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Face(Vec<usize>);

impl Face {
    pub fn new(mut nodes: Vec<usize>) -> Self {
        nodes.sort_unstable();
        Face(nodes)
    }

    pub fn nodes(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn touches(&self, nodes: &BTreeSet<usize>) -> bool {
        self.0.iter().any(|n| nodes.contains(n))
    }
}

impl From<&[usize]> for Face {
    fn from(nodes: &[usize]) -> Self {
        Face::new(nodes.to_vec())
    }
}

/// Boundary faces of a region. Ordered so every walk over it is reproducible.
pub type SurfaceSet = BTreeSet<Face>;

/// Decoded elements of one region
#[derive(Debug, Clone, PartialEq)]
pub struct ElementTable {
    pub shape: ElementShape,
    pub elements: Vec<Vec<usize>>,          // One entry per element, shape.nodes_per_element() indices each
    pub coordinates: Vec<usize>,            // Sorted distinct node indices referenced by the elements
}

impl ElementTable {
    pub fn new(shape: ElementShape, elements: Vec<Vec<usize>>) -> Self {
        let coordinates = elements
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<usize>>()
            .into_iter()
            .collect();
        ElementTable { shape, elements, coordinates }
    }

    /// Rebuild a table from a face set, elements follow the set order
    pub fn from_faces(shape: ElementShape, faces: &SurfaceSet) -> Self {
        let elements = faces.iter().map(|face| face.nodes().to_vec()).collect();
        ElementTable::new(shape, elements)
    }

    pub fn dimension(&self) -> usize {
        self.shape.dimension()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }
}

/// What a region is, with the fields that only make sense for that kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionKind {
    Bulk { material: String },
    Contact { material: String, bulk: usize },
    Interface { bulk0: usize, bulk1: usize },
}

impl RegionKind {
    /// Region type code stored in the TDR `type` attribute
    pub fn code(&self) -> i64 {
        match self {
            RegionKind::Bulk { .. } => 0,
            RegionKind::Contact { .. } => 1,
            RegionKind::Interface { .. } => 2,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RegionKind::Bulk { .. } => "region",
            RegionKind::Contact { .. } => "contact",
            RegionKind::Interface { .. } => "interface",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    pub index: usize,                   // Position in the region list, stable once assigned
    pub name: String,
    pub kind: RegionKind,
    pub elements: ElementTable,
    pub surface: SurfaceSet,            // Filled by the surface extractor
}

impl Region {
    pub fn new(index: usize, name: impl Into<String>, kind: RegionKind, elements: ElementTable) -> Self {
        Region {
            index,
            name: name.into(),
            kind,
            elements,
            surface: SurfaceSet::new(),
        }
    }

    pub fn is_bulk(&self) -> bool {
        matches!(self.kind, RegionKind::Bulk { .. })
    }

    pub fn is_contact(&self) -> bool {
        matches!(self.kind, RegionKind::Contact { .. })
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.kind, RegionKind::Interface { .. })
    }

    pub fn material(&self) -> Option<&str> {
        match &self.kind {
            RegionKind::Bulk { material } | RegionKind::Contact { material, .. } => Some(material),
            RegionKind::Interface { .. } => None,
        }
    }

    /// Bulk regions a boundary region is attached to
    pub fn bulk_references(&self) -> Vec<usize> {
        match self.kind {
            RegionKind::Bulk { .. } => Vec::new(),
            RegionKind::Contact { bulk, .. } => vec![bulk],
            RegionKind::Interface { bulk0, bulk1 } => vec![bulk0, bulk1],
        }
    }

    /// Replace the faces of a boundary region, elements are rebuilt to match
    pub fn replace_faces(&mut self, faces: SurfaceSet) {
        self.elements = ElementTable::from_faces(self.elements.shape, &faces);
        self.surface = faces;
    }
}

/// Vertex coordinates of the whole device. 2-D files get z = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertices {
    pub dimension: usize,
    pub points: Vec<[f64; 3]>,
}

impl Vertices {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Node field attached to one bulk region, `rows[r][n]` follows the region's `coordinates`
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub region: usize,
    pub rows: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn node_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// One output name per row: `name` for scalars, `name_0`, `name_1`, ... otherwise
    pub fn component_names(&self) -> Vec<String> {
        if self.rows.len() == 1 {
            vec![self.name.clone()]
        } else {
            (0..self.rows.len())
                .map(|row| format!("{}_{}", self.name, row))
                .collect()
        }
    }
}

/// Physical tag of a region in the exported formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalGroup {
    pub dim: usize,
    pub name: String,
    pub index: usize,                   // 1-based
    pub element_shape_code: usize,      // GMSH element type of the group's elements
    pub region: usize,                  // Region (and physical index) the group tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_tables() {
        assert_eq!(ElementShape::from_tdr_tag(5), Some(ElementShape::Tetrahedron));
        assert_eq!(ElementShape::from_tdr_tag(3), None);
        assert_eq!(ElementShape::Tetrahedron.nodes_per_element(), 4);
        assert_eq!(ElementShape::Tetrahedron.facet_shape(), Some(ElementShape::Triangle));
        assert_eq!(ElementShape::Point.facet_shape(), None);

        let codes: Vec<usize> = [
            ElementShape::Point,
            ElementShape::Edge,
            ElementShape::Triangle,
            ElementShape::Tetrahedron,
        ]
        .iter()
        .map(|s| s.gmsh_code())
        .collect();
        assert_eq!(codes, vec![15, 1, 2, 4]);
    }

    #[test]
    fn test_face_is_canonical() {
        assert_eq!(Face::new(vec![7, 2, 5]), Face::new(vec![5, 7, 2]));
        assert_eq!(Face::new(vec![7, 2, 5]).nodes(), &[2, 5, 7]);
    }

    #[test]
    fn test_element_table_coordinates() {
        let table = ElementTable::new(ElementShape::Triangle, vec![vec![4, 1, 2], vec![2, 1, 9]]);
        assert_eq!(table.coordinates, vec![1, 2, 4, 9]);
        assert_eq!(table.node_count(), 4);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_replace_faces_rebuilds_elements() {
        let elements = ElementTable::new(ElementShape::Edge, vec![vec![3, 1], vec![1, 0]]);
        let mut region = Region::new(2, "iface", RegionKind::Interface { bulk0: 0, bulk1: 1 }, elements);

        let mut faces = SurfaceSet::new();
        faces.insert(Face::new(vec![3, 1]));
        region.replace_faces(faces);

        assert_eq!(region.elements.elements, vec![vec![1, 3]]);
        assert_eq!(region.elements.coordinates, vec![1, 3]);
        assert_eq!(region.surface.len(), 1);
    }

    #[test]
    fn test_dataset_component_names() {
        let scalar = Dataset { name: "Potential".into(), region: 0, rows: vec![vec![0.0; 3]] };
        assert_eq!(scalar.component_names(), vec!["Potential".to_string()]);

        let vector = Dataset { name: "E".into(), region: 0, rows: vec![vec![0.0; 3]; 2] };
        assert_eq!(vector.component_names(), vec!["E_0".to_string(), "E_1".to_string()]);
        assert_eq!(vector.node_count(), 3);
    }
}
