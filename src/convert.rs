use tracing::info;

use crate::error::ConvertError;
use crate::parser::tdr::{DatasetLoader, TdrGeometryParser, TdrSource};
use crate::structs_and_impls::*;
use crate::topology::{RepairReport, SurfaceExtractor, TopologyRepairer};
use crate::unify::{MeshUnifier, UnifiedMesh};

/// Knobs of a conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub scale: f64,                         // Applied to every coordinate axis
    pub drop_interfaces_at_contact: bool,   // Strip interface faces touching contact nodes
    pub load_datasets: bool,                // Read node fields from state_0
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            scale: 1.0,
            drop_interfaces_at_contact: false,
            load_datasets: false,
        }
    }
}

impl ConvertOptions {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_drop_interfaces_at_contact(mut self, drop: bool) -> Self {
        self.drop_interfaces_at_contact = drop;
        self
    }

    pub fn with_load_datasets(mut self, load: bool) -> Self {
        self.load_datasets = load;
        self
    }
}

/// Everything a run produces, ready for the writers
#[derive(Debug, Clone)]
pub struct Conversion {
    pub dimension: usize,
    pub regions: Vec<Region>,
    pub mesh: UnifiedMesh,
    pub datasets: Vec<Dataset>,
    pub report: RepairReport,
}

/// Decode, repair and unify the device stored in `source`
pub fn convert<S: TdrSource + ?Sized>(source: &S, options: &ConvertOptions) -> Result<Conversion, ConvertError> {
    let geometry = TdrGeometryParser::parse(source)?;
    info!(
        "Read {}-D device: {} vertices, {} regions",
        geometry.dimension,
        geometry.vertices.len(),
        geometry.regions.len()
    );

    let mut regions = geometry.regions;
    SurfaceExtractor::extract_all(&mut regions)?;
    let report = TopologyRepairer::repair(&mut regions, options.drop_interfaces_at_contact)?;

    let mesh = MeshUnifier::unify(geometry.dimension, &geometry.vertices, &regions, options.scale)?;

    let datasets = if options.load_datasets {
        let datasets = DatasetLoader::load(source, &regions)?;
        info!("Loaded {} datasets", datasets.len());
        datasets
    } else {
        Vec::new()
    };

    Ok(Conversion {
        dimension: geometry.dimension,
        regions,
        mesh,
        datasets,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tdr::MemorySource;
    use crate::topology::RepairAction;

    #[test]
    fn test_default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.scale, 1.0);
        assert!(!options.load_datasets);

        let options = options.with_scale(1e-4).with_load_datasets(true);
        assert_eq!(options.scale, 1e-4);
        assert!(options.load_datasets);
        assert!(!options.drop_interfaces_at_contact);
    }

    #[test]
    fn test_convert_synthesizes_interface() {
        // two unit squares side by side, each split in two triangles
        let mut source = MemorySource::device(
            2,
            2,
            vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0],
        );
        source.add_region("left", 0, Some("Silicon"), &[], vec![2, 0, 1, 4, 2, 0, 4, 3]);
        source.add_region("right", 0, Some("Oxide"), &[], vec![2, 1, 2, 5, 2, 1, 5, 4]);
        source.add_region("anode", 1, None, &[0], vec![1, 0, 3]);
        source.add_dataset("Potential", 0, 0, 0, None, vec![0.0, 1.0, 3.0, 4.0]);

        let conversion = convert(&source, &ConvertOptions::default().with_load_datasets(true)).unwrap();

        assert_eq!(conversion.regions.len(), 4);
        assert_eq!(conversion.mesh.physical_names[3], "left_right");
        assert_eq!(conversion.regions[3].elements.elements, vec![vec![1, 4]]);
        assert!(matches!(
            conversion.report.actions[0],
            RepairAction::InterfaceSynthesized { .. }
        ));
        assert_eq!(conversion.datasets.len(), 1);
    }
}
