use tracing::{debug, info, warn};

use super::source::{TdrSource, STATE_PATH};
use crate::error::ParseError;
use crate::structs_and_impls::*;

/// TDR `location type` of values stored per vertex
const LOCATION_VERTEX: i64 = 0;
/// TDR `structure type` codes of the fields we understand
const STRUCTURE_SCALAR: i64 = 0;
const STRUCTURE_VECTOR: i64 = 1;

/// Loads node fields of bulk regions from `state_0`
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn load<S: TdrSource + ?Sized>(source: &S, regions: &[Region]) -> Result<Vec<Dataset>, ParseError> {
        info!("Loading data");
        let mut datasets = Vec::new();

        for member in source.members(STATE_PATH)? {
            if !member.starts_with("dataset") {             // Skip non data sets
                continue;
            }
            let path = format!("{}/{}", STATE_PATH, member);

            let name = source.require_str_attr(&path, "name")?;
            let region_index = source.require_int_attr(&path, "region")?;
            let region = usize::try_from(region_index)
                .ok()
                .and_then(|i| regions.get(i))
                .ok_or_else(|| {
                    ParseError::Source(format!("dataset '{}' refers to missing region {}", member, region_index))
                })?;

            if !region.is_bulk() {
                debug!("Skip loading data for {} {} of type {}", name, region.name, region.kind.type_name());
                continue;
            }

            let structure_type = source.require_int_attr(&path, "structure type")?;
            let location_type = source.require_int_attr(&path, "location type")?;
            let row_count = source.int_attr(&path, "number of rows")?.unwrap_or(1);
            let row_count = usize::try_from(row_count)
                .ok()
                .filter(|&r| r > 0)
                .ok_or_else(|| ParseError::Source(format!("dataset '{}' has {} rows", member, row_count)))?;

            let values = source.float_array(&format!("{}/values", path))?;

            if location_type != LOCATION_VERTEX
                || (structure_type != STRUCTURE_SCALAR && structure_type != STRUCTURE_VECTOR)
            {
                warn!(
                    "Skipping data for {} {} {}: region has {} nodes and {} {}, {} values, structure {} location {}",
                    name,
                    region.name,
                    member,
                    region.elements.node_count(),
                    region.elements.len(),
                    region.elements.shape.name(),
                    values.len(),
                    structure_type,
                    location_type
                );
                continue;
            }

            let rows = Self::reshape(&member, &values, region.elements.node_count(), row_count)?;
            debug!("Loaded {} for {} from {} ({} rows)", name, region.name, member, row_count);

            datasets.push(Dataset {
                name,
                region: region.index,
                rows,
            });
        }

        Ok(datasets)
    }

    /// Split node-major interleaved values into `row_count` rows of `node_count` values
    pub fn reshape(
        dataset: &str,
        values: &[f64],
        node_count: usize,
        row_count: usize,
    ) -> Result<Vec<Vec<f64>>, ParseError> {
        if values.len() != node_count * row_count {
            return Err(ParseError::DatasetSizeMismatch {
                dataset: dataset.to_string(),
                nodes: node_count,
                rows: row_count,
                values: values.len(),
            });
        }

        let mut rows = vec![Vec::with_capacity(node_count); row_count];
        for node in values.chunks_exact(row_count) {
            for (row, value) in rows.iter_mut().zip(node) {
                row.push(*value);
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tdr::regions::TdrGeometryParser;
    use crate::parser::tdr::source::MemorySource;

    fn device() -> MemorySource {
        let mut source = MemorySource::device(2, 2, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        source.add_region("silicon", 0, Some("Silicon"), &[], vec![2, 0, 1, 2, 2, 1, 3, 2]);
        source.add_region("anode", 1, None, &[0], vec![1, 0, 1]);
        source
    }

    #[test]
    fn test_reshape_transposes_interleaved_rows() {
        let rows = DatasetLoader::reshape("E", &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0], 3, 2).unwrap();
        assert_eq!(rows, vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]]);
    }

    #[test]
    fn test_reshape_requires_exact_size() {
        assert_eq!(DatasetLoader::reshape("x", &[0.0; 30], 10, 3).unwrap().len(), 3);
        for len in [29, 31, 10] {
            let err = DatasetLoader::reshape("x", &vec![0.0; len], 10, 3).unwrap_err();
            assert!(matches!(err, ParseError::DatasetSizeMismatch { nodes: 10, rows: 3, .. }));
        }
    }

    #[test]
    fn test_load_skips_unsupported_and_boundary_fields() {
        let mut source = device();
        source.add_dataset("Potential", 0, 0, 0, None, vec![0.0, 0.1, 0.2, 0.3]);
        source.add_dataset("ContactCurrent", 1, 0, 0, None, vec![1.0, 1.0]);
        source.add_dataset("Stress", 0, 2, 0, Some(6), vec![0.0; 24]);
        source.add_dataset("ElementField", 0, 0, 1, None, vec![0.0; 2]);
        source.add_dataset("E", 0, 1, 0, Some(2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);

        let geometry = TdrGeometryParser::parse(&source).unwrap();
        let datasets = DatasetLoader::load(&source, &geometry.regions).unwrap();

        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].name, "Potential");
        assert_eq!(datasets[0].rows, vec![vec![0.0, 0.1, 0.2, 0.3]]);
        assert_eq!(datasets[1].rows, vec![vec![1.0, 3.0, 5.0, 7.0], vec![2.0, 4.0, 6.0, 8.0]]);
    }

    #[test]
    fn test_load_fails_on_size_mismatch() {
        let mut source = device();
        source.add_dataset("Potential", 0, 0, 0, None, vec![0.0; 5]);
        let geometry = TdrGeometryParser::parse(&source).unwrap();
        let err = DatasetLoader::load(&source, &geometry.regions).unwrap_err();
        assert!(matches!(err, ParseError::DatasetSizeMismatch { values: 5, nodes: 4, .. }));
    }
}
