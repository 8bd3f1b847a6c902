use tracing::debug;

use super::elements::ElementBlockDecoder;
use super::source::{region_path, TdrSource, GEOMETRY_PATH};
use crate::error::ParseError;
use crate::structs_and_impls::*;

/// Geometry group of a TDR file after decoding, before any topology work
#[derive(Debug, Clone)]
pub struct TdrGeometry {
    pub dimension: usize,
    pub vertices: Vertices,
    pub regions: Vec<Region>,
}

pub struct TdrGeometryParser;

impl TdrGeometryParser {
    pub fn parse<S: TdrSource + ?Sized>(source: &S) -> Result<TdrGeometry, ParseError> {
        let dimension = Self::to_index(
            source.require_int_attr(GEOMETRY_PATH, "dimension")?,
            "geometry dimension",
        )?;
        if !(1..=3).contains(&dimension) {
            return Err(ParseError::Source(format!("unsupported geometry dimension {}", dimension)));
        }

        let vertices = Self::parse_vertices(source)?;

        let num_regions = Self::to_index(
            source.require_int_attr(GEOMETRY_PATH, "number of regions")?,
            "number of regions",
        )?;
        let regions = (0..num_regions)
            .map(|index| Self::parse_region(source, index, dimension))
            .collect::<Result<Vec<Region>, ParseError>>()?;

        Ok(TdrGeometry { dimension, vertices, regions })
    }

    /// Read the compound vertex table, 2-D tables get z = 0
    pub fn parse_vertices<S: TdrSource + ?Sized>(source: &S) -> Result<Vertices, ParseError> {
        let (components, values) = source.vertex_table(&format!("{}/vertex", GEOMETRY_PATH))?;
        if components != 2 && components != 3 {
            return Err(ParseError::UnsupportedVertexDimension(components));
        }
        if values.len() % components != 0 {
            return Err(ParseError::Source(format!(
                "vertex table holds {} values, not a multiple of {}",
                values.len(),
                components
            )));
        }

        let points = values
            .chunks_exact(components)
            .map(|c| [c[0], c[1], if components == 3 { c[2] } else { 0.0 }])
            .collect();

        Ok(Vertices { dimension: components, points })
    }

    fn parse_region<S: TdrSource + ?Sized>(
        source: &S,
        index: usize,
        dimension: usize,
    ) -> Result<Region, ParseError> {
        let path = region_path(index);
        let name = source.require_str_attr(&path, "name")?;

        let parts = source.require_int_attr(&path, "number of parts")?;
        if parts != 1 {
            return Err(ParseError::UnexpectedPartCount { region: name, parts });
        }

        let code = source.require_int_attr(&path, "type")?;
        let kind = match code {
            0 => RegionKind::Bulk {
                material: source.require_str_attr(&path, "material")?,
            },
            1 => RegionKind::Contact {
                material: CONTACT_MATERIAL.to_string(),
                bulk: Self::bulk_reference(source, &path, 0)?,
            },
            2 => RegionKind::Interface {
                bulk0: Self::bulk_reference(source, &path, 0)?,
                bulk1: Self::bulk_reference(source, &path, 1)?,
            },
            _ => return Err(ParseError::UnsupportedRegionType { region: name, code }),
        };

        let block = source.int_array(&format!("{}/elements_0", path))?;
        let elements = ElementBlockDecoder::decode(&block)?;

        // Bulk regions fill the device, boundaries are one dimension lower
        let expected = match kind {
            RegionKind::Bulk { .. } => dimension,
            _ => dimension - 1,
        };
        if elements.dimension() != expected {
            return Err(ParseError::UnexpectedElementShape {
                region: name,
                expected,
                found: elements.dimension(),
            });
        }

        debug!(
            "region {} '{}' ({}): {} {} over {} nodes",
            index,
            name,
            kind.type_name(),
            elements.len(),
            elements.shape.name(),
            elements.node_count()
        );

        Ok(Region::new(index, name, kind, elements))
    }

    fn bulk_reference<S: TdrSource + ?Sized>(source: &S, path: &str, which: usize) -> Result<usize, ParseError> {
        let value = source.require_int_attr(path, &format!("bulk {}", which))?;
        Self::to_index(value, "bulk reference")
    }

    fn to_index(value: i64, what: &str) -> Result<usize, ParseError> {
        usize::try_from(value).map_err(|_| ParseError::Source(format!("negative {}: {}", what, value)))
    }
}
