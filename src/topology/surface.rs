use std::collections::BTreeSet;

use crate::error::TopologyError;
use crate::structs_and_impls::*;

/// Computes the boundary face set of every region.
///
/// Bulk regions keep the facets used by exactly one element: the first
/// occurrence of a facet enters the surface, the second moves it to a
/// discard set for good. On a non-manifold mesh a facet shared by three
/// elements is therefore dropped as well.
pub struct SurfaceExtractor;

impl SurfaceExtractor {
    pub fn extract_all(regions: &mut [Region]) -> Result<(), TopologyError> {
        for region in regions.iter_mut() {
            Self::extract(region)?;
        }
        Ok(())
    }

    pub fn extract(region: &mut Region) -> Result<(), TopologyError> {
        region.surface = if region.is_bulk() {
            if region.elements.shape.facet_shape().is_none() {
                return Err(TopologyError::SurfaceOfLowDimension {
                    region: region.name.clone(),
                    dim: region.elements.dimension(),
                });
            }
            Self::volume_surface(&region.elements)
        } else {
            Self::boundary_faces(&region.elements)
        };
        Ok(())
    }

    /// Facets of the elements that are not shared with another element
    pub fn volume_surface(table: &ElementTable) -> SurfaceSet {
        let mut surface = SurfaceSet::new();
        let mut duplicates = BTreeSet::new();

        for element in &table.elements {
            for facet in Self::facets(element) {
                if duplicates.contains(&facet) {
                    continue;
                }
                if !surface.remove(&facet) {
                    surface.insert(facet);
                } else {
                    duplicates.insert(facet);
                }
            }
        }
        surface
    }

    /// Contacts and interfaces already are surfaces: one face per element
    pub fn boundary_faces(table: &ElementTable) -> SurfaceSet {
        table.elements.iter().map(|e| Face::from(e.as_slice())).collect()
    }

    /// Every facet of a simplex, obtained by leaving out one node at a time
    pub fn facets(element: &[usize]) -> Vec<Face> {
        let mut nodes = element.to_vec();
        nodes.sort_unstable();

        (0..nodes.len())
            .rev()
            .map(|skip| {
                let facet = nodes
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != skip)
                    .map(|(_, &n)| n)
                    .collect();
                Face::new(facet)
            })
            .collect()
    }
}
