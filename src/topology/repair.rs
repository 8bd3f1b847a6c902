use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::error::TopologyError;
use crate::structs_and_impls::*;

/// Where a contact stands against its recorded bulk region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactState {
    Verified,                       // Recorded bulk region holds every contact face
    Reattach(usize),                // Another bulk region (first in index order) holds them all
    Ambiguous,                      // No single bulk region does, the contact has to be split
}

/// One change made to the region list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    ReferenceCorrected { contact: String, from: usize, to: usize },
    ContactSplit { contact: String, parts: Vec<String> },
    InterfaceSynthesized { interface: String, bulk0: usize, bulk1: usize, faces: usize },
    InterfaceShrunk { interface: String, from: usize, to: usize },
}

/// Audit trail of a repair run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub actions: Vec<RepairAction>,
}

impl RepairReport {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Makes contacts and interfaces agree with the surfaces of the bulk regions.
///
/// Regions are never removed. A split contact takes over the slot of the
/// original and any further parts, like synthesized interfaces, are appended
/// with the next free index. Surfaces must have been extracted beforehand.
pub struct TopologyRepairer;

impl TopologyRepairer {
    pub fn repair(
        regions: &mut Vec<Region>,
        drop_interfaces_at_contact: bool,
    ) -> Result<RepairReport, TopologyError> {
        let mut report = RepairReport::default();

        Self::update_boundary_regions(regions, &mut report)?;

        if !regions.iter().any(Region::is_interface) {
            info!("no interfaces present, searching");
            Self::find_interfaces(regions, &mut report);
        }

        if drop_interfaces_at_contact {
            Self::remove_interfaces_at_contact(regions, &mut report)?;
        }

        Ok(report)
    }

    /// True when every face of the contact is also a face of the region
    pub fn is_contact_in_region(region: &Region, contact: &Region) -> bool {
        region.surface.intersection(&contact.surface).count() == contact.surface.len()
    }

    pub fn contact_state(regions: &[Region], contact: &Region, bulk: usize) -> ContactState {
        let recorded = regions
            .get(bulk)
            .filter(|r| r.is_bulk())
            .map_or(false, |r| Self::is_contact_in_region(r, contact));
        if recorded {
            return ContactState::Verified;
        }

        regions
            .iter()
            .filter(|r| r.is_bulk())
            .find(|r| Self::is_contact_in_region(r, contact))
            .map_or(ContactState::Ambiguous, |r| ContactState::Reattach(r.index))
    }

    /// Verify every contact and interface present at call time
    pub fn update_boundary_regions(
        regions: &mut Vec<Region>,
        report: &mut RepairReport,
    ) -> Result<(), TopologyError> {
        let count = regions.len();
        let mut splits: Vec<(usize, Vec<Region>)> = Vec::new();

        for index in 0..count {
            let kind = regions[index].kind.clone();
            match kind {
                RegionKind::Contact { bulk, .. } => {
                    let state = Self::contact_state(regions, &regions[index], bulk);
                    if state == ContactState::Verified {
                        continue;
                    }

                    let contact = &regions[index];
                    warn!(
                        "bulk 0 reference {} for contact {} is not correct searching for proper connection",
                        Self::region_label(regions, bulk),
                        contact.name
                    );

                    match state {
                        ContactState::Reattach(to) => {
                            info!(
                                "bulk 0 reference for contact {} has been updated to {}",
                                contact.name, regions[to].name
                            );
                            report.actions.push(RepairAction::ReferenceCorrected {
                                contact: contact.name.clone(),
                                from: bulk,
                                to,
                            });
                            if let RegionKind::Contact { bulk, .. } = &mut regions[index].kind {
                                *bulk = to;
                            }
                        }
                        _ => {
                            let parts = Self::split_contact(regions, contact);
                            if parts.is_empty() {
                                return Err(TopologyError::OrphanContact {
                                    contact: contact.name.clone(),
                                });
                            }
                            report.actions.push(RepairAction::ContactSplit {
                                contact: contact.name.clone(),
                                parts: parts.iter().map(|p| p.name.clone()).collect(),
                            });
                            splits.push((index, parts));
                        }
                    }
                }
                RegionKind::Interface { bulk0, bulk1 } => {
                    // Interface references are trusted, only their existence is checked
                    for reference in [bulk0, bulk1] {
                        if !regions.get(reference).map_or(false, Region::is_bulk) {
                            return Err(TopologyError::DanglingReference {
                                region: regions[index].name.clone(),
                                reference,
                            });
                        }
                    }
                }
                RegionKind::Bulk { .. } => {}
            }
        }

        for (index, parts) in splits {
            let mut parts = parts.into_iter();
            if let Some(mut first) = parts.next() {
                first.index = index;
                regions[index] = first;
            }
            for mut part in parts {
                part.index = regions.len();
                regions.push(part);
            }
        }

        Ok(())
    }

    /// One new contact per bulk region sharing faces with `contact`, in region order.
    /// Returned regions carry no index yet.
    pub fn split_contact(regions: &[Region], contact: &Region) -> Vec<Region> {
        let mut parts = Vec::new();

        for region in regions.iter().filter(|r| r.is_bulk()) {
            let intersection: SurfaceSet = region
                .surface
                .intersection(&contact.surface)
                .cloned()
                .collect();
            if intersection.is_empty() {
                continue;
            }

            let name = format!("{}_{}", contact.name, region.name);
            info!(
                "{} and {} intersect with {} elements!",
                region.name,
                contact.name,
                intersection.len()
            );
            info!("Creating {}", name);

            let elements = ElementTable::from_faces(contact.elements.shape, &intersection);
            let mut part = Region::new(
                usize::MAX,
                name,
                RegionKind::Contact {
                    material: CONTACT_MATERIAL.to_string(),
                    bulk: region.index,
                },
                elements,
            );
            part.surface = intersection;
            parts.push(part);
        }

        parts
    }

    /// Create an interface for every pair of bulk regions that share faces
    pub fn find_interfaces(regions: &mut Vec<Region>, report: &mut RepairReport) {
        let bulk: Vec<&Region> = regions.iter().filter(|r| r.is_bulk()).collect();
        let mut interfaces = Vec::new();

        for (i, r0) in bulk.iter().enumerate() {
            for r1 in &bulk[i + 1..] {
                let shared: SurfaceSet = r0.surface.intersection(&r1.surface).cloned().collect();
                if shared.is_empty() {
                    continue;
                }
                let shape = match r0.elements.shape.facet_shape() {
                    Some(shape) => shape,
                    None => continue,
                };
                info!("intersection of {} and {}", r0.name, r1.name);

                let elements = ElementTable::from_faces(shape, &shared);
                let mut interface = Region::new(
                    usize::MAX,
                    format!("{}_{}", r0.name, r1.name),
                    RegionKind::Interface { bulk0: r0.index, bulk1: r1.index },
                    elements,
                );
                interface.surface = shared;
                interfaces.push(interface);
            }
        }

        for mut interface in interfaces {
            interface.index = regions.len();
            if let RegionKind::Interface { bulk0, bulk1 } = interface.kind {
                report.actions.push(RepairAction::InterfaceSynthesized {
                    interface: interface.name.clone(),
                    bulk0,
                    bulk1,
                    faces: interface.surface.len(),
                });
            }
            regions.push(interface);
        }
    }

    /// Drop interface faces touching any contact node
    pub fn remove_interfaces_at_contact(
        regions: &mut [Region],
        report: &mut RepairReport,
    ) -> Result<(), TopologyError> {
        let contact_nodes: BTreeSet<usize> = regions
            .iter()
            .filter(|r| r.is_contact())
            .flat_map(|r| r.surface.iter())
            .flat_map(|face| face.nodes().iter().copied())
            .collect();

        for interface in regions.iter_mut().filter(|r| r.is_interface()) {
            let kept: SurfaceSet = interface
                .surface
                .iter()
                .filter(|face| !face.touches(&contact_nodes))
                .cloned()
                .collect();

            if kept.is_empty() {
                return Err(TopologyError::VanishedInterface {
                    interface: interface.name.clone(),
                });
            }
            if kept.len() != interface.surface.len() {
                info!(
                    "INTERFACE {} from {} to {} elements",
                    interface.name,
                    interface.surface.len(),
                    kept.len()
                );
                report.actions.push(RepairAction::InterfaceShrunk {
                    interface: interface.name.clone(),
                    from: interface.surface.len(),
                    to: kept.len(),
                });
                interface.replace_faces(kept);
            }
        }

        Ok(())
    }

    fn region_label(regions: &[Region], index: usize) -> String {
        regions
            .get(index)
            .map_or_else(|| format!("#{}", index), |r| r.name.clone())
    }
}
