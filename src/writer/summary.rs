use std::fmt;

use crate::unify::UnifiedMesh;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSummary {
    pub name: String,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSummary {
    pub name: String,
    pub region: String,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSummary {
    pub name: String,
    pub region0: String,
    pub region1: String,
}

/// Human readable overview of a converted device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub name: String,
    pub dimension: usize,
    pub regions: Vec<RegionSummary>,
    pub contacts: Vec<ContactSummary>,
    pub interfaces: Vec<InterfaceSummary>,
}

impl DeviceSummary {
    pub fn from_mesh(name: &str, mesh: &UnifiedMesh) -> Self {
        let regions = mesh
            .bulk_blocks()
            .map(|b| RegionSummary {
                name: b.name.clone(),
                material: b.material().unwrap_or_default().to_string(),
            })
            .collect();

        let contacts = mesh
            .contact_blocks()
            .map(|b| ContactSummary {
                name: b.name.clone(),
                region: b.bulk_names.first().cloned().unwrap_or_default(),
                material: b.material().unwrap_or_default().to_string(),
            })
            .collect();

        let interfaces = mesh
            .interface_blocks()
            .map(|b| InterfaceSummary {
                name: b.name.clone(),
                region0: b.bulk_names.first().cloned().unwrap_or_default(),
                region1: b.bulk_names.get(1).cloned().unwrap_or_default(),
            })
            .collect();

        DeviceSummary {
            name: name.to_string(),
            dimension: mesh.dimension,
            regions,
            contacts,
            interfaces,
        }
    }
}

impl fmt::Display for DeviceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device: {} ({}-D)", self.name, self.dimension)?;
        writeln!(f, "Regions:")?;
        for r in &self.regions {
            writeln!(f, "  {:<24} material {}", r.name, r.material)?;
        }
        writeln!(f, "Contacts:")?;
        for c in &self.contacts {
            writeln!(f, "  {:<24} region {} material {}", c.name, c.region, c.material)?;
        }
        writeln!(f, "Interfaces:")?;
        for i in &self.interfaces {
            writeln!(f, "  {:<24} regions {} {}", i.name, i.region0, i.region1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs_and_impls::*;
    use crate::unify::MeshUnifier;

    #[test]
    fn test_summary_lists_every_kind() {
        let vertices = Vertices {
            dimension: 2,
            points: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        };
        let regions = vec![
            Region::new(
                0,
                "silicon",
                RegionKind::Bulk { material: "Silicon".into() },
                ElementTable::new(ElementShape::Triangle, vec![vec![0, 1, 2]]),
            ),
            Region::new(
                1,
                "anode",
                RegionKind::Contact { material: CONTACT_MATERIAL.into(), bulk: 0 },
                ElementTable::new(ElementShape::Edge, vec![vec![0, 1]]),
            ),
        ];
        let mesh = MeshUnifier::unify(2, &vertices, &regions, 1.0).unwrap();
        let summary = DeviceSummary::from_mesh("diode", &mesh);

        assert_eq!(summary.regions[0].material, "Silicon");
        assert_eq!(
            summary.contacts,
            vec![ContactSummary { name: "anode".into(), region: "silicon".into(), material: "metal".into() }]
        );
        assert!(summary.interfaces.is_empty());

        let text = summary.to_string();
        assert!(text.starts_with("Device: diode (2-D)\n"));
        assert!(text.contains("anode"));
    }
}
