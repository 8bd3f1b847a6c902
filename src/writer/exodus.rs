use std::path::Path;

use tracing::warn;

use crate::error::WriterError;
use crate::unify::{NodeField, UnifiedMesh};

/// Width of every name stored in the file
pub const LEN_NAME: usize = 256;
const AXIS_NAMES: [&str; 3] = ["x", "y", "z"];

/// One element block of the Exodus file, built from a bulk region
#[derive(Debug, Clone, PartialEq)]
pub struct ExodusBlock {
    pub name: String,
    pub elem_type: &'static str,
    pub nodes_per_element: usize,
    pub connectivity: Vec<i32>,         // 1-based node ids, element major
}

impl ExodusBlock {
    pub fn num_elements(&self) -> usize {
        self.connectivity.len() / self.nodes_per_element
    }
}

/// Everything written to the Exodus file, independent of the NetCDF library
#[derive(Debug, Clone, PartialEq)]
pub struct ExodusModel {
    pub num_dim: usize,
    pub num_nodes: usize,
    pub coordinates: Vec<Vec<f64>>,     // One array per axis, only the first `num_dim` axes
    pub coor_names: Vec<&'static str>,
    pub blocks: Vec<ExodusBlock>,
    pub node_variables: Vec<NodeField>,
}

impl ExodusModel {
    pub fn build(mesh: &UnifiedMesh, node_variables: Vec<NodeField>) -> Result<Self, WriterError> {
        let num_dim = mesh.dimension;
        if !(2..=3).contains(&num_dim) {
            return Err(WriterError::DimensionOutOfRange {
                format: "Exodus",
                min: 2,
                max: 3,
                found: num_dim,
            });
        }

        let coordinates = (0..num_dim)
            .map(|axis| mesh.coordinates.iter().map(|p| p[axis]).collect())
            .collect();

        let mut blocks = Vec::new();
        for block in mesh.bulk_blocks() {
            let nodes_per_element = block.shape.nodes_per_element();
            let elem_type = match nodes_per_element {
                3 => "TRI3",
                4 => "TETRA",
                nodes => return Err(WriterError::UnsupportedElement { format: "Exodus", nodes }),
            };
            let connectivity = mesh
                .block_elements(block)
                .iter()
                .flat_map(|e| e.nodes.iter().map(|&n| n as i32 + 1))
                .collect();
            blocks.push(ExodusBlock {
                name: block.name.clone(),
                elem_type,
                nodes_per_element,
                connectivity,
            });
        }

        Ok(ExodusModel {
            num_dim,
            num_nodes: mesh.num_nodes(),
            coordinates,
            coor_names: AXIS_NAMES[..num_dim].to_vec(),
            blocks,
            node_variables,
        })
    }

    pub fn num_elements(&self) -> usize {
        self.blocks.iter().map(ExodusBlock::num_elements).sum()
    }

    /// Names as fixed-width byte rows. Every row ends in at least one NUL,
    /// so longer names are cut at `LEN_NAME - 1` bytes.
    pub fn name_rows<'a>(names: impl Iterator<Item = &'a str>) -> Vec<u8> {
        let mut rows = Vec::new();
        for name in names {
            let mut row = name.as_bytes().to_vec();
            if row.len() >= LEN_NAME {
                warn!(
                    "name '{}' is {} bytes long, truncated to {} in the exodus file",
                    name,
                    row.len(),
                    LEN_NAME - 1
                );
                row.truncate(LEN_NAME - 1);
            }
            row.resize(LEN_NAME, 0);
            rows.extend_from_slice(&row);
        }
        rows
    }
}

/// NetCDF `NC_CHAR` element, `u8` would map to `NC_UBYTE`
#[cfg(feature = "exodus")]
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NcChar(u8);

#[cfg(feature = "exodus")]
unsafe impl netcdf::NcTypeDescriptor for NcChar {
    fn type_descriptor() -> netcdf::types::NcVariableType {
        netcdf::types::NcVariableType::Char
    }
}

/// Writes `names` as a `[dim, len_name]` character variable
#[cfg(feature = "exodus")]
fn put_names<'a>(
    file: &mut netcdf::FileMut,
    variable: &str,
    dim: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), WriterError> {
    let rows: Vec<NcChar> = ExodusModel::name_rows(names).into_iter().map(NcChar).collect();
    let mut var = file.add_variable::<NcChar>(variable, &[dim, "len_name"])?;
    var.put_values(&rows, ..)?;
    Ok(())
}

/// Exodus II writer for the bulk regions and merged node fields
pub struct ExodusWriter;

impl ExodusWriter {
    pub fn write<P: AsRef<Path>>(model: &ExodusModel, path: P) -> Result<(), WriterError> {
        Self::emit(model, path.as_ref())
    }

    #[cfg(feature = "exodus")]
    fn emit(model: &ExodusModel, path: &Path) -> Result<(), WriterError> {
        use tracing::info;

        const LEN_STRING: usize = 33;

        let mut file = netcdf::create(path)?;

        file.add_dimension("len_name", LEN_NAME)?;
        file.add_unlimited_dimension("time_step")?;
        file.add_dimension("num_dim", model.num_dim)?;
        file.add_dimension("num_nodes", model.num_nodes)?;
        file.add_dimension("num_elem", model.num_elements())?;
        file.add_dimension("num_el_blk", model.blocks.len())?;
        for (i, block) in model.blocks.iter().enumerate() {
            file.add_dimension(&format!("num_el_in_blk{}", i + 1), block.num_elements())?;
            file.add_dimension(&format!("num_nod_per_el{}", i + 1), block.nodes_per_element)?;
        }
        file.add_dimension("four", 4)?;
        file.add_dimension("len_string", LEN_STRING)?;

        {
            let mut var = file.add_variable::<f64>("time_whole", &["time_step"])?;
            var.put_value(0.0, [0])?;
        }
        {
            let mut var = file.add_variable::<i32>("eb_status", &["num_el_blk"])?;
            var.put_values(&vec![1; model.blocks.len()], ..)?;
        }
        {
            let ids: Vec<i32> = (1..=model.blocks.len() as i32).collect();
            let mut var = file.add_variable::<i32>("eb_prop1", &["num_el_blk"])?;
            var.put_attribute("name", "ID")?;
            var.put_values(&ids, ..)?;
        }

        for (axis, values) in model.coordinates.iter().enumerate() {
            let name = format!("coord{}", AXIS_NAMES[axis]);
            let mut var = file.add_variable::<f64>(&name, &["num_nodes"])?;
            var.put_values(values, ..)?;
        }

        put_names(&mut file, "eb_names", "num_el_blk", model.blocks.iter().map(|b| b.name.as_str()))?;
        put_names(&mut file, "coor_names", "num_dim", model.coor_names.iter().copied())?;

        for (i, block) in model.blocks.iter().enumerate() {
            let name = format!("connect{}", i + 1);
            let dims = [
                format!("num_el_in_blk{}", i + 1),
                format!("num_nod_per_el{}", i + 1),
            ];
            let mut var = file.add_variable::<i32>(&name, &[dims[0].as_str(), dims[1].as_str()])?;
            var.put_attribute("elem_type", block.elem_type)?;
            var.put_values(&block.connectivity, ..)?;
        }

        if model.node_variables.is_empty() {
            warn!("no datasets to save into exodus");
        } else {
            file.add_dimension("num_nod_var", model.node_variables.len())?;
            put_names(
                &mut file,
                "name_nod_var",
                "num_nod_var",
                model.node_variables.iter().map(|f| f.name.as_str()),
            )?;
            for (i, field) in model.node_variables.iter().enumerate() {
                let name = format!("vals_nod_var{}", i + 1);
                let mut var = file.add_variable::<f64>(&name, &["time_step", "num_nodes"])?;
                var.put_values(&field.values, (0, ..))?;
            }
        }

        info!("Wrote Exodus mesh {}", path.display());
        Ok(())
    }

    #[cfg(not(feature = "exodus"))]
    fn emit(_model: &ExodusModel, _path: &Path) -> Result<(), WriterError> {
        Err(WriterError::FeatureDisabled("Exodus"))
    }
}
