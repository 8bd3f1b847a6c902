//! Key/array access to a TDR container.
//!
//! The decoder only ever asks for named attributes, flat arrays and the
//! members of a group, addressed by `/`-separated paths such as
//! `collection/geometry_0/region_3`. [`MemorySource`] keeps all of that in
//! ordered maps; `Hdf5Source` (feature `hdf5`) reads a real file.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ParseError;

/// Group holding the device geometry
pub const GEOMETRY_PATH: &str = "collection/geometry_0";
/// Group holding the stored node fields
pub const STATE_PATH: &str = "collection/geometry_0/state_0";

pub fn region_path(index: usize) -> String {
    format!("{}/region_{}", GEOMETRY_PATH, index)
}

pub trait TdrSource {
    fn int_attr(&self, path: &str, name: &str) -> Result<Option<i64>, ParseError>;

    fn str_attr(&self, path: &str, name: &str) -> Result<Option<String>, ParseError>;

    fn int_array(&self, path: &str) -> Result<Vec<i64>, ParseError>;

    fn float_array(&self, path: &str) -> Result<Vec<f64>, ParseError>;

    /// Compound vertex table as (number of components, flat row-major values)
    fn vertex_table(&self, path: &str) -> Result<(usize, Vec<f64>), ParseError>;

    /// Names of the direct children of a group, in storage order
    fn members(&self, path: &str) -> Result<Vec<String>, ParseError>;

    fn require_int_attr(&self, path: &str, name: &str) -> Result<i64, ParseError> {
        self.int_attr(path, name)?
            .ok_or_else(|| missing_attr(path, name))
    }

    fn require_str_attr(&self, path: &str, name: &str) -> Result<String, ParseError> {
        self.str_attr(path, name)?
            .ok_or_else(|| missing_attr(path, name))
    }
}

fn missing_attr(path: &str, name: &str) -> ParseError {
    ParseError::Source(format!("attribute '{}' missing on '{}'", name, path))
}

fn missing_dataset(path: &str) -> ParseError {
    ParseError::Source(format!("dataset '{}' not found", path))
}

/// In-memory TDR container
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    int_attrs: BTreeMap<(String, String), i64>,
    str_attrs: BTreeMap<(String, String), String>,
    int_arrays: BTreeMap<String, Vec<i64>>,
    float_arrays: BTreeMap<String, Vec<f64>>,
    vertex_tables: BTreeMap<String, (usize, Vec<f64>)>,
}

impl MemorySource {
    /// Empty device of the given dimension; `vertices` holds `components` values per vertex
    pub fn device(dimension: i64, components: usize, vertices: Vec<f64>) -> Self {
        let mut source = MemorySource::default();
        source
            .set_int_attr(GEOMETRY_PATH, "dimension", dimension)
            .set_int_attr(GEOMETRY_PATH, "number of regions", 0)
            .set_vertex_table(&format!("{}/vertex", GEOMETRY_PATH), components, vertices);
        source
    }

    pub fn set_int_attr(&mut self, path: &str, name: &str, value: i64) -> &mut Self {
        self.int_attrs.insert((path.to_string(), name.to_string()), value);
        self
    }

    pub fn set_str_attr(&mut self, path: &str, name: &str, value: &str) -> &mut Self {
        self.str_attrs.insert((path.to_string(), name.to_string()), value.to_string());
        self
    }

    pub fn set_int_array(&mut self, path: &str, values: Vec<i64>) -> &mut Self {
        self.int_arrays.insert(path.to_string(), values);
        self
    }

    pub fn set_float_array(&mut self, path: &str, values: Vec<f64>) -> &mut Self {
        self.float_arrays.insert(path.to_string(), values);
        self
    }

    pub fn set_vertex_table(&mut self, path: &str, components: usize, values: Vec<f64>) -> &mut Self {
        self.vertex_tables.insert(path.to_string(), (components, values));
        self
    }

    /// Append a region with a single element part and bump `number of regions`.
    /// `code` is the TDR region type; bulk references are only written when given.
    pub fn add_region(
        &mut self,
        name: &str,
        code: i64,
        material: Option<&str>,
        bulk: &[i64],
        elements: Vec<i64>,
    ) -> usize {
        let index = self
            .int_attrs
            .get(&(GEOMETRY_PATH.to_string(), "number of regions".to_string()))
            .copied()
            .unwrap_or(0);
        let path = region_path(index as usize);

        self.set_str_attr(&path, "name", name)
            .set_int_attr(&path, "type", code)
            .set_int_attr(&path, "number of parts", 1)
            .set_int_array(&format!("{}/elements_0", path), elements);
        if let Some(material) = material {
            self.set_str_attr(&path, "material", material);
        }
        for (i, b) in bulk.iter().enumerate() {
            self.set_int_attr(&path, &format!("bulk {}", i), *b);
        }
        self.set_int_attr(GEOMETRY_PATH, "number of regions", index + 1);
        index as usize
    }

    /// Store a node field under `state_0/dataset_<n>`
    pub fn add_dataset(
        &mut self,
        name: &str,
        region: i64,
        structure_type: i64,
        location_type: i64,
        rows: Option<i64>,
        values: Vec<f64>,
    ) -> String {
        let count = self
            .members(STATE_PATH)
            .map(|m| m.iter().filter(|n| n.starts_with("dataset")).count())
            .unwrap_or(0);
        let path = format!("{}/dataset_{}", STATE_PATH, count);

        self.set_str_attr(&path, "name", name)
            .set_int_attr(&path, "region", region)
            .set_int_attr(&path, "structure type", structure_type)
            .set_int_attr(&path, "location type", location_type)
            .set_int_attr(&path, "number of values", values.len() as i64);
        if let Some(rows) = rows {
            self.set_int_attr(&path, "number of rows", rows);
        }
        self.set_float_array(&format!("{}/values", path), values);
        path
    }

    fn all_paths(&self) -> impl Iterator<Item = &str> {
        self.int_attrs
            .keys()
            .map(|(p, _)| p.as_str())
            .chain(self.str_attrs.keys().map(|(p, _)| p.as_str()))
            .chain(self.int_arrays.keys().map(String::as_str))
            .chain(self.float_arrays.keys().map(String::as_str))
            .chain(self.vertex_tables.keys().map(String::as_str))
    }
}

impl TdrSource for MemorySource {
    fn int_attr(&self, path: &str, name: &str) -> Result<Option<i64>, ParseError> {
        Ok(self.int_attrs.get(&(path.to_string(), name.to_string())).copied())
    }

    fn str_attr(&self, path: &str, name: &str) -> Result<Option<String>, ParseError> {
        Ok(self.str_attrs.get(&(path.to_string(), name.to_string())).cloned())
    }

    fn int_array(&self, path: &str) -> Result<Vec<i64>, ParseError> {
        self.int_arrays.get(path).cloned().ok_or_else(|| missing_dataset(path))
    }

    fn float_array(&self, path: &str) -> Result<Vec<f64>, ParseError> {
        self.float_arrays.get(path).cloned().ok_or_else(|| missing_dataset(path))
    }

    fn vertex_table(&self, path: &str) -> Result<(usize, Vec<f64>), ParseError> {
        self.vertex_tables.get(path).cloned().ok_or_else(|| missing_dataset(path))
    }

    fn members(&self, path: &str) -> Result<Vec<String>, ParseError> {
        let prefix = format!("{}/", path);
        let names: BTreeSet<String> = self
            .all_paths()
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[cfg(feature = "hdf5")]
pub use self::hdf5_backend::Hdf5Source;

#[cfg(feature = "hdf5")]
mod hdf5_backend {
    use std::path::Path;

    use hdf5_metno as hdf5;
    use hdf5::types::{FixedAscii, TypeDescriptor, VarLenAscii, VarLenUnicode};
    use hdf5::H5Type;

    use super::TdrSource;
    use crate::error::ParseError;

    #[derive(H5Type, Debug, Clone, Copy, PartialEq)]
    #[repr(C)]
    struct Xy {
        x: f64,
        y: f64,
    }

    #[derive(H5Type, Debug, Clone, Copy, PartialEq)]
    #[repr(C)]
    struct Xyz {
        x: f64,
        y: f64,
        z: f64,
    }

    fn source_error(err: hdf5::Error) -> ParseError {
        ParseError::Source(err.to_string())
    }

    /// TDR file opened through libhdf5
    pub struct Hdf5Source {
        file: hdf5::File,
    }

    impl Hdf5Source {
        pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
            let file = hdf5::File::open(path).map_err(source_error)?;
            Ok(Hdf5Source { file })
        }

        fn attribute(&self, path: &str, name: &str) -> Result<Option<hdf5::Attribute>, ParseError> {
            if let Ok(group) = self.file.group(path) {
                return find_attr(&group, name);
            }
            let dataset = self.file.dataset(path).map_err(source_error)?;
            find_attr(&dataset, name)
        }
    }

    fn find_attr(location: &hdf5::Location, name: &str) -> Result<Option<hdf5::Attribute>, ParseError> {
        let names = location.attr_names().map_err(source_error)?;
        if !names.iter().any(|n| n == name) {
            return Ok(None);
        }
        location.attr(name).map(Some).map_err(source_error)
    }

    impl TdrSource for Hdf5Source {
        fn int_attr(&self, path: &str, name: &str) -> Result<Option<i64>, ParseError> {
            match self.attribute(path, name)? {
                Some(attr) => attr.read_scalar::<i64>().map(Some).map_err(source_error),
                None => Ok(None),
            }
        }

        fn str_attr(&self, path: &str, name: &str) -> Result<Option<String>, ParseError> {
            let attr = match self.attribute(path, name)? {
                Some(attr) => attr,
                None => return Ok(None),
            };
            // TDR writers use fixed-length ASCII, other tools variable-length strings
            if let Ok(s) = attr.read_scalar::<FixedAscii<1024>>() {
                return Ok(Some(s.as_str().to_string()));
            }
            if let Ok(s) = attr.read_scalar::<VarLenAscii>() {
                return Ok(Some(s.as_str().to_string()));
            }
            attr.read_scalar::<VarLenUnicode>()
                .map(|s| Some(s.as_str().to_string()))
                .map_err(source_error)
        }

        fn int_array(&self, path: &str) -> Result<Vec<i64>, ParseError> {
            let dataset = self.file.dataset(path).map_err(source_error)?;
            dataset.read_raw::<i64>().map_err(source_error)
        }

        fn float_array(&self, path: &str) -> Result<Vec<f64>, ParseError> {
            let dataset = self.file.dataset(path).map_err(source_error)?;
            dataset.read_raw::<f64>().map_err(source_error)
        }

        fn vertex_table(&self, path: &str) -> Result<(usize, Vec<f64>), ParseError> {
            let dataset = self.file.dataset(path).map_err(source_error)?;
            let descriptor = dataset
                .dtype()
                .and_then(|t| t.to_descriptor())
                .map_err(source_error)?;
            let components = match descriptor {
                TypeDescriptor::Compound(compound) => compound.fields.len(),
                other => {
                    return Err(ParseError::Source(format!(
                        "vertex table '{}' is not a compound type: {:?}",
                        path, other
                    )))
                }
            };
            let values = match components {
                2 => dataset
                    .read_raw::<Xy>()
                    .map_err(source_error)?
                    .into_iter()
                    .flat_map(|v| [v.x, v.y])
                    .collect(),
                3 => dataset
                    .read_raw::<Xyz>()
                    .map_err(source_error)?
                    .into_iter()
                    .flat_map(|v| [v.x, v.y, v.z])
                    .collect(),
                n => return Err(ParseError::UnsupportedVertexDimension(n)),
            };
            Ok((components, values))
        }

        fn members(&self, path: &str) -> Result<Vec<String>, ParseError> {
            let group = self.file.group(path).map_err(source_error)?;
            group.member_names().map_err(source_error)
        }
    }

}
