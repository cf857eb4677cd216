//! Multi-variable labeled datasets.

use std::collections::{BTreeMap, BTreeSet};

use crate::array::{Attributes, NumericArray};
use crate::error::{GridError, GridResult};

/// Which namespace of a dataset a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Measured quantity (temperature, velocity, ...).
    Data,
    /// Axis/index variable labeling a dimension.
    Coordinate,
}

/// Variable names of a dataset, split by namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableNames {
    pub data: BTreeSet<String>,
    pub coordinates: BTreeSet<String>,
}

impl VariableNames {
    /// Build from explicit name lists.
    pub fn new<D, C, S>(data: D, coordinates: C) -> Self
    where
        D: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            data: data.into_iter().map(Into::into).collect(),
            coordinates: coordinates.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether `name` is a data or coordinate variable.
    pub fn contains(&self, name: &str) -> bool {
        self.data.contains(name) || self.coordinates.contains(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<VariableKind> {
        if self.data.contains(name) {
            Some(VariableKind::Data)
        } else if self.coordinates.contains(name) {
            Some(VariableKind::Coordinate)
        } else {
            None
        }
    }
}

/// A named collection of data variables and the coordinates labeling them.
///
/// Data and coordinate names share one namespace: a name can appear in at
/// most one of the two maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    data_vars: BTreeMap<String, NumericArray>,
    coords: BTreeMap<String, NumericArray>,
    /// Global attributes.
    pub attributes: Attributes,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data variable.
    pub fn add_data_var(&mut self, array: NumericArray) -> GridResult<()> {
        self.ensure_unused(array.name())?;
        self.data_vars.insert(array.name().to_string(), array);
        Ok(())
    }

    /// Add a coordinate variable.
    pub fn add_coord(&mut self, array: NumericArray) -> GridResult<()> {
        self.ensure_unused(array.name())?;
        self.coords.insert(array.name().to_string(), array);
        Ok(())
    }

    /// Builder-style [`Dataset::add_data_var`].
    pub fn with_data_var(mut self, array: NumericArray) -> GridResult<Self> {
        self.add_data_var(array)?;
        Ok(self)
    }

    /// Builder-style [`Dataset::add_coord`].
    pub fn with_coord(mut self, array: NumericArray) -> GridResult<Self> {
        self.add_coord(array)?;
        Ok(self)
    }

    fn ensure_unused(&self, name: &str) -> GridResult<()> {
        if self.contains(name) {
            return Err(GridError::DuplicateVariable(name.to_string()));
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.data_vars.contains_key(name) || self.coords.contains_key(name)
    }

    pub fn data_var(&self, name: &str) -> Option<&NumericArray> {
        self.data_vars.get(name)
    }

    pub fn coord(&self, name: &str) -> Option<&NumericArray> {
        self.coords.get(name)
    }

    /// Look up a variable in either namespace.
    pub fn variable(&self, name: &str) -> Option<&NumericArray> {
        self.data_vars.get(name).or_else(|| self.coords.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<VariableKind> {
        if self.data_vars.contains_key(name) {
            Some(VariableKind::Data)
        } else if self.coords.contains_key(name) {
            Some(VariableKind::Coordinate)
        } else {
            None
        }
    }

    pub fn data_vars(&self) -> impl Iterator<Item = &NumericArray> {
        self.data_vars.values()
    }

    pub fn coords(&self) -> impl Iterator<Item = &NumericArray> {
        self.coords.values()
    }

    /// Iterate over all variables, coordinates first.
    pub fn variables(&self) -> impl Iterator<Item = &NumericArray> {
        self.coords.values().chain(self.data_vars.values())
    }

    pub fn data_var_names(&self) -> impl Iterator<Item = &str> {
        self.data_vars.keys().map(String::as_str)
    }

    pub fn coord_names(&self) -> impl Iterator<Item = &str> {
        self.coords.keys().map(String::as_str)
    }

    /// Snapshot of the dataset's variable names.
    pub fn variable_names(&self) -> VariableNames {
        VariableNames::new(self.data_var_names(), self.coord_names())
    }

    /// Replace an existing variable, keeping its namespace.
    ///
    /// Returns the previous array.
    pub fn replace_variable(&mut self, array: NumericArray) -> GridResult<NumericArray> {
        let slot = match self.kind_of(array.name()) {
            Some(VariableKind::Data) => self.data_vars.get_mut(array.name()),
            Some(VariableKind::Coordinate) => self.coords.get_mut(array.name()),
            None => None,
        };

        match slot {
            Some(existing) => Ok(std::mem::replace(existing, array)),
            None => Err(GridError::UnknownVariable(array.name().to_string())),
        }
    }

    /// Total number of variables (data and coordinates).
    pub fn len(&self) -> usize {
        self.data_vars.len() + self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uncompressed size of every buffer in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.variables().map(|v| v.data().size_in_bytes()).sum()
    }
}
