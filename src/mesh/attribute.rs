//! Cell allocation and named per-cell attributes.
//!
//! A [`CellContainer`] hands out the integer identities of one kind of cell
//! (vertices, faces, edges) and owns every attribute attached to that kind.
//! Attributes are dense arrays over the container's index space and are
//! looked up by name and value type:
//!
//! ```
//! use meshstitch::mesh::CellContainer;
//! use nalgebra::Point3;
//!
//! let mut vertices = CellContainer::new();
//! let v = vertices.new_index();
//!
//! let position = vertices.add_attribute::<Point3<f64>>("position").unwrap();
//! position[v] = Point3::new(1.0, 2.0, 3.0);
//!
//! let position = vertices.get_attribute::<Point3<f64>>("position").unwrap();
//! assert_eq!(position[v].y, 2.0);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use crate::error::{MeshError, Result};

/// A dense array holding one value per cell index.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<T> {
    values: Vec<T>,
}

impl<T: Clone + Default> Attribute<T> {
    fn with_len(len: usize) -> Self {
        Self {
            values: vec![T::default(); len],
        }
    }

    /// Get the value stored for a cell, if the index is in range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Number of slots (the container's index space, including freed cells).
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the attribute has no slot at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.values.iter()
    }
}

impl<T> Index<usize> for Attribute<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.values[index]
    }
}

impl<T> IndexMut<usize> for Attribute<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.values[index]
    }
}

/// Type-erased view of an attribute so the container can grow all of them.
trait AttributeStorage: Any {
    fn resize(&mut self, len: usize);
    fn reset(&mut self, index: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Clone + Default + 'static> AttributeStorage for Attribute<T> {
    fn resize(&mut self, len: usize) {
        self.values.resize(len, T::default());
    }

    fn reset(&mut self, index: usize) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = T::default();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Allocator for the indices of one kind of cell, plus its named attributes.
///
/// Released indices are recycled by later allocations (most recently released
/// first). Attribute values of a released cell are reset to their default.
#[derive(Default)]
pub struct CellContainer {
    active: Vec<bool>,
    free: Vec<usize>,
    attributes: HashMap<String, Box<dyn AttributeStorage>>,
}

impl CellContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a cell index, reusing a released one when available.
    pub fn new_index(&mut self) -> usize {
        if let Some(index) = self.free.pop() {
            self.active[index] = true;
            return index;
        }

        let index = self.active.len();
        self.active.push(true);
        for attribute in self.attributes.values_mut() {
            attribute.resize(index + 1);
        }
        index
    }

    /// Release a cell index so a later allocation may reuse it.
    pub fn release_index(&mut self, index: usize) -> Result<()> {
        if !self.is_active(index) {
            return Err(MeshError::InvalidState(format!(
                "cell {} is not allocated",
                index
            )));
        }
        self.active[index] = false;
        self.free.push(index);
        for attribute in self.attributes.values_mut() {
            attribute.reset(index);
        }
        Ok(())
    }

    /// Whether the index is currently allocated.
    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Number of allocated cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len() - self.free.len()
    }

    /// Whether no cell is allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the index space (allocated plus released slots).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.active.len()
    }

    /// Iterate over allocated indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(i, &active)| active.then_some(i))
    }

    // ==================== Attributes ====================

    /// Add a new attribute. Fails if the name is already taken.
    pub fn add_attribute<T: Clone + Default + 'static>(
        &mut self,
        name: &str,
    ) -> Result<&mut Attribute<T>> {
        if self.attributes.contains_key(name) {
            return Err(MeshError::AttributeExists {
                name: name.to_string(),
            });
        }
        self.attributes.insert(
            name.to_string(),
            Box::new(Attribute::<T>::with_len(self.capacity())),
        );
        self.get_attribute_mut(name)
            .ok_or_else(|| MeshError::AttributeNotFound {
                name: name.to_string(),
            })
    }

    /// Get an attribute by name, or `None` if it is missing or has another type.
    pub fn get_attribute<T: Clone + Default + 'static>(&self, name: &str) -> Option<&Attribute<T>> {
        self.attributes
            .get(name)
            .and_then(|a| a.as_any().downcast_ref::<Attribute<T>>())
    }

    /// Mutable variant of [`CellContainer::get_attribute`].
    pub fn get_attribute_mut<T: Clone + Default + 'static>(
        &mut self,
        name: &str,
    ) -> Option<&mut Attribute<T>> {
        self.attributes
            .get_mut(name)
            .and_then(|a| a.as_any_mut().downcast_mut::<Attribute<T>>())
    }

    /// Get an existing attribute or add it.
    ///
    /// Fails with [`MeshError::AttributeTypeMismatch`] without touching the
    /// container when the name is taken by an attribute of another type.
    pub fn get_or_add_attribute<T: Clone + Default + 'static>(
        &mut self,
        name: &str,
    ) -> Result<&mut Attribute<T>> {
        self.check_attribute_type::<T>(name)?;
        if !self.attributes.contains_key(name) {
            return self.add_attribute(name);
        }
        self.get_attribute_mut(name)
            .ok_or_else(|| MeshError::AttributeTypeMismatch {
                name: name.to_string(),
            })
    }

    /// Check that `name` is either free or holds values of type `T`.
    pub fn check_attribute_type<T: Clone + Default + 'static>(&self, name: &str) -> Result<()> {
        match self.attributes.get(name) {
            Some(a) if !a.as_any().is::<Attribute<T>>() => Err(MeshError::AttributeTypeMismatch {
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Remove an attribute. Returns whether it existed.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        self.attributes.remove(name).is_some()
    }

    /// Whether an attribute with this name exists (of any type).
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Names of all attributes, sorted.
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attributes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CellContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellContainer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("attributes", &self.attribute_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_new_index_grows_attributes() {
        let mut cells = CellContainer::new();
        cells.add_attribute::<f64>("weight").unwrap();

        let a = cells.new_index();
        let b = cells.new_index();
        assert_eq!((a, b), (0, 1));
        assert_eq!(cells.len(), 2);
        assert_eq!(cells.get_attribute::<f64>("weight").unwrap().len(), 2);
    }

    #[test]
    fn test_attribute_added_late_covers_existing_cells() {
        let mut cells = CellContainer::new();
        for _ in 0..4 {
            cells.new_index();
        }
        let attr = cells.add_attribute::<Point3<f64>>("position").unwrap();
        assert_eq!(attr.len(), 4);
        assert_eq!(attr[3], Point3::origin());
    }

    #[test]
    fn test_release_and_reuse() {
        let mut cells = CellContainer::new();
        let a = cells.new_index();
        let b = cells.new_index();
        cells.add_attribute::<u32>("tag").unwrap()[b] = 9;

        cells.release_index(b).unwrap();
        assert!(!cells.is_active(b));
        assert_eq!(cells.len(), 1);
        assert_eq!(cells.indices().collect::<Vec<_>>(), vec![a]);
        assert_eq!(cells.get_attribute::<u32>("tag").unwrap()[b], 0);

        let c = cells.new_index();
        assert_eq!(c, b);
        assert_eq!(cells.capacity(), 2);

        assert!(cells.release_index(7).is_err());
        cells.release_index(a).unwrap();
        assert!(cells.release_index(a).is_err());
    }

    #[test]
    fn test_attribute_name_and_type_checks() {
        let mut cells = CellContainer::new();
        cells.add_attribute::<f64>("x").unwrap();

        assert_eq!(
            cells.add_attribute::<f64>("x").unwrap_err(),
            MeshError::AttributeExists { name: "x".into() }
        );
        assert!(cells.get_attribute::<u32>("x").is_none());
        assert_eq!(
            cells.get_or_add_attribute::<u32>("x").unwrap_err(),
            MeshError::AttributeTypeMismatch { name: "x".into() }
        );
        assert!(cells.get_or_add_attribute::<f64>("x").is_ok());
        assert!(cells.get_or_add_attribute::<u32>("y").is_ok());
        assert_eq!(cells.attribute_names(), vec!["x", "y"]);

        assert!(cells.remove_attribute("x"));
        assert!(!cells.remove_attribute("x"));
        assert!(!cells.has_attribute("x"));
    }
}
