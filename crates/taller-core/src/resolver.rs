//! # Entity Resolution
//!
//! Turns entity ids into display names for the rankings.
//!
//! A resolver answers "what is this id called?" and may answer "I don't
//! know". The aggregator maps "I don't know" to [`UNKNOWN_ENTITY_LABEL`];
//! resolution never fails a report.

use std::collections::HashMap;

use crate::types::EntityRef;

/// Label used when an entity id cannot be resolved.
pub const UNKNOWN_ENTITY_LABEL: &str = "Desconocido";

/// Looks up display names by entity id.
pub trait EntityResolver {
    /// Returns the display name for `id`, or `None` when the id is unknown.
    fn resolve(&self, id: &str) -> Option<String>;
}

impl<F> EntityResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, id: &str) -> Option<String> {
        self(id)
    }
}

/// In-memory directory of entities, keyed by id.
///
/// Built from the entity lists the console API returns
/// (`/insumos`, `/productos`, `/proveedores`, `/clientes`).
///
/// ## Example
/// ```rust
/// use taller_core::{EntityDirectory, EntityRef, EntityResolver};
///
/// let directory = EntityDirectory::from_entities(vec![
///     EntityRef::new("1", "Harina"),
///     EntityRef::new("2", "Azúcar"),
/// ]);
/// assert_eq!(directory.resolve("2").as_deref(), Some("Azúcar"));
/// assert_eq!(directory.resolve("9"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityDirectory {
    names: HashMap<String, String>,
}

impl EntityDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from entity references.
    ///
    /// When an id appears twice the first name wins. Blank names are skipped.
    pub fn from_entities(entities: impl IntoIterator<Item = EntityRef>) -> Self {
        let mut directory = Self::new();
        for entity in entities {
            directory.insert_if_absent(entity);
        }
        directory
    }

    /// Adds an entity unless its id is already known or its name is blank.
    ///
    /// Returns true when the entity was added.
    pub fn insert_if_absent(&mut self, entity: EntityRef) -> bool {
        if entity.display_name.trim().is_empty() || self.names.contains_key(&entity.id) {
            return false;
        }
        self.names.insert(entity.id, entity.display_name);
        true
    }

    /// Number of known entities.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl EntityResolver for EntityDirectory {
    fn resolve(&self, id: &str) -> Option<String> {
        self.names.get(id).cloned()
    }
}

impl EntityResolver for HashMap<String, String> {
    fn resolve(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}

impl FromIterator<EntityRef> for EntityDirectory {
    fn from_iter<I: IntoIterator<Item = EntityRef>>(iter: I) -> Self {
        EntityDirectory::from_entities(iter)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
