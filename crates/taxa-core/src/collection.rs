//! Insertion-ordered entity collections.

use std::collections::HashMap;

use crate::entity::Entity;

/// An insertion-ordered mapping from string id to [`Entity`].
///
/// Query operations take collections by reference and return new ones, so a
/// collection handed to the engine is never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. An existing id keeps its position and takes the new
    /// value.
    pub fn insert(&mut self, entity: Entity) {
        match self.index.get(&entity.id) {
            Some(&pos) => self.entities[pos] = entity,
            None => {
                self.index.insert(entity.id.clone(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    /// Builder form of [`Collection::insert`].
    pub fn with(mut self, entity: Entity) -> Self {
        self.insert(entity);
        self
    }

    /// Look up an entity by id.
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&pos| &self.entities[pos])
    }

    /// Check if an id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.id.as_str())
    }

    /// First entity matching a predicate.
    pub fn find<P>(&self, mut predicate: P) -> Option<&Entity>
    where
        P: FnMut(&Entity) -> bool,
    {
        self.entities.iter().find(|e| predicate(e))
    }

    /// New collection holding the entities that match a predicate.
    pub fn filter<P>(&self, mut predicate: P) -> Collection
    where
        P: FnMut(&Entity) -> bool,
    {
        self.entities
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    /// New collection with every entity transformed.
    ///
    /// The mapping must keep ids stable.
    pub fn map<F>(&self, f: F) -> Collection
    where
        F: FnMut(&Entity) -> Entity,
    {
        self.entities.iter().map(f).collect()
    }

    /// Entities as a slice, in insertion order.
    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    /// Consume into a vector in insertion order.
    pub fn into_vec(self) -> Vec<Entity> {
        self.entities
    }
}

impl FromIterator<Entity> for Collection {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for entity in iter {
            collection.insert(entity);
        }
        collection
    }
}

impl IntoIterator for Collection {
    type Item = Entity;
    type IntoIter = std::vec::IntoIter<Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
