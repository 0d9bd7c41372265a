//! Normalized entity records.

use std::collections::BTreeMap;

use crate::collection::Collection;
use crate::value::Value;

/// Relation path holding an entity's category ids.
pub const CATEGORIES: &str = "categories";

/// Attribute linking a category to its taxonomy.
pub const TAXONOMY_ID: &str = "taxonomy_id";

/// Attribute naming the user who last modified an entity.
pub const LAST_MODIFIED_USER_ID: &str = "last_modified_user_id";

/// A normalized domain record.
///
/// `attributes` keeps insertion order. `relations` holds the foreign-id
/// lists nested in by the loading layer; the query engine only reads them.
/// The remaining fields are derived by the query engine and start out unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    /// String-encoded integer id, unique per collection.
    pub id: String,
    /// Scalar attributes in insertion order.
    pub attributes: Vec<(String, Value)>,
    /// Many-to-many links by relation path.
    pub relations: BTreeMap<String, Vec<i64>>,
    /// Join-table row matched by `attach_associated`.
    pub associated: Option<Box<Entity>>,
    /// Last-modifying user resolved by `attach_user`.
    pub user: Option<Box<Entity>>,
    /// Owning taxonomy resolved by `prepare_category`.
    pub taxonomy: Option<Box<Entity>>,
    /// Categories of a prepared taxonomy.
    pub categories: Option<Collection>,
}

impl Entity {
    /// Create an entity with no attributes or relations.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set an attribute, keeping the position of an existing key.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Set a relation list.
    pub fn with_relation(mut self, path: impl Into<String>, ids: impl IntoIterator<Item = i64>) -> Self {
        self.relations.insert(path.into(), ids.into_iter().collect());
        self
    }

    /// Set the matched association row.
    pub fn with_associated(mut self, associated: Option<Entity>) -> Self {
        self.associated = associated.map(Box::new);
        self
    }

    /// Set the resolved user.
    pub fn with_user(mut self, user: Option<Entity>) -> Self {
        self.user = user.map(Box::new);
        self
    }

    /// Set the resolved taxonomy.
    pub fn with_taxonomy(mut self, taxonomy: Option<Entity>) -> Self {
        self.taxonomy = taxonomy.map(Box::new);
        self
    }

    /// Set the derived category list.
    pub fn with_categories(mut self, categories: Collection) -> Self {
        self.categories = Some(categories);
        self
    }

    /// Get an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Get a relation list by path.
    pub fn relation(&self, path: &str) -> Option<&[i64]> {
        self.relations.get(path).map(Vec::as_slice)
    }

    /// The id as a value, for string-coercing comparisons.
    pub fn id_value(&self) -> Value {
        Value::String(self.id.clone())
    }
}
