//! The normalized entity store and snapshot loading.
//!
//! A snapshot is a JSON object keyed by entity type, each holding an object
//! keyed by entity id:
//!
//! ```json
//! {
//!   "measures": {
//!     "1": { "id": "1", "attributes": { "title": "B" }, "categories": [10] }
//!   },
//!   "categories": {
//!     "10": { "id": "10", "attributes": { "taxonomy_id": 5 } }
//!   }
//! }
//! ```
//!
//! Every array-valued field besides `attributes` is read as a relation list.
//! Object key order is preserved for both collections and attributes.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::Error;
use crate::value::Value;

/// Collections keyed by entity-type name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    collections: BTreeMap<String, Collection>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a collection.
    pub fn with_collection(mut self, name: impl Into<String>, collection: Collection) -> Self {
        self.collections.insert(name.into(), collection);
        self
    }

    /// Get a collection by type name.
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Type names in the store.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Check if the store holds no collections.
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        into_store(snapshot)
    }

    /// Parse a snapshot from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        into_store(snapshot)
    }

    /// Load a snapshot file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = std::fs::File::open(path.as_ref())?;
        let store = Self::from_reader(std::io::BufReader::new(file))?;
        debug!(collections = store.len(), "store loaded");
        Ok(store)
    }
}

/// Raw snapshot as decoded from JSON: type name -> id -> record.
type Snapshot = Ordered<Ordered<RawEntity>>;

/// A JSON object decoded into key/value pairs in document order.
struct Ordered<V>(Vec<(String, V)>);

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Ordered(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderedVisitor(PhantomData))
    }
}

struct OrderedVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
    type Value = Ordered<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(Ordered(entries))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Ordered::default())
    }
}

#[derive(Deserialize)]
struct RawEntity {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    attributes: Ordered<Value>,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Str(String),
}

fn into_store(snapshot: Snapshot) -> Result<Store, Error> {
    let mut store = Store::new();
    for (name, records) in snapshot.0 {
        let mut collection = Collection::new();
        for (key, record) in records.0 {
            collection.insert(record.into_entity(&name, key)?);
        }
        trace!(collection = %name, entities = collection.len(), "collection decoded");
        store.collections.insert(name, collection);
    }
    Ok(store)
}

impl RawEntity {
    fn into_entity(self, collection: &str, key: String) -> Result<Entity, Error> {
        let id = match self.id {
            Some(RawId::Int(i)) => i.to_string(),
            Some(RawId::Str(s)) => s,
            None => key,
        };

        let mut relations = BTreeMap::new();
        for (path, value) in self.rest {
            let serde_json::Value::Array(items) = value else {
                trace!(collection, id = %id, field = %path, "skipping non-relation field");
                continue;
            };
            let ids = items
                .iter()
                .map(relation_id)
                .collect::<Option<Vec<i64>>>()
                .ok_or_else(|| {
                    Error::InvalidData(format!(
                        "{collection}/{id}: relation '{path}' holds a non-integer id"
                    ))
                })?;
            relations.insert(path, ids);
        }

        Ok(Entity {
            id,
            attributes: self.attributes.0,
            relations,
            ..Entity::default()
        })
    }
}

/// Decode a relation id given as a number or an integer string.
fn relation_id(item: &serde_json::Value) -> Option<i64> {
    match item {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
