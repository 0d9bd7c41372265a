//! Entity filters.
//!
//! Every filter takes its criteria as an ordered sequence and keeps the
//! entities that satisfy all of them. A single criterion is passed as a
//! one-element slice. Filters read relation lists nested in by the loading
//! layer and return a new collection; the input is never modified.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::Error;
use crate::store::Store;
use crate::value::{attributes_equal, is_number, parse_int, Value};

use super::association::{has_any_association, has_association, has_category, has_taxonomy_association};

/// A `<path>:<id>` criterion naming a relation path and a target id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionQuery {
    /// Relation path, e.g. `recommendations`.
    pub path: String,
    /// Target id, read as a leading integer when tested.
    pub target: String,
}

impl ConnectionQuery {
    /// Create a query from its parts.
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }

    /// Parse a `<path>:<id>` criterion.
    ///
    /// The text is split at the first `:`. A criterion without a separator or
    /// with an empty path is rejected.
    pub fn parse(query: &str) -> Result<Self, Error> {
        match query.split_once(':') {
            Some((path, target)) if !path.is_empty() => Ok(Self::new(path, target)),
            _ => Err(Error::MalformedQuery {
                query: query.to_string(),
            }),
        }
    }

    /// Parse every criterion in a sequence, failing on the first bad one.
    pub fn parse_all<S: AsRef<str>>(queries: &[S]) -> Result<Vec<Self>, Error> {
        queries.iter().map(|q| Self::parse(q.as_ref())).collect()
    }
}

impl FromStr for ConnectionQuery {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.target)
    }
}

/// Keep entities lacking every listed association.
///
/// Numeric criteria are taxonomy ids: the entity must have no category in
/// that taxonomy. Other criteria are relation paths: the entity must have no
/// linked entities under that path.
pub fn filter_without_association<S: AsRef<str>>(
    entities: &Collection,
    categories: &Collection,
    query: &[S],
) -> Collection {
    let result = entities.filter(|entity| {
        query.iter().all(|criterion| {
            let criterion = criterion.as_ref();
            let associated = if is_number(criterion) {
                parse_int(criterion)
                    .is_some_and(|taxonomy_id| has_taxonomy_association(entity, categories, taxonomy_id))
            } else {
                has_any_association(entity, criterion)
            };
            !associated
        })
    });
    debug!(kept = result.len(), total = entities.len(), "filtered without association");
    result
}

/// Keep entities tagged with every listed category.
pub fn filter_by_categories<S: AsRef<str>>(entities: &Collection, query: &[S]) -> Collection {
    let result = entities.filter(|entity| {
        query
            .iter()
            .all(|category_id| has_category(entity, category_id.as_ref()))
    });
    debug!(kept = result.len(), total = entities.len(), "filtered by categories");
    result
}

/// Keep entities linked to a connection that carries a category.
///
/// Each criterion is `<path>:<category id>`. An entity passes a criterion
/// when some entity in `connections[path]` is linked from it through `path`
/// and is itself tagged with the category.
///
/// When the store has no connections (or an empty collection) for `path`,
/// the criterion passes for every entity.
pub fn filter_by_connected_categories<S: AsRef<str>>(
    entities: &Collection,
    connections: &Store,
    query: &[S],
) -> Result<Collection, Error> {
    let criteria = ConnectionQuery::parse_all(query)?;
    let result = entities.filter(|entity| {
        criteria
            .iter()
            .all(|criterion| passes_connected_category(entity, connections, criterion))
    });
    debug!(kept = result.len(), total = entities.len(), "filtered by connected categories");
    Ok(result)
}

fn passes_connected_category(entity: &Entity, connections: &Store, criterion: &ConnectionQuery) -> bool {
    match connections
        .collection(&criterion.path)
        .filter(|connected| !connected.is_empty())
    {
        Some(connected) => connected.iter().any(|connection| {
            has_association(entity, &criterion.path, &connection.id)
                && has_category(connection, &criterion.target)
        }),
        None => true,
    }
}

/// Keep entities linked to every listed connection.
///
/// Each criterion is `<path>:<id>`. An entity with no relation list at
/// `path` passes that criterion.
pub fn filter_by_connection<S: AsRef<str>>(entities: &Collection, query: &[S]) -> Result<Collection, Error> {
    let criteria = ConnectionQuery::parse_all(query)?;
    let result = entities.filter(|entity| {
        criteria.iter().all(|criterion| {
            entity.relation(&criterion.path).is_none()
                || has_association(entity, &criterion.path, &criterion.target)
        })
    });
    debug!(kept = result.len(), total = entities.len(), "filtered by connection");
    Ok(result)
}

/// Keep entities whose attributes equal every queried value.
///
/// The key `id` tests the entity id; other keys test attributes. Values
/// compare as strings, with a missing attribute reading as `"null"`.
pub fn filter_by_attributes<S: AsRef<str>>(entities: &Collection, query: &[(S, Value)]) -> Collection {
    let result = entities.filter(|entity| {
        query.iter().all(|(attribute, value)| match attribute.as_ref() {
            "id" => attributes_equal(Some(&entity.id_value()), value),
            name => attributes_equal(entity.attribute(name), value),
        })
    });
    debug!(kept = result.len(), total = entities.len(), "filtered by attributes");
    result
}
