//! Relation membership tests.
//!
//! These are the primitives every filter is built from. They read the
//! relation lists nested in by the loading layer and never fail: a missing
//! list or an unresolved id is simply "not associated".

use tracing::trace;

use crate::collection::Collection;
use crate::entity::{Entity, CATEGORIES, TAXONOMY_ID};
use crate::value::{attributes_equal, parse_int, Value};

/// Check if `entity` links to `target` through the relation at `path`.
///
/// `target` is read as a leading integer; a target without one matches
/// nothing.
pub fn has_association(entity: &Entity, path: &str, target: &str) -> bool {
    match parse_int(target) {
        Some(id) => has_association_id(entity, path, id),
        None => false,
    }
}

/// Integer form of [`has_association`].
pub fn has_association_id(entity: &Entity, path: &str, id: i64) -> bool {
    entity
        .relation(path)
        .map(|ids| ids.contains(&id))
        .unwrap_or(false)
}

/// Check if `entity` is tagged with a category.
pub fn has_category(entity: &Entity, category_id: &str) -> bool {
    has_association(entity, CATEGORIES, category_id)
}

/// Check if any of the entity's categories belongs to a taxonomy.
///
/// Category ids are resolved through `categories`; ids with no matching
/// category are skipped.
pub fn has_taxonomy_association(entity: &Entity, categories: &Collection, taxonomy_id: i64) -> bool {
    let Some(category_ids) = entity.relation(CATEGORIES) else {
        return false;
    };
    let taxonomy_id = Value::Int(taxonomy_id);

    category_ids.iter().any(|category_id| {
        match categories.get(&category_id.to_string()) {
            Some(category) => attributes_equal(category.attribute(TAXONOMY_ID), &taxonomy_id),
            None => {
                trace!(entity = %entity.id, category_id, "unresolved category");
                false
            }
        }
    })
}

/// Check if the relation at `path` exists and is non-empty.
pub fn has_any_association(entity: &Entity, path: &str) -> bool {
    entity.relation(path).is_some_and(|ids| !ids.is_empty())
}

/// Categories whose `path` relation contains any of `connected_ids`.
pub fn connected_categories(connected_ids: &[i64], taxonomy_categories: &Collection, path: &str) -> Collection {
    taxonomy_categories.filter(|category| {
        connected_ids
            .iter()
            .any(|&id| has_association_id(category, path, id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Collection {
        Collection::new()
            .with(Entity::new("10").with_attribute(TAXONOMY_ID, "5"))
            .with(Entity::new("20").with_attribute(TAXONOMY_ID, 6))
    }

    #[test]
    fn test_has_association_without_relation_is_false() {
        let entity = Entity::new("1");
        assert!(!has_association(&entity, "recommendations", "3"));
    }

    #[test]
    fn test_has_association_membership() {
        let entity = Entity::new("1").with_relation("recommendations", [3, 4]);
        assert!(has_association(&entity, "recommendations", "3"));
        assert!(has_association(&entity, "recommendations", "4x"));
        assert!(!has_association(&entity, "recommendations", "5"));
        assert!(!has_association(&entity, "recommendations", "abc"));
    }

    #[test]
    fn test_has_category() {
        let entity = Entity::new("1").with_relation(CATEGORIES, [10]);
        assert!(has_category(&entity, "10"));
        assert!(!has_category(&entity, "20"));
    }

    #[test]
    fn test_has_taxonomy_association() {
        let entity = Entity::new("1").with_relation(CATEGORIES, [10]);
        let categories = categories();

        assert!(has_taxonomy_association(&entity, &categories, 5));
        assert!(!has_taxonomy_association(&entity, &categories, 6));
    }

    #[test]
    fn test_has_taxonomy_association_unresolved_category() {
        let entity = Entity::new("1").with_relation(CATEGORIES, [99]);
        assert!(!has_taxonomy_association(&entity, &categories(), 5));
        assert!(!has_taxonomy_association(&entity, &Collection::new(), 5));
        assert!(!has_taxonomy_association(&Entity::new("2"), &categories(), 5));
    }

    #[test]
    fn test_has_any_association() {
        let entity = Entity::new("1")
            .with_relation("measures", [])
            .with_relation(CATEGORIES, [10]);
        assert!(has_any_association(&entity, CATEGORIES));
        assert!(!has_any_association(&entity, "measures"));
        assert!(!has_any_association(&entity, "recommendations"));
    }

    #[test]
    fn test_connected_categories() {
        let categories = Collection::new()
            .with(Entity::new("10").with_relation("measures", [1, 2]))
            .with(Entity::new("11").with_relation("measures", [3]))
            .with(Entity::new("12"));

        let connected = connected_categories(&[2, 3], &categories, "measures");
        assert_eq!(connected.ids().collect::<Vec<_>>(), vec!["10", "11"]);

        let connected = connected_categories(&[], &categories, "measures");
        assert!(connected.is_empty());
    }
}
