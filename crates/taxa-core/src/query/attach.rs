//! Derived-field attachment.
//!
//! These functions resolve foreign keys held in attributes and attach the
//! resolved records as derived fields on copies of the input. Lookups are
//! find-or-none: an unresolved reference leaves the derived field unset.

use tracing::{debug, trace};

use crate::collection::Collection;
use crate::entity::{Entity, LAST_MODIFIED_USER_ID, TAXONOMY_ID};
use crate::value::{attributes_equal, Value};

/// Association attribute naming the category of a category join row.
pub const CATEGORY_ID: &str = "category_id";

/// Association attribute naming the user of a `user_roles` row.
pub const USER_ID: &str = "user_id";

/// Association attribute naming the role of a `user_roles` row.
pub const ROLE_ID: &str = "role_id";

/// The taxonomy flag marking which entity type a taxonomy tags, e.g.
/// `tags_measures`.
pub fn tags_key(relation: &str) -> String {
    format!("tags_{relation}")
}

/// Attach to each entity the first association row linking it to
/// `association_id`.
///
/// A row matches when its `entity_key` attribute equals the entity id and its
/// `association_key` attribute equals `association_id`. Entities without a
/// match get `associated` cleared.
pub fn attach_associated(
    entities: &Collection,
    entity_key: &str,
    associations: &Collection,
    association_key: &str,
    association_id: &str,
) -> Collection {
    let association_id = Value::from(association_id);
    entities.map(|entity| {
        let entity_id = entity.id_value();
        let associated = associations.find(|association| {
            attributes_equal(association.attribute(entity_key), &entity_id)
                && attributes_equal(association.attribute(association_key), &association_id)
        });
        entity.clone().with_associated(associated.cloned())
    })
}

/// Attach the user named by the entity's `last_modified_user_id`.
pub fn attach_user(entity: &Entity, users: &Collection) -> Entity {
    let user = users.find(|user| attributes_equal(entity.attribute(LAST_MODIFIED_USER_ID), &user.id_value()));
    if user.is_none() {
        trace!(entity = %entity.id, "last-modifying user not resolved");
    }
    entity.clone().with_user(user.cloned())
}

/// Categories of one taxonomy.
fn taxonomy_categories(taxonomy: &Entity, categories: &Collection) -> Collection {
    let taxonomy_id = taxonomy.id_value();
    categories.filter(|category| attributes_equal(category.attribute(TAXONOMY_ID), &taxonomy_id))
}

/// Taxonomies flagged with `tags_key`, each with its categories attached.
pub fn prepare_taxonomies(taxonomies: &Collection, categories: &Collection, tags_key: &str) -> Collection {
    let prepared: Collection = taxonomies
        .iter()
        .filter(|taxonomy| taxonomy.attribute(tags_key).is_some_and(Value::is_truthy))
        .map(|taxonomy| {
            let categories = taxonomy_categories(taxonomy, categories);
            taxonomy.clone().with_categories(categories)
        })
        .collect();
    debug!(taxonomies = prepared.len(), tags_key, "prepared taxonomies");
    prepared
}

/// Like [`prepare_taxonomies`], with each category further annotated with
/// its association row for one entity.
///
/// Category rows are matched on `category_id` and `entity_key`
/// (e.g. `measure_id`) equal to `entity_id`.
pub fn prepare_taxonomies_with_associations(
    taxonomies: &Collection,
    categories: &Collection,
    associations: &Collection,
    tags_key: &str,
    entity_key: &str,
    entity_id: &str,
) -> Collection {
    prepare_taxonomies(taxonomies, categories, tags_key).map(|taxonomy| {
        let annotated = taxonomy
            .categories
            .as_ref()
            .map(|cats| attach_associated(cats, CATEGORY_ID, associations, entity_key, entity_id))
            .unwrap_or_default();
        taxonomy.clone().with_categories(annotated)
    })
}

/// Attach a category's owning taxonomy and last-modifying user.
pub fn prepare_category(category: &Entity, users: &Collection, taxonomies: &Collection) -> Entity {
    let taxonomy = taxonomies.find(|taxonomy| {
        attributes_equal(category.attribute(TAXONOMY_ID), &taxonomy.id_value())
    });
    let category = category.clone().with_taxonomy(taxonomy.cloned());
    attach_user(&category, users)
}

/// Users holding a role through at least one `user_roles` row.
pub fn resolve_users_in_role(users: &Collection, user_roles: &Collection, role_id: &str) -> Collection {
    let role_id = Value::from(role_id);
    users.filter(|user| {
        let user_id = user.id_value();
        user_roles.iter().any(|association| {
            attributes_equal(association.attribute(ROLE_ID), &role_id)
                && attributes_equal(association.attribute(USER_ID), &user_id)
        })
    })
}
