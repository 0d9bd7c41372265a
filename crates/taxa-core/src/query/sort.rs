//! Entity sorting.

use tracing::debug;

use crate::entity::Entity;

use super::compare::{compare_keys, sort_key, SortOrder, SortType};

/// Field sorted on when none is given.
pub const DEFAULT_SORT_BY: &str = "id";

/// The key an entity sorts by: its id for `"id"`, otherwise the attribute.
pub fn sort_value(entity: &Entity, sort_by: &str) -> Option<String> {
    match sort_by {
        "id" => Some(entity.id.clone()),
        attribute => sort_key(entity.attribute(attribute)),
    }
}

/// Sort entities by one field.
///
/// Ascending order is stable: entities with identical keys keep their
/// relative order. Descending order is the exact reverse of ascending,
/// ties included. `sort_by` defaults to the id.
pub fn sort_entities<'a, I>(entities: I, order: SortOrder, sort_by: Option<&str>, sort_type: SortType) -> Vec<Entity>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let sort_by = sort_by.unwrap_or(DEFAULT_SORT_BY);

    let mut keyed: Vec<(Option<String>, &Entity)> = entities
        .into_iter()
        .map(|entity| (sort_value(entity, sort_by), entity))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_deref(), b.as_deref(), SortOrder::Asc, sort_type));
    if order == SortOrder::Desc {
        keyed.reverse();
    }

    debug!(count = keyed.len(), sort_by, %order, %sort_type, "sorted entities");
    keyed.into_iter().map(|(_, entity)| entity.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;

    fn titled(titles: &[(&str, &str)]) -> Collection {
        titles
            .iter()
            .map(|(id, title)| Entity::new(*id).with_attribute("title", *title))
            .collect()
    }

    fn ids(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_id_is_numeric() {
        let entities: Collection = ["10", "2", "1"].into_iter().map(Entity::new).collect();
        let sorted = sort_entities(&entities, SortOrder::Asc, None, SortType::Natural);
        assert_eq!(ids(&sorted), vec!["1", "2", "10"]);
    }

    #[test]
    fn test_sort_by_attribute() {
        let entities = titled(&[("1", "10"), ("2", "2"), ("3", "1a"), ("4", "abc")]);
        let sorted = sort_entities(&entities, SortOrder::Asc, Some("title"), SortType::Natural);
        assert_eq!(ids(&sorted), vec!["3", "2", "1", "4"]);
    }

    #[test]
    fn test_descending_is_reverse() {
        let entities = titled(&[("1", "10"), ("2", "2"), ("3", "1a"), ("4", "abc"), ("5", "B")]);
        let asc = sort_entities(&entities, SortOrder::Asc, Some("title"), SortType::Natural);
        let mut desc = sort_entities(&entities, SortOrder::Desc, Some("title"), SortType::Natural);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn test_descending_is_reverse_with_ties() {
        let entities = titled(&[("1", "a"), ("2", "a"), ("3", "b"), ("4", "a")]);
        let asc = sort_entities(&entities, SortOrder::Asc, Some("title"), SortType::Natural);
        let desc = sort_entities(&entities, SortOrder::Desc, Some("title"), SortType::Natural);

        assert_eq!(ids(&asc), vec!["1", "2", "4", "3"]);
        assert_eq!(ids(&desc), vec!["3", "4", "2", "1"]);
    }

    #[test]
    fn test_sort_is_idempotent_and_stable() {
        let entities = titled(&[("1", "b"), ("2", "a"), ("3", "b"), ("4", "a")]);
        let once = sort_entities(&entities, SortOrder::Asc, Some("title"), SortType::Natural);
        let twice = sort_entities(&once, SortOrder::Asc, Some("title"), SortType::Natural);

        assert_eq!(ids(&once), vec!["2", "4", "1", "3"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_attribute_sorts_last() {
        let entities = titled(&[("1", "b"), ("2", "a")]).with(Entity::new("3"));
        let sorted = sort_entities(&entities, SortOrder::Asc, Some("title"), SortType::Natural);
        assert_eq!(ids(&sorted), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_sort_by_date() {
        let entities: Collection = [
            ("1", "2017-05-01T10:00:00Z"),
            ("2", "2016-12-31"),
            ("3", "2017-05-01T09:00:00Z"),
        ]
        .iter()
        .map(|(id, date)| Entity::new(*id).with_attribute("updated_at", *date))
        .collect();

        let sorted = sort_entities(&entities, SortOrder::Desc, Some("updated_at"), SortType::Date);
        assert_eq!(ids(&sorted), vec!["1", "3", "2"]);
    }

    #[test]
    fn test_sort_leaves_input_untouched() {
        let entities = titled(&[("1", "b"), ("2", "a")]);
        let _ = sort_entities(&entities, SortOrder::Asc, Some("title"), SortType::Natural);
        assert_eq!(entities.ids().collect::<Vec<_>>(), vec!["1", "2"]);
    }
}
