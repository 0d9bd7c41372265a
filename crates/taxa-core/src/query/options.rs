//! Selection options for multi-select fields.
//!
//! An option stands for one selectable entity. Lists of options are shown
//! in natural order of their sort value: the explicit `order` when set,
//! otherwise the `reference` code, otherwise the label.

use crate::entity::Entity;
use crate::value::Value;

use super::compare::{compare_keys, sort_key, SortOrder, SortType};

/// Attribute holding an entity's short reference code.
pub const REFERENCE: &str = "reference";

/// Attribute holding an entity's explicit display order.
pub const ORDER: &str = "order";

/// Attribute marking an unpublished entity.
pub const DRAFT: &str = "draft";

/// One option of a multi-select field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectOption {
    /// Option value, normally the entity id.
    pub value: String,
    pub label: Option<String>,
    pub reference: Option<String>,
    pub order: Option<Value>,
    pub draft: bool,
    pub checked: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<Value>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Build an option from an entity.
    ///
    /// The label is read from `label_field`; reference, order and draft come
    /// from their attributes of the same name. Null attributes are treated as
    /// unset.
    pub fn from_entity(entity: &Entity, label_field: &str) -> Self {
        let text = |name: &str| sort_key(entity.attribute(name));
        Self {
            value: entity.id.clone(),
            label: text(label_field),
            reference: text(REFERENCE),
            order: entity.attribute(ORDER).filter(|v| !v.is_null()).cloned(),
            draft: entity.attribute(DRAFT).is_some_and(Value::is_truthy),
            checked: false,
        }
    }

    /// The key this option sorts by: the first truthy of order, reference
    /// and label.
    pub fn sort_value(&self) -> Option<String> {
        if let Some(order) = self.order.as_ref().filter(|o| o.is_truthy()) {
            return Some(order.to_query_string());
        }
        [&self.reference, &self.label]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
    }
}

/// Sort options ascending by their sort value, in natural order.
pub fn sort_options(options: &[SelectOption]) -> Vec<SelectOption> {
    let mut keyed: Vec<(Option<String>, &SelectOption)> =
        options.iter().map(|option| (option.sort_value(), option)).collect();
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a.as_deref(), b.as_deref(), SortOrder::Asc, SortType::Natural));
    keyed.into_iter().map(|(_, option)| option.clone()).collect()
}

/// The checked options, sorted.
pub fn active_options(options: &[SelectOption]) -> Vec<SelectOption> {
    let checked: Vec<SelectOption> = options.iter().filter(|o| o.checked).cloned().collect();
    sort_options(&checked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(options: &[SelectOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn test_sort_value_precedence() {
        let option = SelectOption::new("1")
            .with_label("Label")
            .with_reference("R")
            .with_order(3);
        assert_eq!(option.sort_value().as_deref(), Some("3"));

        let option = SelectOption::new("1").with_label("Label").with_reference("R");
        assert_eq!(option.sort_value().as_deref(), Some("R"));

        let option = SelectOption::new("1").with_label("Label").with_order(0);
        assert_eq!(option.sort_value().as_deref(), Some("Label"));

        let option = SelectOption::new("1").with_label("Label").with_reference("");
        assert_eq!(option.sort_value().as_deref(), Some("Label"));

        assert_eq!(SelectOption::new("1").sort_value(), None);
    }

    #[test]
    fn test_sort_options_natural() {
        let options = vec![
            SelectOption::new("a").with_reference("1.10"),
            SelectOption::new("b").with_reference("1.2"),
            SelectOption::new("c").with_label("Zebra"),
            SelectOption::new("d").with_reference("1"),
            SelectOption::new("e"),
        ];
        let sorted = sort_options(&options);
        assert_eq!(values(&sorted), vec!["d", "a", "b", "c", "e"]);
    }

    #[test]
    fn test_active_options() {
        let options = vec![
            SelectOption::new("a").with_label("B").with_checked(true),
            SelectOption::new("b").with_label("A"),
            SelectOption::new("c").with_label("A").with_checked(true),
        ];
        assert_eq!(values(&active_options(&options)), vec!["c", "a"]);
        assert!(active_options(&[]).is_empty());
    }

    #[test]
    fn test_from_entity() {
        let entity = Entity::new("7")
            .with_attribute("title", "Health")
            .with_attribute(REFERENCE, "2.1")
            .with_attribute(ORDER, Value::Null)
            .with_attribute(DRAFT, true);

        let option = SelectOption::from_entity(&entity, "title");
        assert_eq!(option.value, "7");
        assert_eq!(option.label.as_deref(), Some("Health"));
        assert_eq!(option.reference.as_deref(), Some("2.1"));
        assert_eq!(option.order, None);
        assert!(option.draft);
        assert!(!option.checked);
        assert_eq!(option.sort_value().as_deref(), Some("2.1"));

        let bare = SelectOption::from_entity(&Entity::new("8"), "title");
        assert_eq!(bare, SelectOption::new("8"));
    }
}
