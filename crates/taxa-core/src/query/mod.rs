//! Entity query engine.
//!
//! Pure functions over in-memory collections: relation membership tests,
//! filters, natural and date sorting, keyword search and derived-field
//! attachment. Nothing here performs I/O or mutates its input.

mod association;
mod attach;
mod compare;
mod filter;
mod options;
mod search;
mod sort;

pub use association::{
    connected_categories, has_any_association, has_association, has_association_id, has_category,
    has_taxonomy_association,
};
pub use attach::{
    attach_associated, attach_user, prepare_category, prepare_taxonomies,
    prepare_taxonomies_with_associations, resolve_users_in_role, tags_key, CATEGORY_ID, ROLE_ID, USER_ID,
};
pub use compare::{
    compare_keys, compare_values, date_cmp, natural_cmp, parse_date, parse_float_prefix, SortOrder, SortType,
};
pub use filter::{
    filter_by_attributes, filter_by_categories, filter_by_connected_categories, filter_by_connection,
    filter_without_association, ConnectionQuery,
};
pub use options::{active_options, sort_options, SelectOption};
pub use search::{cleanup_search_target, filter_by_keywords, prepare_search_target};
pub use sort::{sort_entities, sort_value, DEFAULT_SORT_BY};
