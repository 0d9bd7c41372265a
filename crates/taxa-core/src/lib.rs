//! Taxa Core - Entity model, store loading, and the entity query engine.
//!
//! A [`Store`] holds a normalized snapshot of the content database: one
//! [`Collection`] of [`Entity`] records per entity type, with relation id
//! lists nested in at load time. The [`query`] module filters, sorts and
//! annotates those collections for the admin views.

pub mod collection;
pub mod entity;
pub mod error;
pub mod query;
pub mod store;
pub mod value;

pub use collection::Collection;
pub use entity::Entity;
pub use error::Error;
pub use query::{ConnectionQuery, SelectOption, SortOrder, SortType};
pub use store::Store;
pub use value::Value;
