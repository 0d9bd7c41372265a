//! Subcommands and their execution against a loaded store.

use clap::Subcommand;
use thiserror::Error;
use tracing::{debug, info};

use taxa_core::query::{
    active_options, filter_by_attributes, filter_by_categories, filter_by_connected_categories,
    filter_by_connection, filter_by_keywords, filter_without_association, prepare_category,
    prepare_taxonomies, prepare_taxonomies_with_associations, resolve_users_in_role, sort_entities,
    sort_options, tags_key,
};
use taxa_core::{Collection, SelectOption, Store, Value};

use crate::config::CliConfig;
use crate::formatter::Formatter;

/// Collection holding categories.
const CATEGORIES: &str = "categories";
/// Collection holding taxonomies.
const TAXONOMIES: &str = "taxonomies";
/// Collection holding users.
const USERS: &str = "users";
/// Join collection linking users to roles.
const USER_ROLES: &str = "user_roles";

/// Errors raised while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Store loading or query parsing failed.
    #[error(transparent)]
    Core(#[from] taxa_core::Error),

    /// The listed entity type has no collection in the store.
    #[error("unknown entity type '{0}'")]
    UnknownType(String),

    /// No category with the requested id.
    #[error("category '{0}' not found")]
    CategoryNotFound(String),
}

/// Store queries.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List entities of one type, filtered and sorted.
    List {
        /// Entity type, e.g. measures.
        entity_type: String,

        /// Attribute equality criterion as key=value (repeatable).
        #[arg(long = "where", value_parser = parse_key_value)]
        attributes: Vec<(String, String)>,

        /// Required category id (repeatable).
        #[arg(long)]
        category: Vec<String>,

        /// Taxonomy id or relation path the entity must lack (repeatable).
        #[arg(long)]
        without: Vec<String>,

        /// Connected category as <path>:<category id> (repeatable).
        #[arg(long)]
        connected: Vec<String>,

        /// Connection as <path>:<id> (repeatable).
        #[arg(long)]
        connection: Vec<String>,

        /// Keywords matched against the search fields.
        #[arg(long)]
        search: Option<String>,
    },

    /// Taxonomies tagging an entity type, with their categories.
    Taxonomies {
        /// Entity type the taxonomies tag, e.g. measures.
        #[arg(long)]
        tags: String,

        /// Join collection to annotate categories from, e.g. measure_categories.
        #[arg(long, requires_all = ["entity_key", "entity_id"])]
        associations: Option<String>,

        /// Join attribute naming the entity, e.g. measure_id.
        #[arg(long, requires = "associations")]
        entity_key: Option<String>,

        /// Entity id the annotations are for.
        #[arg(long, requires = "associations")]
        entity_id: Option<String>,
    },

    /// One category with its taxonomy and last-modifying user.
    Category {
        /// Category id.
        id: String,
    },

    /// Users holding a role.
    Users {
        /// Role id.
        #[arg(long)]
        role: String,
    },

    /// Selection options for an entity type.
    Options {
        /// Entity type, e.g. recommendations.
        entity_type: String,

        /// Attribute used as the option label.
        #[arg(long, default_value = "title")]
        label_field: String,

        /// Mark an option checked (repeatable).
        #[arg(long)]
        checked: Vec<String>,

        /// Only show checked options.
        #[arg(long)]
        active: bool,
    },
}

/// Parse a `key=value` criterion.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

/// Run a command and return its formatted output.
pub fn execute(
    command: &Command,
    store: &Store,
    config: &CliConfig,
    formatter: &dyn Formatter,
) -> Result<String, CommandError> {
    let empty = Collection::new();
    let collection = |name: &str| store.collection(name).unwrap_or(&empty);

    match command {
        Command::List {
            entity_type,
            attributes,
            category,
            without,
            connected,
            connection,
            search,
        } => {
            let entities = store
                .collection(entity_type)
                .ok_or_else(|| CommandError::UnknownType(entity_type.clone()))?;

            let query: Vec<(&str, Value)> = attributes
                .iter()
                .map(|(key, value)| (key.as_str(), Value::from(value.as_str())))
                .collect();
            let result = filter_by_attributes(entities, &query);
            let result = filter_by_categories(&result, category);
            let result = filter_without_association(&result, collection(CATEGORIES), without);
            let result = filter_by_connected_categories(&result, store, connected)?;
            let result = filter_by_connection(&result, connection)?;
            let result = match search {
                Some(keywords) => filter_by_keywords(&result, keywords, &config.search_fields),
                None => result,
            };

            let sorted = sort_entities(&result, config.order, Some(config.sort_by.as_str()), config.sort_type);
            info!(entity_type = %entity_type, matched = sorted.len(), total = entities.len(), "listed entities");
            Ok(formatter.format_entities(&sorted))
        }

        Command::Taxonomies {
            tags,
            associations,
            entity_key,
            entity_id,
        } => {
            let flag = tags_key(tags);
            let taxonomies = match (associations, entity_key, entity_id) {
                (Some(associations), Some(entity_key), Some(entity_id)) => {
                    prepare_taxonomies_with_associations(
                        collection(TAXONOMIES),
                        collection(CATEGORIES),
                        collection(associations.as_str()),
                        &flag,
                        entity_key,
                        entity_id,
                    )
                }
                _ => prepare_taxonomies(collection(TAXONOMIES), collection(CATEGORIES), &flag),
            };
            debug!(taxonomies = taxonomies.len(), flag = %flag, "prepared taxonomies");
            Ok(formatter.format_entities(taxonomies.as_slice()))
        }

        Command::Category { id } => {
            let category = collection(CATEGORIES)
                .get(id)
                .ok_or_else(|| CommandError::CategoryNotFound(id.clone()))?;
            let prepared = prepare_category(category, collection(USERS), collection(TAXONOMIES));
            Ok(formatter.format_entities(std::slice::from_ref(&prepared)))
        }

        Command::Users { role } => {
            let users = resolve_users_in_role(collection(USERS), collection(USER_ROLES), role);
            Ok(formatter.format_entities(users.as_slice()))
        }

        Command::Options {
            entity_type,
            label_field,
            checked,
            active,
        } => {
            let entities = store
                .collection(entity_type)
                .ok_or_else(|| CommandError::UnknownType(entity_type.clone()))?;

            let options: Vec<SelectOption> = entities
                .iter()
                .map(|entity| {
                    SelectOption::from_entity(entity, label_field).with_checked(checked.contains(&entity.id))
                })
                .collect();
            let options = if *active {
                active_options(&options)
            } else {
                sort_options(&options)
            };
            Ok(formatter.format_options(&options))
        }
    }
}
