//! CLI configuration.

use std::path::PathBuf;

use clap::Parser;
use taxa_core::query::DEFAULT_SORT_BY;
use taxa_core::{SortOrder, SortType};

use crate::commands::Command;
use crate::formatter::OutputFormat;

/// Default path of the store snapshot.
pub const DEFAULT_STORE_PATH: &str = "./store.json";

/// Default output format.
pub const DEFAULT_FORMAT: OutputFormat = OutputFormat::Table;

/// Attributes searched by `--search` when no `--search-field` is given.
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &["title"];

/// Resolved CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Path to the JSON store snapshot.
    pub store_path: PathBuf,

    /// Output format.
    pub format: OutputFormat,

    /// Field entity lists are sorted by.
    pub sort_by: String,

    /// Sort direction.
    pub order: SortOrder,

    /// Natural or date comparison.
    pub sort_type: SortType,

    /// Attributes matched by keyword search.
    pub search_fields: Vec<String>,
}

impl CliConfig {
    /// Create a configuration reading the given store.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            format: DEFAULT_FORMAT,
            sort_by: DEFAULT_SORT_BY.to_string(),
            order: SortOrder::default(),
            sort_type: SortType::default(),
            search_fields: DEFAULT_SEARCH_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the sort field.
    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = sort_by.into();
        self
    }

    /// Set the sort direction.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the sort type.
    pub fn with_sort_type(mut self, sort_type: SortType) -> Self {
        self.sort_type = sort_type;
        self
    }

    /// Replace the keyword search fields. An empty list keeps the current
    /// fields.
    pub fn with_search_fields(mut self, fields: Vec<String>) -> Self {
        if !fields.is_empty() {
            self.search_fields = fields;
        }
        self
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "taxa")]
#[command(version, about = "Query Taxa store snapshots", long_about = None)]
pub struct Args {
    /// Path to the JSON store snapshot.
    #[arg(short, long, global = true, default_value = DEFAULT_STORE_PATH)]
    pub store: PathBuf,

    /// Output format.
    #[arg(long, global = true, default_value_t = DEFAULT_FORMAT, value_enum)]
    pub format: OutputFormat,

    /// Field to sort entity lists by.
    #[arg(long = "sort", global = true, default_value = DEFAULT_SORT_BY)]
    pub sort_by: String,

    /// Sort direction (asc or desc).
    #[arg(long, global = true, default_value = "asc")]
    pub order: SortOrder,

    /// Compare sort values as dates.
    #[arg(long, global = true)]
    pub date: bool,

    /// Attribute matched by --search (repeatable).
    #[arg(long = "search-field", global = true)]
    pub search_fields: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Convert command-line arguments to CLI configuration.
    pub fn into_config(self) -> CliConfig {
        let sort_type = if self.date { SortType::Date } else { SortType::Natural };

        CliConfig::new(self.store)
            .with_format(self.format)
            .with_sort_by(self.sort_by)
            .with_order(self.order)
            .with_sort_type(sort_type)
            .with_search_fields(self.search_fields)
    }
}
