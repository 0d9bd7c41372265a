//! Output formatters for command results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use taxa_core::{Entity, SelectOption, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a list of entities with their derived fields.
    fn format_entities(&self, entities: &[Entity]) -> String;

    /// Format selection options.
    fn format_options(&self, options: &[SelectOption]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_entities(&self, entities: &[Entity]) -> String {
        if entities.is_empty() {
            return "No results".to_string();
        }

        let columns = Columns::of(entities);
        let mut table = Table::new();
        table.set_header(columns.header().into_iter().map(Cell::new).collect::<Vec<_>>());

        for entity in entities {
            let cells: Vec<Cell> = columns
                .row(entity)
                .into_iter()
                .map(|value| Cell::new(value.unwrap_or_default()))
                .collect();
            table.add_row(cells);
        }

        format!("{}\n{} row(s)", table, entities.len())
    }

    fn format_options(&self, options: &[SelectOption]) -> String {
        if options.is_empty() {
            return "No options".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["value", "reference", "label", "checked"]);
        for option in options {
            let label = match (&option.label, option.draft) {
                (Some(label), true) => format!("{label} (draft)"),
                (Some(label), false) => label.clone(),
                (None, _) => String::new(),
            };
            table.add_row(vec![
                option.value.clone(),
                option.reference.clone().unwrap_or_default(),
                label,
                if option.checked { "x".to_string() } else { String::new() },
            ]);
        }

        format!("{}\n{} option(s)", table, options.len())
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_entities(&self, entities: &[Entity]) -> String {
        let rows: Vec<serde_json::Value> = entities.iter().map(entity_to_json).collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_options(&self, options: &[SelectOption]) -> String {
        let rows: Vec<serde_json::Value> = options
            .iter()
            .map(|option| {
                serde_json::json!({
                    "value": option.value,
                    "label": option.label,
                    "reference": option.reference,
                    "order": option.order.as_ref().map(value_to_json),
                    "draft": option.draft,
                    "checked": option.checked,
                })
            })
            .collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_entities(&self, entities: &[Entity]) -> String {
        let columns = Columns::of(entities);
        let mut output = columns.header().join(",");
        output.push('\n');

        for entity in entities {
            let cells: Vec<String> = columns
                .row(entity)
                .into_iter()
                .map(|value| value.map(|v| format!("\"{}\"", escape_csv(&v))).unwrap_or_default())
                .collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }

        output
    }

    fn format_options(&self, options: &[SelectOption]) -> String {
        let mut output = String::from("value,reference,label,checked\n");
        for option in options {
            let quoted = |s: &Option<String>| {
                s.as_deref()
                    .map(|s| format!("\"{}\"", escape_csv(s)))
                    .unwrap_or_default()
            };
            output.push_str(&format!(
                "\"{}\",{},{},{}\n",
                escape_csv(&option.value),
                quoted(&option.reference),
                quoted(&option.label),
                option.checked
            ));
        }
        output
    }
}

/// Column layout shared by the table and CSV formatters: the id, every
/// attribute name in first-seen order, then one column per derived field
/// that is set on any entity.
struct Columns {
    attributes: Vec<String>,
    associated: bool,
    user: bool,
    taxonomy: bool,
    categories: bool,
}

impl Columns {
    fn of(entities: &[Entity]) -> Self {
        let mut attributes: Vec<String> = Vec::new();
        for entity in entities {
            for (name, _) in &entity.attributes {
                if !attributes.contains(name) {
                    attributes.push(name.clone());
                }
            }
        }

        Self {
            attributes,
            associated: entities.iter().any(|e| e.associated.is_some()),
            user: entities.iter().any(|e| e.user.is_some()),
            taxonomy: entities.iter().any(|e| e.taxonomy.is_some()),
            categories: entities.iter().any(|e| e.categories.is_some()),
        }
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec!["id".to_string()];
        header.extend(self.attributes.iter().cloned());
        for (present, name) in self.derived() {
            if present {
                header.push(name.to_string());
            }
        }
        header
    }

    fn derived(&self) -> [(bool, &'static str); 4] {
        [
            (self.associated, "associated"),
            (self.user, "user"),
            (self.taxonomy, "taxonomy"),
            (self.categories, "categories"),
        ]
    }

    /// Cell values for one entity; `None` marks an empty cell.
    fn row(&self, entity: &Entity) -> Vec<Option<String>> {
        let mut row = vec![Some(entity.id.clone())];
        row.extend(
            self.attributes
                .iter()
                .map(|name| entity.attribute(name).map(format_value)),
        );
        if self.associated {
            row.push(entity.associated.as_ref().map(|a| a.id.clone()));
        }
        if self.user {
            row.push(entity.user.as_ref().map(|u| display_name(u)));
        }
        if self.taxonomy {
            row.push(entity.taxonomy.as_ref().map(|t| display_name(t)));
        }
        if self.categories {
            row.push(
                entity
                    .categories
                    .as_ref()
                    .map(|c| c.ids().collect::<Vec<_>>().join(" ")),
            );
        }
        row
    }
}

/// A short human-readable name for a resolved record.
fn display_name(entity: &Entity) -> String {
    ["name", "title"]
        .into_iter()
        .find_map(|field| entity.attribute(field).filter(|v| !v.is_null()))
        .map(|v| format!("{} ({})", format_value(v), entity.id))
        .unwrap_or_else(|| entity.id.clone())
}

/// Format a Value as a display string.
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        other => other.to_query_string(),
    }
}

/// Convert a Value to JSON.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
    }
}

/// Convert an entity to JSON in snapshot shape, with derived fields nested.
fn entity_to_json(entity: &Entity) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert("id".to_string(), serde_json::Value::String(entity.id.clone()));

    let attributes: serde_json::Map<String, serde_json::Value> = entity
        .attributes
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect();
    obj.insert("attributes".to_string(), serde_json::Value::Object(attributes));

    for (path, ids) in &entity.relations {
        obj.insert(path.clone(), serde_json::json!(ids));
    }

    let nested = [
        ("associated", &entity.associated),
        ("user", &entity.user),
        ("taxonomy", &entity.taxonomy),
    ];
    for (name, field) in nested {
        if let Some(related) = field {
            obj.insert(name.to_string(), entity_to_json(related));
        }
    }
    if let Some(categories) = &entity.categories {
        let rows: Vec<serde_json::Value> = categories.iter().map(entity_to_json).collect();
        obj.insert("categories".to_string(), serde_json::Value::Array(rows));
    }

    serde_json::Value::Object(obj)
}

/// Escape a string for CSV.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxa_core::Collection;

    fn entities() -> Vec<Entity> {
        vec![
            Entity::new("1")
                .with_attribute("title", "Say \"hi\"")
                .with_relation("categories", [10]),
            Entity::new("2")
                .with_attribute("draft", true)
                .with_user(Some(Entity::new("7").with_attribute("name", "Ada"))),
        ]
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_table_formatter() {
        let output = TableFormatter.format_entities(&entities());
        assert!(output.contains("title"));
        assert!(output.contains("Ada (7)"));
        assert!(output.ends_with("2 row(s)"));

        assert_eq!(TableFormatter.format_entities(&[]), "No results");
    }

    #[test]
    fn test_csv_formatter() {
        let output = CsvFormatter.format_entities(&entities());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "id,title,draft,user");
        assert_eq!(lines[1], "\"1\",\"Say \"\"hi\"\"\",,");
        assert_eq!(lines[2], "\"2\",,\"true\",\"Ada (7)\"");
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter.format_entities(&entities());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["id"], "1");
        assert_eq!(parsed[0]["categories"], serde_json::json!([10]));
        assert_eq!(parsed[1]["attributes"]["draft"], true);
        assert_eq!(parsed[1]["user"]["attributes"]["name"], "Ada");
    }

    #[test]
    fn test_json_nested_categories() {
        let taxonomy = Entity::new("5").with_categories(Collection::new().with(Entity::new("10")));
        let output = JsonFormatter.format_entities(&[taxonomy]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["categories"][0]["id"], "10");
    }

    #[test]
    fn test_format_options() {
        let options = vec![
            SelectOption::new("1").with_label("Health").with_reference("1.2").with_checked(true),
            SelectOption::new("2").with_label("Education"),
        ];

        let csv = CsvFormatter.format_options(&options);
        assert_eq!(
            csv,
            "value,reference,label,checked\n\"1\",\"1.2\",\"Health\",true\n\"2\",,\"Education\",false\n"
        );

        let json: serde_json::Value = serde_json::from_str(&JsonFormatter.format_options(&options)).unwrap();
        assert_eq!(json[0]["reference"], "1.2");
        assert_eq!(json[1]["checked"], false);

        assert!(TableFormatter.format_options(&options).ends_with("2 option(s)"));
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&Value::Null), serde_json::Value::Null);
        assert_eq!(value_to_json(&Value::Int(3)), serde_json::json!(3));
        assert_eq!(value_to_json(&Value::Float(f64::NAN)), serde_json::Value::Null);
        assert_eq!(value_to_json(&Value::from("a")), serde_json::json!("a"));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("a\"b"), "a\"\"b");
    }
}
