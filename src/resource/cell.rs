//! Turning raw row values into display text
//!
//! Rows are untyped JSON objects straight from the backend, so every
//! renderer goes through the same lenient stringification rules.

use super::registry::{CellRender, ColumnDef, ResourceDef};
use serde_json::Value;
use std::collections::HashMap;

/// Lookup lists keyed by lookup name; unloaded lookups are simply absent
pub type Lookups = HashMap<String, Vec<Value>>;

const MEDIA_MARKER: &str = "▣";

/// Stringify a JSON value the way a form input would show it.
/// `null` becomes an empty string and integral floats drop their fraction.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Field of a row as text, missing fields read as empty
pub fn field_text(row: &Value, key: &str) -> String {
    row.get(key).map(value_text).unwrap_or_default()
}

/// Loose truthiness: false, 0, "", null and missing are false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First field in `fields` holding a truthy value, as text
pub fn first_present(row: &Value, fields: &[String]) -> Option<String> {
    fields
        .iter()
        .filter_map(|f| row.get(f))
        .find(|v| truthy(v))
        .map(value_text)
}

/// Record id as text (ids may be numbers or strings)
pub fn row_id(row: &Value) -> Option<String> {
    row.get("id")
        .filter(|v| !v.is_null())
        .map(value_text)
        .filter(|s| !s.is_empty())
}

/// Option label of a lookup row, falling back to its id
pub fn lookup_label(row: &Value, label_fields: &[String]) -> String {
    first_present(row, label_fields).unwrap_or_else(|| field_text(row, "id"))
}

/// Find a lookup row by id, comparing ids as text
pub fn find_by_id<'a>(rows: &'a [Value], id: &str) -> Option<&'a Value> {
    rows.iter().find(|r| field_text(r, "id") == id)
}

impl ResourceDef {
    /// Human title of a row: first non-empty title field, else the id
    pub fn row_title(&self, row: &Value) -> String {
        first_present(row, &self.title_fields).unwrap_or_else(|| field_text(row, "id"))
    }
}

/// Render one table cell
pub fn render_cell(column: &ColumnDef, row: &Value, lookups: &Lookups) -> String {
    match &column.render {
        CellRender::Plain => field_text(row, &column.key),
        CellRender::YesNo => {
            let on = row.get(&column.key).is_some_and(truthy);
            let text = if on { "Yes" } else { "No" };
            text.to_string()
        }
        CellRender::Lookup {
            lookup,
            label_fields,
        } => {
            let id = field_text(row, &column.key);
            lookups
                .get(lookup)
                .and_then(|rows| find_by_id(rows, &id))
                .and_then(|found| first_present(found, label_fields))
                .unwrap_or(id)
        }
        CellRender::Media { title_field } => {
            let has_media = !field_text(row, &column.key).trim().is_empty();
            let marker = if has_media { MEDIA_MARKER } else { " " };
            match title_field {
                Some(field) => format!("{} {}", marker, field_text(row, field)),
                None if has_media => marker.to_string(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::get_resource;
    use serde_json::json;

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&Value::Null), "");
        assert_eq!(value_text(&json!(1983)), "1983");
        assert_eq!(value_text(&json!(1983.0)), "1983");
        assert_eq!(value_text(&json!(8.5)), "8.5");
        assert_eq!(value_text(&json!(true)), "true");
        assert_eq!(value_text(&json!("x")), "x");
    }

    #[test]
    fn test_truthy() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(false)));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!(2)));
        assert!(truthy(&json!([])));
    }

    #[test]
    fn test_row_title_fallback_chain() {
        let category = get_resource("category").unwrap();
        assert_eq!(
            category.row_title(&json!({"id": 3, "name_uz": "Komediya", "slug": "komediya"})),
            "Komediya"
        );
        assert_eq!(
            category.row_title(&json!({"id": 3, "name_uz": "", "slug": "komediya"})),
            "komediya"
        );
        assert_eq!(category.row_title(&json!({"id": 3})), "3");

        let link = get_resource("movie_genre").unwrap();
        assert_eq!(link.row_title(&json!({"id": "abc", "movie_id": 1})), "abc");
    }

    #[test]
    fn test_lookup_column_resolves_label() {
        let def = get_resource("movie_actor").unwrap();
        let mut lookups = Lookups::new();
        lookups.insert(
            "movies".into(),
            vec![json!({"id": 7, "title_uz": "", "title_en": "Heat"})],
        );
        let row = json!({"id": 1, "movie_id": 7, "actor_id": 9, "role": "Lead"});

        assert_eq!(render_cell(&def.columns[0], &row, &lookups), "Heat");
        // actors lookup not loaded yet: raw id
        assert_eq!(render_cell(&def.columns[1], &row, &lookups), "9");
    }

    #[test]
    fn test_yes_no_and_media_cells() {
        let genre = get_resource("genre").unwrap();
        let active = genre.columns.iter().find(|c| c.key == "is_active").unwrap();
        assert_eq!(render_cell(active, &json!({"is_active": true}), &Lookups::new()), "Yes");
        assert_eq!(render_cell(active, &json!({}), &Lookups::new()), "No");

        let actor = get_resource("actor").unwrap();
        let photo = &actor.columns[0];
        let row = json!({"photo_url": "https://x/y.jpg", "full_name": "Jane"});
        assert_eq!(render_cell(photo, &row, &Lookups::new()), "▣ Jane");
    }
}
