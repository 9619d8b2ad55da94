//! Form state and the pure transforms between rows, forms and payloads

use super::cell::{field_text, lookup_label, truthy, value_text, Lookups};
use super::registry::{FieldDef, FieldKind, ResourceDef};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Value held by one form input
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

/// Editable copy of a record while the modal is open
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: BTreeMap<String, FieldValue>,
    /// While set, editing the slug source re-derives the slug
    pub auto_slug: bool,
}

impl FormState {
    pub fn text(&self, name: &str) -> &str {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(FieldValue::Flag(true)))
    }
}

/// Required fields missing from a payload
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("Required: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

/// Lowercase, trim, drop anything that is not an ASCII word character,
/// whitespace or `-`, then join words with single dashes.
pub fn to_slug(input: &str) -> String {
    let kept: String = input
        .to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut pending_dash = false;
    for c in kept.chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
            continue;
        }
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        slug.push(c);
    }
    if pending_dash {
        slug.push('-');
    }
    slug
}

/// Parse the text of a number input. Empty means zero; garbage also becomes
/// zero and is logged.
fn coerce_number(field: &str, raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::from(0);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                Value::from(f as i64)
            } else {
                Number::from_f64(f).map(Value::Number).unwrap_or(Value::from(0))
            }
        }
        _ => {
            tracing::warn!("Field '{}': '{}' is not a number, sending 0", field, trimmed);
            Value::from(0)
        }
    }
}

/// One rendered input of the modal form
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub name: String,
    /// Label with a trailing `*` for required fields
    pub label: String,
    pub kind: InputKind,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    Text { value: String, multiline: bool },
    Number { value: String },
    Toggle { on: bool },
    Select {
        options: Vec<SelectOption>,
        selected: Option<usize>,
        /// Raw stored id (shown when it matches no option)
        value: String,
    },
    Slug { value: String, auto: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
}

fn empty_value(field: &FieldDef) -> FieldValue {
    match field.kind {
        FieldKind::Toggle => FieldValue::Flag(field.empty.as_ref().is_some_and(truthy)),
        _ => FieldValue::Text(field.empty.as_ref().map(value_text).unwrap_or_default()),
    }
}

fn select_options(lookups: &Lookups, lookup: &str, label_fields: &[String]) -> Vec<SelectOption> {
    lookups
        .get(lookup)
        .map(|rows| {
            rows.iter()
                .map(|row| SelectOption {
                    id: field_text(row, "id"),
                    label: lookup_label(row, label_fields),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl ResourceDef {
    /// Fresh form for the create flow
    pub fn make_empty(&self) -> FormState {
        FormState {
            values: self
                .fields
                .iter()
                .map(|f| (f.name.clone(), empty_value(f)))
                .collect(),
            auto_slug: true,
        }
    }

    /// Form seeded from an existing row for the edit flow
    pub fn make_from_row(&self, row: &Value) -> FormState {
        let values = self
            .fields
            .iter()
            .map(|f| {
                // A null toggle reads as off, like the table shows it
                let value = match row.get(&f.name) {
                    None => empty_value(f),
                    Some(v) if f.kind == FieldKind::Toggle => FieldValue::Flag(truthy(v)),
                    Some(Value::Null) => empty_value(f),
                    Some(v) => FieldValue::Text(value_text(v)),
                };
                (f.name.clone(), value)
            })
            .collect();
        FormState {
            values,
            auto_slug: false,
        }
    }

    /// Coerce a form into the JSON object sent to the backend
    pub fn to_payload(&self, form: &FormState) -> Map<String, Value> {
        let mut payload = Map::new();
        for field in &self.fields {
            let current = form
                .values
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| empty_value(field));
            let value = match (&field.kind, current) {
                (FieldKind::Number, FieldValue::Text(s)) => coerce_number(&field.name, &s),
                (FieldKind::Number, FieldValue::Flag(b)) => Value::from(u8::from(b)),
                (FieldKind::Toggle, FieldValue::Flag(b)) => Value::Bool(b),
                (FieldKind::Toggle, FieldValue::Text(s)) => Value::Bool(!s.is_empty()),
                (_, FieldValue::Text(s)) => Value::String(s.trim().to_string()),
                (_, FieldValue::Flag(b)) => Value::String(b.to_string()),
            };
            payload.insert(field.name.clone(), value);
        }
        payload
    }

    /// Required fields that are missing, null or blank, in declaration order
    pub fn missing_required(&self, payload: &Map<String, Value>) -> Vec<String> {
        self.required_fields
            .iter()
            .filter(|name| match payload.get(name.as_str()) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .cloned()
            .collect()
    }

    pub fn validate(&self, payload: &Map<String, Value>) -> Result<(), ValidationError> {
        let missing = self.missing_required(payload);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Inputs to render for the current form, options resolved from lookups
    pub fn form_inputs(&self, form: &FormState, lookups: &Lookups) -> Vec<FormInput> {
        self.fields
            .iter()
            .map(|field| {
                let kind = match &field.kind {
                    FieldKind::Text => InputKind::Text {
                        value: form.text(&field.name).to_string(),
                        multiline: false,
                    },
                    FieldKind::Textarea => InputKind::Text {
                        value: form.text(&field.name).to_string(),
                        multiline: true,
                    },
                    FieldKind::Number => InputKind::Number {
                        value: form.text(&field.name).to_string(),
                    },
                    FieldKind::Toggle => InputKind::Toggle {
                        on: form.flag(&field.name),
                    },
                    FieldKind::Select {
                        lookup,
                        label_fields,
                    } => {
                        let value = form.text(&field.name).to_string();
                        let options = select_options(lookups, lookup, label_fields);
                        let selected = options.iter().position(|o| o.id == value);
                        InputKind::Select {
                            options,
                            selected,
                            value,
                        }
                    }
                    FieldKind::Slug { .. } => InputKind::Slug {
                        value: form.text(&field.name).to_string(),
                        auto: form.auto_slug,
                    },
                };
                let label = if self.is_required(&field.name) {
                    format!("{} *", field.label)
                } else {
                    field.label.clone()
                };
                FormInput {
                    name: field.name.clone(),
                    label,
                    kind,
                    placeholder: field.placeholder.clone(),
                }
            })
            .collect()
    }

    /// Replace the text of a field. Slug fields store the slugified input and
    /// stop following their source; source fields drive the slug while
    /// `auto_slug` is on.
    pub fn edit_text(&self, form: &mut FormState, name: &str, input: String) {
        let Some(field) = self.field(name) else {
            return;
        };
        match &field.kind {
            FieldKind::Toggle => {}
            FieldKind::Slug { .. } => {
                form.values
                    .insert(name.to_string(), FieldValue::Text(to_slug(&input)));
                form.auto_slug = false;
            }
            _ => {
                if form.auto_slug {
                    for slug_field in self.slug_fields_for(name) {
                        form.values
                            .insert(slug_field.name.clone(), FieldValue::Text(to_slug(&input)));
                    }
                }
                form.values.insert(name.to_string(), FieldValue::Text(input));
            }
        }
    }

    pub fn toggle(&self, form: &mut FormState, name: &str) {
        if self.field(name).is_some_and(|f| f.kind == FieldKind::Toggle) {
            let on = form.flag(name);
            form.values.insert(name.to_string(), FieldValue::Flag(!on));
        }
    }

    /// Move a select field to the next (or previous) lookup option
    pub fn cycle_option(&self, form: &mut FormState, name: &str, lookups: &Lookups, forward: bool) {
        let Some(FieldKind::Select {
            lookup,
            label_fields,
        }) = self.field(name).map(|f| &f.kind)
        else {
            return;
        };
        let rows = lookups.get(lookup).map(Vec::as_slice).unwrap_or_default();
        if rows.is_empty() {
            return;
        }
        let current = form.text(name);
        let position = rows
            .iter()
            .position(|r| field_text(r, "id") == current);
        let next = match (position, forward) {
            (None, true) => 0,
            (None, false) => rows.len() - 1,
            (Some(i), true) => (i + 1) % rows.len(),
            (Some(i), false) => (i + rows.len() - 1) % rows.len(),
        };
        let id = field_text(&rows[next], "id");
        tracing::debug!(
            "{}: {} -> {} ({})",
            self.key,
            name,
            id,
            lookup_label(&rows[next], label_fields)
        );
        form.values.insert(name.to_string(), FieldValue::Text(id));
    }

    /// Turn auto-slug back on and re-derive every slug from its source
    pub fn reenable_auto_slug(&self, form: &mut FormState) {
        form.auto_slug = true;
        for field in &self.fields {
            if let FieldKind::Slug { source } = &field.kind {
                let derived = to_slug(form.text(source));
                form.values
                    .insert(field.name.clone(), FieldValue::Text(derived));
            }
        }
    }

    pub fn has_slug(&self) -> bool {
        self.fields
            .iter()
            .any(|f| matches!(f.kind, FieldKind::Slug { .. }))
    }

    fn slug_fields_for<'a>(&'a self, source_name: &'a str) -> impl Iterator<Item = &'a FieldDef> + 'a {
        self.fields.iter().filter(move |f| {
            matches!(&f.kind, FieldKind::Slug { source } if source == source_name)
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{get_all_resource_keys, get_resource};
    use serde_json::json;

    #[test]
    fn test_to_slug() {
        assert_eq!(to_slug("Vizzini's Revenge!"), "vizzinis-revenge");
        assert_eq!(to_slug("  Hello   World  "), "hello-world");
        assert_eq!(to_slug("a - - b"), "a-b");
        assert_eq!(to_slug("Комедия"), "");
        assert_eq!(to_slug("snake_case--ok"), "snake_case-ok");
    }

    #[test]
    fn test_actor_empty_payload() {
        let actor = get_resource("actor").unwrap();
        let mut form = actor.make_empty();
        actor.edit_text(&mut form, "full_name", "Jane Doe".into());

        let payload = actor.to_payload(&form);
        assert_eq!(
            Value::Object(payload),
            json!({
                "full_name": "Jane Doe",
                "photo_url": "",
                "birth_year": 0,
                "biography": "",
                "country": "",
            })
        );
    }

    #[test]
    fn test_category_empty_defaults() {
        let category = get_resource("category").unwrap();
        let form = category.make_empty();
        assert!(form.auto_slug);
        assert!(form.flag("is_active"));
        assert_eq!(form.text("order_number"), "0");
    }

    #[test]
    fn test_required_gating_lists_missing_in_order() {
        let category = get_resource("category").unwrap();
        let payload = category.to_payload(&category.make_empty());
        let err = category.validate(&payload).unwrap_err();
        assert_eq!(err.missing, vec!["name_uz", "slug"]);
        assert_eq!(err.to_string(), "Required: name_uz, slug");
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let actor = get_resource("actor").unwrap();
        let mut form = actor.make_empty();
        actor.edit_text(&mut form, "full_name", "   ".into());
        assert_eq!(actor.missing_required(&actor.to_payload(&form)), vec!["full_name"]);
    }

    #[test]
    fn test_auto_slug_follows_source_until_manual_edit() {
        let category = get_resource("category").unwrap();
        let mut form = category.make_empty();

        category.edit_text(&mut form, "name_uz", "Vizzini's Revenge!".into());
        assert_eq!(form.text("slug"), "vizzinis-revenge");

        category.edit_text(&mut form, "slug", "My Slug".into());
        assert_eq!(form.text("slug"), "my-slug");
        assert!(!form.auto_slug);

        category.edit_text(&mut form, "name_uz", "Something Else".into());
        assert_eq!(form.text("slug"), "my-slug");

        category.reenable_auto_slug(&mut form);
        assert_eq!(form.text("slug"), "something-else");
    }

    #[test]
    fn test_edit_form_starts_without_auto_slug() {
        let genre = get_resource("genre").unwrap();
        let row = json!({"id": 4, "name_uz": "Drama", "slug": "drama-x", "is_active": false});
        let mut form = genre.make_from_row(&row);
        assert!(!form.auto_slug);
        assert!(!form.flag("is_active"));

        genre.edit_text(&mut form, "name_uz", "Dramalar".into());
        assert_eq!(form.text("slug"), "drama-x");
    }

    #[test]
    fn test_null_toggle_is_seeded_off() {
        let category = get_resource("category").unwrap();
        let form = category.make_from_row(&json!({"id": 1, "is_active": null}));
        assert!(!form.flag("is_active"));
        assert_eq!(category.to_payload(&form)["is_active"], json!(false));

        // a missing key still takes the create default
        let form = category.make_from_row(&json!({"id": 1}));
        assert!(form.flag("is_active"));
    }

    #[test]
    fn test_every_descriptor_round_trips_and_gates() {
        for key in get_all_resource_keys() {
            let def = get_resource(&key).unwrap();
            let empty = def.to_payload(&def.make_empty());
            let from_bare_row = def.to_payload(&def.make_from_row(&json!({"id": 1})));
            assert_eq!(from_bare_row, empty, "{}: bare row differs from empty form", key);

            let reloaded = def.to_payload(&def.make_from_row(&Value::Object(empty.clone())));
            assert_eq!(reloaded, empty, "{}: payload not stable through a row", key);

            let mut blanked = empty.clone();
            for name in &def.required_fields {
                blanked.insert(name.clone(), json!("   "));
            }
            assert_eq!(
                def.missing_required(&blanked),
                def.required_fields,
                "{}: blank required fields not all reported",
                key
            );
        }
    }

    #[test]
    fn test_number_coercion() {
        let movie = get_resource("movie").unwrap();
        let mut form = movie.make_empty();
        movie.edit_text(&mut form, "title_uz", "Kino".into());
        movie.edit_text(&mut form, "imdb_rating", " 8.5 ".into());
        movie.edit_text(&mut form, "release_year", "2014".into());
        movie.edit_text(&mut form, "duration_minutes", "abc".into());
        movie.edit_text(&mut form, "view_count", "".into());

        let payload = movie.to_payload(&form);
        assert_eq!(payload["imdb_rating"], json!(8.5));
        assert_eq!(payload["release_year"], json!(2014));
        assert_eq!(payload["duration_minutes"], json!(0));
        assert_eq!(payload["view_count"], json!(0));
        assert_eq!(payload["is_active"], json!(true));
        assert_eq!(payload["is_premium"], json!(false));
    }

    #[test]
    fn test_payload_is_idempotent_through_row() {
        let movie = get_resource("movie").unwrap();
        let row = json!({
            "id": 1, "title_uz": "  Kino ", "imdb_rating": 7.25, "release_year": 2001,
            "is_featured": 1, "country": null
        });
        let first = movie.to_payload(&movie.make_from_row(&row));
        let second = movie.to_payload(&movie.make_from_row(&Value::Object(first.clone())));
        assert_eq!(first, second);
        assert_eq!(first["title_uz"], json!("Kino"));
        assert_eq!(first["is_featured"], json!(true));
    }

    #[test]
    fn test_select_inputs_and_cycling() {
        let def = get_resource("movie_genre").unwrap();
        let mut lookups = Lookups::new();
        lookups.insert(
            "genres".into(),
            vec![
                json!({"id": 1, "name_uz": "Drama"}),
                json!({"id": 2, "name_uz": "", "slug": "komediya"}),
            ],
        );
        let mut form = def.make_empty();

        def.cycle_option(&mut form, "genre_id", &lookups, true);
        assert_eq!(form.text("genre_id"), "1");
        def.cycle_option(&mut form, "genre_id", &lookups, true);
        assert_eq!(form.text("genre_id"), "2");
        def.cycle_option(&mut form, "genre_id", &lookups, true);
        assert_eq!(form.text("genre_id"), "1");
        // movies not loaded: nothing to pick
        def.cycle_option(&mut form, "movie_id", &lookups, true);
        assert_eq!(form.text("movie_id"), "");

        let inputs = def.form_inputs(&form, &lookups);
        assert_eq!(inputs[1].label, "Genre *");
        match &inputs[1].kind {
            InputKind::Select {
                options, selected, ..
            } => {
                assert_eq!(options[1].label, "komediya");
                assert_eq!(*selected, Some(0));
            }
            other => panic!("unexpected input {:?}", other),
        }
    }

    #[test]
    fn test_toggle_flips_only_toggles() {
        let genre = get_resource("genre").unwrap();
        let mut form = genre.make_empty();
        genre.toggle(&mut form, "is_active");
        assert!(!form.flag("is_active"));
        genre.toggle(&mut form, "name_uz");
        assert_eq!(form.text("name_uz"), "");
    }
}
