//! Property-based tests using proptest
//!
//! These tests verify the filter, slug and payload logic using randomized
//! inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use tkino::resource::{filter_rows, get_resource, to_slug};

/// Generate arbitrary actor rows
fn arb_actor() -> impl Strategy<Value = Value> {
    (
        1u32..10_000,
        "[A-Za-z]{1,12}( [A-Za-z]{1,12})?", // full name
        prop_oneof!["USA", "Uzbekistan", "France", "Korea", ""],
        prop::option::of(1900u32..2020),
    )
        .prop_map(|(id, full_name, country, birth_year)| {
            json!({
                "id": id,
                "full_name": full_name,
                "country": country,
                "birth_year": birth_year,
            })
        })
}

fn arb_actor_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_actor(), 0..60)
}

fn actor_keys() -> Vec<String> {
    get_resource("actor").unwrap().search_keys.clone()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Blank queries keep every row in order
    #[test]
    fn prop_blank_query_matches_all(rows in arb_actor_list(), spaces in " {0,4}") {
        let matched = filter_rows(&rows, &actor_keys(), &spaces);
        prop_assert_eq!(matched, (0..rows.len()).collect::<Vec<_>>());
    }

    /// Results are strictly increasing indices into the input
    #[test]
    fn prop_filter_preserves_order(rows in arb_actor_list(), query in "[a-z]{0,3}") {
        let matched = filter_rows(&rows, &actor_keys(), &query);
        prop_assert!(matched.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(matched.iter().all(|&i| i < rows.len()));
    }

    /// Matching ignores case and surrounding whitespace
    #[test]
    fn prop_filter_is_case_insensitive(rows in arb_actor_list(), query in "[a-zA-Z]{1,4}") {
        let keys = actor_keys();
        let lower = filter_rows(&rows, &keys, &query.to_lowercase());
        let upper = filter_rows(&rows, &keys, &format!("  {}  ", query.to_uppercase()));
        prop_assert_eq!(lower, upper);
    }

    /// A longer query never matches more rows
    #[test]
    fn prop_longer_query_narrows(
        rows in arb_actor_list(),
        query in "[a-z]{1,3}",
        extra in "[a-z]{1,2}",
    ) {
        let keys = actor_keys();
        let wide = filter_rows(&rows, &keys, &query);
        let narrow = filter_rows(&rows, &keys, &format!("{}{}", query, extra));
        prop_assert!(narrow.iter().all(|i| wide.contains(i)));
    }

    /// Slugs only contain lowercase ASCII word characters and single dashes
    #[test]
    fn prop_slug_charset(input in "\\PC{0,40}") {
        let slug = to_slug(&input);
        prop_assert!(slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'));
        prop_assert!(!slug.contains("--"));
    }

    #[test]
    fn prop_slug_is_idempotent(input in "\\PC{0,40}") {
        let once = to_slug(&input);
        prop_assert_eq!(to_slug(&once), once);
    }

    /// Editing a record that was saved produces the same payload again
    #[test]
    fn prop_payload_survives_reload(
        name in "[A-Za-z][A-Za-z ]{0,20}",
        order in "[0-9]{0,5}",
        active in any::<bool>(),
    ) {
        let category = get_resource("category").unwrap();
        let mut form = category.make_empty();
        category.edit_text(&mut form, "name_uz", name);
        category.edit_text(&mut form, "order_number", order);
        if !active {
            category.toggle(&mut form, "is_active");
        }

        let payload = category.to_payload(&form);
        let reloaded = category.make_from_row(&Value::Object(payload.clone()));
        prop_assert_eq!(category.to_payload(&reloaded), payload);
    }
}
