//! Property-based tests for tag normalisation.
//!
//! # Invariants tested
//!
//! - **Totality:** height parsing accepts every string and yields a finite,
//!   non-negative value.
//! - **Unit tolerance:** a metre value reads the same with or without an `m`
//!   suffix or trailing words.
//! - **Building gate:** ways without a `building` tag never qualify,
//!   whatever their levels or height.
//! - **Address trimming:** formatted addresses never start or end with
//!   whitespace.

use proptest::prelude::*;
use skyline_core::{Tags, classify_way, format_address, parse_height};

fn tags(pairs: &[(&str, &str)]) -> Tags {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn height_parsing_is_total(raw in any::<String>()) {
        let height = parse_height(&raw);
        prop_assert!(height.is_finite());
        prop_assert!(height >= 0.0);
    }

    #[test]
    fn metre_suffix_and_trailing_words_are_ignored(
        whole in 0_u32..100_000,
        suffix in prop_oneof![Just(""), Just("m"), Just(" m"), Just(" metres tall")],
    ) {
        let expected = f64::from(whole);
        prop_assert_eq!(parse_height(&format!("{whole}{suffix}")), expected);
    }

    #[test]
    fn ways_without_building_tag_never_qualify(
        levels in any::<u32>(),
        height in 0_u32..10_000,
        name in "[A-Za-z ]{0,16}",
    ) {
        let levels = levels.to_string();
        let height = height.to_string();
        let way_tags = tags(&[
            ("building:levels", levels.as_str()),
            ("height", height.as_str()),
            ("name", name.as_str()),
        ]);
        prop_assert!(classify_way(&way_tags).is_none());
    }

    #[test]
    fn addresses_are_trimmed(
        number in "[ 0-9]{0,4}",
        street in "[ A-Za-z]{0,12}",
        city in "[ A-Za-z]{0,12}",
    ) {
        let address_tags = tags(&[
            ("addr:housenumber", number.as_str()),
            ("addr:street", street.as_str()),
            ("addr:city", city.as_str()),
        ]);
        let address = format_address(&address_tags);
        prop_assert_eq!(address.trim(), address.as_str());
    }
}
