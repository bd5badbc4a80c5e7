//! Property tests for table identifier parsing.

use guardian_core::models::TableName;
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,24}"
}

proptest! {
    #[test]
    fn valid_three_part_names_round_trip(c in segment(), s in segment(), t in segment()) {
        let identifier = format!("{c}.{s}.{t}");
        let parsed = TableName::parse(&identifier, "main").unwrap();
        prop_assert_eq!(parsed.to_string(), identifier);
    }

    #[test]
    fn two_part_names_use_default_catalog(s in segment(), t in segment(), d in segment()) {
        let parsed = TableName::parse(&format!("{s}.{t}"), &d).unwrap();
        prop_assert_eq!(parsed.catalog, d);
    }

    #[test]
    fn segments_with_quote_characters_are_rejected(
        s in segment(),
        t in segment(),
        bad in prop::sample::select(vec!['`', '"', '\'', ';', '/', '*', '(']),
    ) {
        let identifier = format!("main.{s}.{t}{bad}");
        prop_assert!(TableName::parse(&identifier, "main").is_err());
    }

    #[test]
    fn wrong_segment_counts_are_rejected(parts in prop::collection::vec(segment(), 4..8)) {
        prop_assert!(TableName::parse(&parts.join("."), "main").is_err());
    }
}
