//! Property tests: a migration set is accepted iff its versions are exactly
//! 1..=n in order.

use guardian_storage::migrations::{MigrationDefinition, MigrationTarget};
use guardian_storage::MigrationSet;
use proptest::prelude::*;

fn select_one(target: &MigrationTarget<'_>) -> Vec<String> {
    vec![format!("SELECT 1 FROM {}", target.table_ref())]
}

fn set_of(versions: &[u32]) -> Vec<MigrationDefinition> {
    versions
        .iter()
        .map(|v| MigrationDefinition::new(*v, "step", select_one))
        .collect()
}

proptest! {
    #[test]
    fn contiguous_sets_are_accepted(n in 1u32..40) {
        let versions: Vec<u32> = (1..=n).collect();
        let set = MigrationSet::new(set_of(&versions)).unwrap();
        prop_assert_eq!(set.highest_version(), n);
        prop_assert_eq!(set.len(), n as usize);
    }

    #[test]
    fn acceptance_matches_contiguity(versions in prop::collection::vec(1u32..12, 0..10)) {
        let contiguous = !versions.is_empty()
            && versions.iter().enumerate().all(|(i, v)| *v == i as u32 + 1);
        let result = MigrationSet::new(set_of(&versions));
        prop_assert_eq!(result.is_ok(), contiguous, "versions {:?}", versions);
    }

    #[test]
    fn removing_any_version_is_rejected(n in 2u32..20, drop_idx in 0usize..19) {
        let mut versions: Vec<u32> = (1..=n).collect();
        let idx = drop_idx % versions.len();
        versions.remove(idx);
        // Dropping the last version leaves a valid shorter set.
        let expect_ok = idx == versions.len();
        prop_assert_eq!(MigrationSet::new(set_of(&versions)).is_ok(), expect_ok);
    }
}
