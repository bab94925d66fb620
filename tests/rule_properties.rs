use bulk_rename::engine::compute_renames;
use bulk_rename::entry::FileEntry;
use bulk_rename::rules::{CaseMode, RuleFields, RuleSet};
use proptest::prelude::*;

fn entries(stems: &[String], extension: &str) -> Vec<FileEntry> {
    stems
        .iter()
        .map(|stem| FileEntry::new(&format!("{stem}{extension}")))
        .collect()
}

fn case_mode() -> impl Strategy<Value = Option<CaseMode>> {
    prop_oneof![
        Just(None),
        Just(Some(CaseMode::Upper)),
        Just(Some(CaseMode::Lower)),
        Just(Some(CaseMode::Title)),
        Just(Some(CaseMode::Sentence)),
    ]
}

proptest! {
    #[test]
    fn test_no_rules_is_identity(stems in proptest::collection::vec("[a-zA-Z0-9 _-]{1,12}", 0..8)) {
        let batch = entries(&stems, ".txt");
        let plan = compute_renames(&batch, &RuleSet::default()).unwrap();

        prop_assert_eq!(plan.len(), batch.len());
        for planned in plan.renames() {
            prop_assert_eq!(&planned.new_stem, &planned.original_stem);
        }
    }

    #[test]
    fn test_extension_never_changes(
        stem in "[a-zA-Z0-9_]{1,12}",
        extension in "\\.[a-z0-9]{1,4}",
        case in case_mode(),
        prefix in "[a-z]{0,3}",
        remove_last in 0usize..20,
    ) {
        let fields = RuleFields {
            case,
            prefix,
            remove_last,
            number_suffix: true,
            ..Default::default()
        };
        let rules = RuleSet::from_fields(&fields).unwrap();
        let batch = vec![FileEntry::new(&format!("{stem}{extension}"))];
        let plan = compute_renames(&batch, &rules).unwrap();

        let planned = &plan.renames()[0];
        prop_assert_eq!(&planned.extension, &extension);
        prop_assert!(planned.new_name().ends_with(&extension));
    }

    #[test]
    fn test_counter_advances_by_increment(
        count in 1usize..10,
        start in 0u64..1000,
        increment in 1u64..50,
        prefix in any::<bool>(),
        suffix in any::<bool>(),
        insert in any::<bool>(),
    ) {
        let fields = RuleFields {
            name: "n".to_string(),
            number_prefix: prefix,
            number_suffix: suffix,
            number_insert: insert,
            number_position: 1,
            number_start: start,
            number_increment: increment,
            number_separator: "~".to_string(),
            ..Default::default()
        };
        let rules = RuleSet::from_fields(&fields).unwrap();
        let stems: Vec<String> = (0..count).map(|i| format!("f{i}")).collect();
        let plan = compute_renames(&entries(&stems, ".dat"), &rules).unwrap();

        for (i, planned) in plan.renames().iter().enumerate() {
            let expected = start + increment * i as u64;
            if prefix || suffix || insert {
                prop_assert!(
                    planned.new_stem.contains(&expected.to_string()),
                    "{} should contain {}", planned.new_stem, expected
                );
            } else {
                prop_assert_eq!(&planned.new_stem, "n");
            }
        }
    }

    #[test]
    fn test_remove_first_last_length(
        stem in "[a-z]{0,20}",
        first in 0usize..25,
        last in 0usize..25,
    ) {
        let fields = RuleFields {
            remove_first: first,
            remove_last: last,
            ..Default::default()
        };
        let rules = RuleSet::from_fields(&fields).unwrap();
        let plan = compute_renames(&[FileEntry::new(&stem)], &rules).unwrap();

        let expected = stem.len().saturating_sub(first + last);
        prop_assert_eq!(plan.renames()[0].new_stem.len(), expected);
    }

    #[test]
    fn test_compute_is_repeatable(
        stems in proptest::collection::vec("[a-z]{1,8}", 1..6),
        start in 0u64..100,
    ) {
        let fields = RuleFields {
            number_prefix: true,
            number_start: start,
            number_pad: 3,
            ..Default::default()
        };
        let rules = RuleSet::from_fields(&fields).unwrap();
        let batch = entries(&stems, ".md");
        prop_assert_eq!(
            compute_renames(&batch, &rules).unwrap(),
            compute_renames(&batch, &rules).unwrap()
        );
    }
}
