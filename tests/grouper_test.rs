use std::collections::BTreeSet;

use mytracks::{
    drivers::dedup::plan,
    matching::{DuplicateGroup, KeepRule, QualityTier, TrackDescriptor, duplicate_groups, group, group_with},
};

fn track(id: &str, title: &str, artist: &str, quality: Option<QualityTier>) -> TrackDescriptor {
    TrackDescriptor::new(id, title, artist).with_quality(quality)
}

/// Groups as sets of source ids, independent of order and keep choice.
fn partition(entries: &[TrackDescriptor]) -> BTreeSet<BTreeSet<String>> {
    group(entries)
        .iter()
        .map(|g| {
            g.members()
                .into_iter()
                .map(|i| entries[i].source_id().to_string())
                .collect()
        })
        .collect()
}

#[test]
fn test_higher_quality_is_kept() {
    let entries = vec![
        track("1", "T", "A", Some(QualityTier::Low)),
        track("2", "T", "A", Some(QualityTier::HiRes)),
        track("3", "U", "B", Some(QualityTier::Low)),
    ];

    assert_eq!(
        group(&entries),
        vec![
            DuplicateGroup { keep: 1, remove: vec![0] },
            DuplicateGroup { keep: 2, remove: vec![] },
        ]
    );
}

#[test]
fn test_earliest_position_breaks_quality_ties() {
    let entries = vec![
        track("1", "Song", "Band", None),
        track("2", "Song", "Band", Some(QualityTier::Lossless)),
        track("3", "Song (Remastered)", "Band", Some(QualityTier::Lossless)),
    ];

    assert_eq!(group(&entries), vec![DuplicateGroup { keep: 1, remove: vec![0, 2] }]);
}

#[test]
fn test_unknown_quality_ranks_lowest() {
    let entries = vec![
        track("1", "Song", "Band", None),
        track("2", "Song", "Band", Some(QualityTier::Low)),
    ];
    assert_eq!(group(&entries)[0].keep, 1);
}

#[test]
fn test_chained_matches_form_one_group() {
    // 1 ~ 2 and 2 ~ 3 through the shared credit, but 1 !~ 3
    let entries = vec![
        track("1", "Song", "A", None),
        track("2", "Song", "A, B", None),
        track("3", "Song", "B", None),
    ];
    assert!(!mytracks::matching::matches(&entries[0], &entries[2]));

    let groups = group(&entries);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[0].keep, 0);
}

#[test]
fn test_partition_does_not_depend_on_order() {
    let entries = vec![
        track("1", "Song", "A", None),
        track("2", "Other", "C", None),
        track("3", "Song", "A, B", None),
        track("4", "Song (Live)", "B", None),
        track("5", "Other - 2011 Remaster", "C", None),
        track("6", "", "C", None),
    ];
    let mut reversed = entries.clone();
    reversed.reverse();
    let mut rotated = entries.clone();
    rotated.rotate_left(2);

    assert_eq!(partition(&entries), partition(&reversed));
    assert_eq!(partition(&entries), partition(&rotated));
}

#[test]
fn test_malformed_entries_are_singletons() {
    let entries = vec![
        track("1", "", "A", None),
        track("2", "", "A", None),
        track("3", "Song", "", None),
    ];
    let groups = group(&entries);
    assert_eq!(groups.len(), 3);
    assert!(groups.iter().all(|g| !g.is_duplicate()));
    assert!(duplicate_groups(&entries, KeepRule::default()).is_empty());
}

#[test]
fn test_every_entry_appears_in_exactly_one_group() {
    let entries = vec![
        track("1", "Song", "A", None),
        track("2", "Song", "A", None),
        track("3", "Tune", "B", None),
        track("4", "Song", "A", None),
    ];
    let mut seen: Vec<usize> = group(&entries).iter().flat_map(|g| g.members()).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[test]
fn test_version_rule_prefers_remaster_among_equal_quality() {
    let entries = vec![
        track("1", "Song", "Band", Some(QualityTier::Lossless)),
        track("2", "Song - 2015 Remaster", "Band", Some(QualityTier::Lossless)),
        track("3", "Song", "Band", Some(QualityTier::High)),
    ];

    assert_eq!(group_with(&entries, KeepRule::QualityThenPosition)[0].keep, 0);
    assert_eq!(group_with(&entries, KeepRule::QualityThenVersion)[0].keep, 1);
}

#[test]
fn test_dedup_plan_lists_tracks_to_remove() {
    let entries = vec![
        track("1", "Song", "Band", Some(QualityTier::High)),
        track("2", "Tune", "Band", None),
        track("3", "Song", "Band", Some(QualityTier::HiResLossless)),
        track("4", "Song (Live)", "Band", None),
    ];

    let planned = plan(&entries, KeepRule::default());
    assert_eq!(planned.groups.len(), 1);
    assert_eq!(planned.removal_count(), 2);
    assert_eq!(planned.groups[0].keep.source_id(), "3");

    let removed: Vec<&str> = planned.groups[0].remove.iter().map(|t| t.source_id()).collect();
    assert_eq!(removed, vec!["1", "4"]);
}

#[test]
fn test_distinct_parts_of_a_work_are_never_duplicates() {
    let entries = vec![
        track("1", "Shine On - Part 1 - 2011 Remaster", "Band", None),
        track("2", "Shine On - Part 2 - 2011 Remaster", "Band", None),
        track("3", "Shine On", "Band", None),
        track("4", "Symphony No. 5 - 2nd Movement", "Orchestra", None),
        track("5", "Symphony No. 5 - 3rd Movement", "Orchestra", None),
    ];

    assert!(duplicate_groups(&entries, KeepRule::default()).is_empty());
    assert_eq!(group(&entries).len(), entries.len());
}
