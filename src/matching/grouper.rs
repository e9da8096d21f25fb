use std::{cmp::Ordering, collections::HashMap};

use super::{descriptor::TrackDescriptor, matcher::matches, version::VersionTraits};

/// How the copy to keep is chosen inside a group of duplicates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeepRule {
    /// Highest quality tier, then earliest position.
    #[default]
    QualityThenPosition,
    /// Highest quality tier, then the preferred edition (see [`VersionTraits`]),
    /// then earliest position.
    QualityThenVersion,
}

/// One connected component of the match relation.
///
/// Indices refer to positions in the slice passed to [`group`]. `remove` is in
/// ascending position order and never contains `keep`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub keep: usize,
    pub remove: Vec<usize>,
}

impl DuplicateGroup {
    pub fn len(&self) -> usize {
        self.remove.len() + 1
    }

    pub fn is_duplicate(&self) -> bool {
        !self.remove.is_empty()
    }

    /// All member positions in ascending order.
    pub fn members(&self) -> Vec<usize> {
        let mut members = self.remove.clone();
        members.push(self.keep);
        members.sort_unstable();
        members
    }
}

/// Partitions `entries` into groups of mutual duplicates using the default rule.
pub fn group(entries: &[TrackDescriptor]) -> Vec<DuplicateGroup> {
    group_with(entries, KeepRule::default())
}

/// Partitions `entries` into connected components of [`matches`].
///
/// Entries are first bucketed by normalized title, which every match
/// requires, and compared pairwise inside each bucket. Groups come out in the
/// order of their first member; singletons are included.
pub fn group_with(entries: &[TrackDescriptor], rule: KeepRule) -> Vec<DuplicateGroup> {
    let mut sets = DisjointSet::new(entries.len());

    let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        if entry.is_well_formed() {
            buckets.entry(entry.normalized_title()).or_default().push(idx);
        }
    }

    for bucket in buckets.values() {
        for (n, &i) in bucket.iter().enumerate() {
            for &j in &bucket[n + 1..] {
                if matches(&entries[i], &entries[j]) {
                    sets.union(i, j);
                }
            }
        }
    }

    let mut component_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for idx in 0..entries.len() {
        let root = sets.find(idx);
        let slot = *component_of_root.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(idx);
    }

    components
        .into_iter()
        .map(|members| {
            let keep = members
                .iter()
                .copied()
                .reduce(|best, candidate| {
                    if prefer(entries, rule, candidate, best) == Ordering::Greater {
                        candidate
                    } else {
                        best
                    }
                })
                .unwrap_or(members[0]);
            let remove = members.into_iter().filter(|&i| i != keep).collect();
            DuplicateGroup { keep, remove }
        })
        .collect()
}

/// Only the groups that actually contain duplicates.
pub fn duplicate_groups(entries: &[TrackDescriptor], rule: KeepRule) -> Vec<DuplicateGroup> {
    group_with(entries, rule)
        .into_iter()
        .filter(DuplicateGroup::is_duplicate)
        .collect()
}

/// `Greater` when position `a` should be kept over position `b`.
fn prefer(entries: &[TrackDescriptor], rule: KeepRule, a: usize, b: usize) -> Ordering {
    let (ta, tb) = (&entries[a], &entries[b]);
    let by_quality = ta.quality().cmp(&tb.quality());
    let by_version = match rule {
        KeepRule::QualityThenPosition => Ordering::Equal,
        KeepRule::QualityThenVersion => VersionTraits::of(ta).cmp(&VersionTraits::of(tb)),
    };

    by_quality.then(by_version).then(b.cmp(&a))
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            Ordering::Less => self.parent[ra] = rb,
            Ordering::Greater => self.parent[rb] = ra,
            Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::QualityTier;

    #[test]
    fn disjoint_set_joins_chains() {
        let mut sets = DisjointSet::new(4);
        sets.union(0, 1);
        sets.union(2, 1);
        assert_eq!(sets.find(0), sets.find(2));
        assert_ne!(sets.find(0), sets.find(3));
    }

    #[test]
    fn version_rule_breaks_quality_ties_before_position() {
        let entries = vec![
            TrackDescriptor::new("1", "Song", "Band").with_quality(Some(QualityTier::Lossless)),
            TrackDescriptor::new("2", "Song", "Band")
                .with_version("2015 Remaster")
                .with_quality(Some(QualityTier::Lossless)),
        ];

        assert_eq!(group_with(&entries, KeepRule::QualityThenPosition)[0].keep, 0);
        assert_eq!(group_with(&entries, KeepRule::QualityThenVersion)[0].keep, 1);
    }

    #[test]
    fn members_are_sorted_and_include_keep() {
        let g = DuplicateGroup {
            keep: 3,
            remove: vec![1, 5],
        };
        assert_eq!(g.members(), vec![1, 3, 5]);
        assert_eq!(g.len(), 3);
        assert!(g.is_duplicate());
    }
}
