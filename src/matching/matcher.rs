use super::descriptor::TrackDescriptor;

/// Decides whether two descriptors refer to the same song.
///
/// Titles must be equal after normalization. Artists must either normalize to
/// the same credit or one credit's names must be a subset of the other's, so
/// "Artist A" matches "Artist A, Artist B". Descriptors without a usable title
/// or artist never match, not even themselves.
///
/// The relation is symmetric but not transitive; grouping takes care of that.
pub fn matches(a: &TrackDescriptor, b: &TrackDescriptor) -> bool {
    if !a.is_well_formed() || !b.is_well_formed() {
        return false;
    }
    if a.normalized_title() != b.normalized_title() {
        return false;
    }

    a.normalized_artist() == b.normalized_artist()
        || a.artist_names().is_subset(b.artist_names())
        || b.artist_names().is_subset(a.artist_names())
}

/// First of `candidates` that matches `wanted`.
pub fn find_match<'a, I>(wanted: &TrackDescriptor, candidates: I) -> Option<&'a TrackDescriptor>
where
    I: IntoIterator<Item = &'a TrackDescriptor>,
{
    candidates.into_iter().find(|c| matches(wanted, c))
}

/// Result of looking a song up among search results.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Found(&'a TrackDescriptor),
    /// Several results match, each credited to a different artist set, and
    /// none is credited exactly like the wanted song.
    Ambiguous(usize),
    NotFound,
}

/// Picks the search result that is `wanted`.
///
/// An exact artist credit wins over a subset match; among equals the earliest
/// result wins.
pub fn resolve_match<'a>(wanted: &TrackDescriptor, candidates: &'a [TrackDescriptor]) -> Resolution<'a> {
    let matching: Vec<&TrackDescriptor> = candidates.iter().filter(|c| matches(wanted, c)).collect();
    let Some(first) = matching.first() else {
        return Resolution::NotFound;
    };

    if let Some(exact) = matching
        .iter()
        .find(|c| c.normalized_artist() == wanted.normalized_artist())
    {
        return Resolution::Found(exact);
    }

    let mut credits: Vec<&str> = matching.iter().map(|c| c.normalized_artist()).collect();
    credits.sort_unstable();
    credits.dedup();

    if credits.len() == 1 {
        Resolution::Found(first)
    } else {
        Resolution::Ambiguous(credits.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(title: &str, artist: &str) -> TrackDescriptor {
        TrackDescriptor::new("id", title, artist)
    }

    #[test]
    fn accented_and_plain_spellings_match() {
        assert!(matches(
            &track("Hoppípolla", "Sigur Rós"),
            &track("Hoppipolla", "Sigur Ros")
        ));
    }

    #[test]
    fn punctuation_variants_of_the_artist_match() {
        assert!(matches(&track("Thunderstruck", "AC/DC"), &track("Thunderstruck", "AC DC")));
    }

    #[test]
    fn featured_artist_in_credit_is_tolerated() {
        assert!(matches(
            &track("Get Lucky", "Daft Punk"),
            &track("Get Lucky (feat. Pharrell Williams)", "Daft Punk, Pharrell Williams")
        ));
    }

    #[test]
    fn different_artists_with_same_title_do_not_match() {
        assert!(!matches(&track("Hurt", "Nine Inch Nails"), &track("Hurt", "Johnny Cash")));
    }

    #[test]
    fn find_match_returns_first_confirmed_candidate() {
        let wanted = track("Song", "Band");
        let candidates = vec![
            TrackDescriptor::new("a", "Song 2", "Band"),
            TrackDescriptor::new("b", "Song (Live)", "Band"),
            TrackDescriptor::new("c", "Song", "Band"),
        ];
        let found = find_match(&wanted, &candidates).map(|d| d.source_id());
        assert_eq!(found, Some("b"));
    }

    #[test]
    fn exact_credit_wins_over_subset_match() {
        let wanted = track("Stay", "Rihanna");
        let results = vec![
            track("Stay", "Rihanna, Mikky Ekko"),
            track("Stay", "Rihanna"),
        ];
        assert_eq!(resolve_match(&wanted, &results), Resolution::Found(&results[1]));
    }

    #[test]
    fn different_collaborations_are_ambiguous() {
        let wanted = track("Stay", "Rihanna");
        let results = vec![
            track("Stay", "Rihanna, Mikky Ekko"),
            track("Stay", "Rihanna, Someone Else"),
            track("Stay Away", "Rihanna"),
        ];
        assert_eq!(resolve_match(&wanted, &results), Resolution::Ambiguous(2));
        assert_eq!(resolve_match(&track("Umbrella", "Rihanna"), &results), Resolution::NotFound);
    }
}
