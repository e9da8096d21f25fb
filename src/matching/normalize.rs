//! Text normalization used to compare titles and artist credits.
//!
//! Titles lose bracketed annotations ("(Remastered)", "[Live]", "(feat. X)"),
//! trailing dash suffixes made of edition noise ("- Remastered 2011",
//! "- Radio Edit") and unbracketed featured-artist tails. Artist credits are
//! split into individual names so "A" and "A, B" can be compared as sets.

use std::collections::BTreeSet;

use any_ascii::any_ascii_char;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Bracketed annotations: "(...)", "[...]", "{...}".
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)|\[[^\]]*\]|\{[^}]*\}").unwrap());

/// "Head - Tail" split at the last spaced dash.
static DASH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<head>.+)\s+[-–—]\s+(?P<tail>.+)$").unwrap());

/// Words that mark an edition of a recording rather than a different song.
static EDITION_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:",
        r"remaster(?:ed)?|digital remaster|anniversary|deluxe|bonus|",
        r"album version|single version|radio edit|explicit|clean|",
        r"live|acoustic|mono|stereo|revisited|expanded|special edition|",
        r"edition|version|\d+(?:st|nd|rd|th)\s+(?:anniversary|edition)",
        r")\b"
    ))
    .unwrap()
});

/// Featured artists without brackets: "Song feat. Someone".
static FEAT_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(?:feat\.?|ft\.?|featuring)\s+.+$").unwrap());

/// Separators between names inside one artist credit.
static ARTIST_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:[,&;/+×]|\s(?:x|and|with|vs\.?|feat\.?|ft\.?|featuring)\s)\s*")
        .unwrap()
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercases and removes Latin diacritics ("Beyoncé" → "beyonce").
///
/// Combining diacritical marks (U+0300..U+036F) are dropped after
/// compatibility decomposition, and Latin letters without a decomposition
/// ("ø", "æ", "ß", "ł", "đ") are transliterated. Other scripts keep their
/// characters.
pub fn fold(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text
        .nfkd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
    {
        if c.is_alphabetic() && ('\u{00C0}'..='\u{024F}').contains(&c) {
            folded.push_str(any_ascii_char(c));
        } else {
            folded.push(c);
        }
    }
    folded.to_lowercase()
}

/// Folds, replaces everything that is not a letter or digit with a space and
/// collapses whitespace.
pub fn normalize_text(text: &str) -> String {
    let folded: String = fold(text)
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    WHITESPACE.replace_all(folded.trim(), " ").trim().to_string()
}

/// Removes edition annotations from a raw title without normalizing it.
pub fn strip_annotations(title: &str) -> String {
    let without_brackets = BRACKETED.replace_all(title, " ");
    let mut stripped = without_brackets.trim().to_string();

    while let Some(caps) = DASH_SUFFIX.captures(&stripped) {
        let head = caps["head"].trim().to_string();
        if head.is_empty() || !EDITION_NOISE.is_match(&caps["tail"]) {
            break;
        }
        stripped = head;
    }

    FEAT_TAIL.replace(&stripped, "").trim().to_string()
}

/// Comparable form of a track title.
///
/// Falls back to the whole title when stripping annotations leaves nothing,
/// so a title like "[Untitled]" still compares by its own text.
pub fn normalize_title(title: &str) -> String {
    let stripped = normalize_text(&strip_annotations(title));
    if stripped.is_empty() {
        normalize_text(title)
    } else {
        stripped
    }
}

/// Comparable form of a whole artist credit, names kept in order.
pub fn normalize_artist(artist: &str) -> String {
    normalize_text(&BRACKETED.replace_all(artist, " "))
}

/// Individual normalized names inside an artist credit.
///
/// `"Daft Punk feat. Pharrell Williams & Nile Rodgers"` yields
/// `{"daft punk", "nile rodgers", "pharrell williams"}`.
pub fn artist_tokens(artist: &str) -> BTreeSet<String> {
    let folded = fold(&BRACKETED.replace_all(artist, " "));
    ARTIST_SEPARATOR
        .split(&folded)
        .map(normalize_text)
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_removes_latin_accents_and_case() {
        assert_eq!(fold("Beyoncé"), "beyonce");
        assert_eq!(fold("SIGUR RÓS"), "sigur ros");
        assert_eq!(fold("Motörhead"), "motorhead");
    }

    #[test]
    fn fold_transliterates_latin_letters_without_decomposition() {
        assert_eq!(fold("Røyksopp"), "royksopp");
        assert_eq!(fold("Ærø"), "aero");
        assert_eq!(fold("Straße"), "strasse");
        assert_eq!(fold("Łódź"), "lodz");
        assert_eq!(fold("Đorđe"), "dorde");
        assert_eq!(fold("Кино"), "кино");
        assert_eq!(fold("A × B"), "a × b");
    }

    #[test]
    fn normalize_text_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize_text("  Don't   Stop Me Now!! "), "don t stop me now");
        assert_eq!(normalize_text("AC/DC"), "ac dc");
        assert_eq!(normalize_text("..."), "");
    }

    #[test]
    fn titles_lose_bracketed_annotations() {
        assert_eq!(normalize_title("Song (Remastered)"), "song");
        assert_eq!(normalize_title("Song [Live at Wembley]"), "song");
        assert_eq!(normalize_title("Song (feat. Someone Else)"), "song");
        assert_eq!(
            normalize_title("(I Can't Get No) Satisfaction"),
            "satisfaction"
        );
    }

    #[test]
    fn titles_lose_noisy_dash_suffixes_only() {
        assert_eq!(normalize_title("Let It Be - Remastered 2009"), "let it be");
        assert_eq!(normalize_title("Hey Ya! - Radio Edit"), "hey ya");
        assert_eq!(
            normalize_title("Part One - The Beginning"),
            "part one the beginning"
        );
    }

    #[test]
    fn only_trailing_noisy_dash_segments_are_cut() {
        assert_eq!(
            normalize_title("Shine On - Part 1 - 2011 Remaster"),
            "shine on part 1"
        );
        assert_eq!(
            normalize_title("Song - Live - Remastered 2011"),
            "song"
        );
        assert_eq!(
            normalize_title("Symphony No. 5 - 2nd Movement"),
            "symphony no 5 2nd movement"
        );
        assert_eq!(
            normalize_title("Album Track - 25th Anniversary Edition"),
            "album track"
        );
    }

    #[test]
    fn titles_lose_unbracketed_featuring_tail() {
        assert_eq!(normalize_title("Get Lucky feat. Pharrell"), "get lucky");
        assert_eq!(normalize_title("Stay ft. Justin Bieber"), "stay");
    }

    #[test]
    fn fully_bracketed_title_falls_back_to_its_text() {
        assert_eq!(normalize_title("[Untitled]"), "untitled");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn artist_credit_splits_into_names() {
        let tokens = artist_tokens("Daft Punk feat. Pharrell Williams & Nile Rodgers");
        let expected: BTreeSet<String> = ["daft punk", "nile rodgers", "pharrell williams"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn artist_names_with_inner_words_are_not_split() {
        let tokens = artist_tokens("Xavier Rudd");
        assert_eq!(tokens.len(), 1);
        assert!(tokens.contains("xavier rudd"));
        assert!(artist_tokens("  ").is_empty());
    }
}
