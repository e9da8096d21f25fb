//! # Matching Module
//!
//! Fuzzy track matching and duplicate detection shared by every command.
//!
//! - [`TrackDescriptor`] - immutable, normalized view of one song
//! - [`matches`] - same-song decision between two descriptors
//! - [`group`] / [`group_with`] - connected components of the match relation
//!   with one copy to keep per group
//! - [`QualityTier`] - ordered audio fidelity ranking
//! - [`VersionTraits`] - edition preferences used by [`KeepRule::QualityThenVersion`]
//!
//! Everything here is pure: no I/O, no errors. Malformed input (empty title or
//! artist) simply never matches.

mod descriptor;
mod grouper;
mod matcher;
pub mod normalize;
mod quality;
mod version;

pub use descriptor::TrackDescriptor;
pub use grouper::{DuplicateGroup, KeepRule, duplicate_groups, group, group_with};
pub use matcher::{Resolution, find_match, matches, resolve_match};
pub use normalize::{artist_tokens, normalize_text, normalize_title};
pub use quality::{QualityTier, tier_label};
pub use version::VersionTraits;
