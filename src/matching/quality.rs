use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse ranking of the audio fidelity a track is offered in.
///
/// The variant order is the ranking order, so tiers compare with `<` and `>`.
/// An unknown tier is modelled as `Option::None`, which `Option`'s ordering
/// already places below every known tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualityTier {
    /// 96 kbps AAC
    Low,
    /// 320 kbps AAC
    High,
    /// FLAC 16-bit/44.1kHz
    Lossless,
    /// MQA
    HiRes,
    /// FLAC up to 24-bit/192kHz
    HiResLossless,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::HiResLossless,
        QualityTier::HiRes,
        QualityTier::Lossless,
        QualityTier::High,
        QualityTier::Low,
    ];

    /// Parses the `audioQuality` value reported by the service.
    ///
    /// Matching is case-insensitive. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(QualityTier::Low),
            "HIGH" => Some(QualityTier::High),
            "LOSSLESS" => Some(QualityTier::Lossless),
            "HI_RES" => Some(QualityTier::HiRes),
            "HI_RES_LOSSLESS" => Some(QualityTier::HiResLossless),
            _ => None,
        }
    }

    /// Best tier advertised through `mediaMetadata.tags`.
    pub fn from_media_tags<S: AsRef<str>>(tags: &[S]) -> Option<Self> {
        tags.iter()
            .filter_map(|tag| match tag.as_ref().to_ascii_uppercase().as_str() {
                "HIRES_LOSSLESS" | "HI_RES_LOSSLESS" => Some(QualityTier::HiResLossless),
                "MQA" | "HI_RES" => Some(QualityTier::HiRes),
                "LOSSLESS" => Some(QualityTier::Lossless),
                _ => None,
            })
            .max()
    }

    /// Wire name, as the service spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Low => "LOW",
            QualityTier::High => "HIGH",
            QualityTier::Lossless => "LOSSLESS",
            QualityTier::HiRes => "HI_RES",
            QualityTier::HiResLossless => "HI_RES_LOSSLESS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Low => "Low (96kbps)",
            QualityTier::High => "High (320kbps)",
            QualityTier::Lossless => "Lossless (FLAC)",
            QualityTier::HiRes => "Hi-Res (MQA)",
            QualityTier::HiResLossless => "Hi-Res Lossless",
        }
    }

    /// Top tiers have nothing better to be upgraded to.
    pub fn is_top(&self) -> bool {
        matches!(self, QualityTier::HiRes | QualityTier::HiResLossless)
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for an optional tier, `"Unknown"` when absent.
pub fn tier_label(tier: Option<QualityTier>) -> &'static str {
    tier.map(|t| t.label()).unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_fidelity() {
        assert!(QualityTier::Low < QualityTier::High);
        assert!(QualityTier::High < QualityTier::Lossless);
        assert!(QualityTier::Lossless < QualityTier::HiRes);
        assert!(QualityTier::HiRes < QualityTier::HiResLossless);
        assert!(None < Some(QualityTier::Low));
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(QualityTier::parse("lossless"), Some(QualityTier::Lossless));
        assert_eq!(
            QualityTier::parse(" HI_RES_LOSSLESS "),
            Some(QualityTier::HiResLossless)
        );
        assert_eq!(QualityTier::parse("DOLBY_ATMOS"), None);
        assert_eq!(QualityTier::parse(""), None);
    }

    #[test]
    fn media_tags_pick_the_best_advertised_tier() {
        let tags = ["LOSSLESS", "HIRES_LOSSLESS", "DOLBY_ATMOS"];
        assert_eq!(
            QualityTier::from_media_tags(&tags),
            Some(QualityTier::HiResLossless)
        );
        let none: [&str; 0] = [];
        assert_eq!(QualityTier::from_media_tags(&none), None);
    }

    #[test]
    fn only_hi_res_tiers_are_top() {
        assert!(QualityTier::HiRes.is_top());
        assert!(QualityTier::HiResLossless.is_top());
        assert!(!QualityTier::Lossless.is_top());
        assert_eq!(tier_label(None), "Unknown");
    }
}
