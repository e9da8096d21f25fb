//! # Drivers
//!
//! The three library jobs, written against [`TrackCatalog`] so they run the
//! same against TIDAL and against in-memory fakes:
//!
//! - [`sync`] - add local songs to My Tracks
//! - [`upgrade`] - swap favorites for better-quality versions of the same song
//! - [`dedup`] - remove duplicate favorites, keeping one copy per song
//!
//! Work is strictly sequential: each remote call is awaited, then the driver
//! sleeps for the configured [`Pacing`] before the next. Every processed item
//! ends up as one [`ItemReport`], appended to the [`ResultLog`] right away.
//! Item failures never stop a run; authentication failures do.
//!
//! [`TrackCatalog`]: crate::tidal::TrackCatalog

pub mod dedup;
pub mod sync;
pub mod upgrade;

use std::{fmt, time::Duration};

use tokio::time::sleep;

use crate::{config, management::ResultLog, matching::KeepRule};

/// Fixed delays between remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each search or listing.
    pub request: Duration,
    /// After each add, and after each removal during upgrade.
    pub modify: Duration,
    /// After each removal during dedup.
    pub remove: Duration,
    /// Between dedup rounds.
    pub round: Duration,
}

impl Pacing {
    pub fn from_config() -> Self {
        Self {
            request: config::request_delay(),
            modify: config::modify_delay(),
            remove: config::remove_delay(),
            round: config::round_delay(),
        }
    }

    /// No delays at all.
    pub fn none() -> Self {
        Self {
            request: Duration::ZERO,
            modify: Duration::ZERO,
            remove: Duration::ZERO,
            round: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config()
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Decide and log, but issue no mutation.
    pub dry_run: bool,
    pub pacing: Pacing,
    /// Which duplicate survives during dedup.
    pub keep_rule: KeepRule,
    /// Upper bound on dedup rounds.
    pub max_rounds: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            pacing: Pacing::default(),
            keep_rule: KeepRule::default(),
            max_rounds: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No search result is the same song.
    NotFound,
    /// Several results are the same song under different credits.
    AmbiguousMatch,
    /// The item has no usable title or artist.
    MalformedInput,
    /// Already at a top quality tier.
    AlreadyBest,
    /// The catalog has nothing better than what is favorited.
    NoBetterVersion,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotFound => "not found",
            SkipReason::AmbiguousMatch => "ambiguous match",
            SkipReason::MalformedInput => "malformed input",
            SkipReason::AlreadyBest => "already best quality",
            SkipReason::NoBetterVersion => "no better version",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added,
    AlreadyPresent,
    Upgraded,
    Removed,
    Skipped(SkipReason),
    /// A remote call failed after retries.
    Failed(String),
}

impl Outcome {
    /// Column written to the result log.
    pub fn tag(&self) -> &'static str {
        match self {
            Outcome::Added => "ADDED",
            Outcome::AlreadyPresent => "EXISTS",
            Outcome::Upgraded => "UPGRADED",
            Outcome::Removed => "REMOVED",
            Outcome::Skipped(_) => "SKIPPED",
            Outcome::Failed(_) => "ERROR",
        }
    }

    /// Row label in summaries.
    pub fn summary_label(&self) -> String {
        match self {
            Outcome::Added => "added".to_string(),
            Outcome::AlreadyPresent => "already in My Tracks".to_string(),
            Outcome::Upgraded => "upgraded".to_string(),
            Outcome::Removed => "removed".to_string(),
            Outcome::Skipped(reason) => format!("skipped: {}", reason),
            Outcome::Failed(_) => "errors".to_string(),
        }
    }
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// Human-readable identification, e.g. `Artist - Title`.
    pub item: String,
    /// Remote track id or local path the outcome applies to.
    pub source_id: String,
    pub outcome: Outcome,
    pub detail: String,
    pub dry_run: bool,
}

impl ItemReport {
    pub fn new(item: impl Into<String>, source_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            item: item.into(),
            source_id: source_id.into(),
            outcome,
            detail: String::new(),
            dry_run: false,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    fn log_outcome(&self) -> String {
        if self.dry_run {
            format!("DRY-RUN {}", self.outcome.tag())
        } else {
            self.outcome.tag().to_string()
        }
    }

    fn log_detail(&self) -> String {
        let mut parts = vec![format!("id={}", self.source_id)];
        match &self.outcome {
            Outcome::Skipped(reason) => parts.push(reason.to_string()),
            Outcome::Failed(error) => parts.push(error.clone()),
            _ => {}
        }
        if !self.detail.is_empty() {
            parts.push(self.detail.clone());
        }
        parts.join(" | ")
    }
}

/// Every item a run processed, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub items: Vec<ItemReport>,
}

impl RunReport {
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|i| predicate(&i.outcome)).count()
    }

    pub fn added(&self) -> usize {
        self.count(|o| *o == Outcome::Added)
    }

    pub fn upgraded(&self) -> usize {
        self.count(|o| *o == Outcome::Upgraded)
    }

    pub fn removed(&self) -> usize {
        self.count(|o| *o == Outcome::Removed)
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.count(|o| *o == Outcome::Skipped(reason))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    /// `(label, count)` per distinct outcome, in order of first appearance.
    pub fn summary(&self) -> Vec<(String, usize)> {
        let mut rows: Vec<(String, usize)> = Vec::new();
        for item in &self.items {
            let label = item.outcome.summary_label();
            match rows.iter_mut().find(|(l, _)| *l == label) {
                Some((_, count)) => *count += 1,
                None => rows.push((label, 1)),
            }
        }
        rows
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, Outcome::Failed(_)))
    }

    pub fn extend(&mut self, other: RunReport) {
        self.items.extend(other.items);
    }

    /// Stores `item` and appends it to `log`. A log write failure only warns.
    pub(crate) async fn record(&mut self, log: &ResultLog, mut item: ItemReport, dry_run: bool) {
        item.dry_run = dry_run && item.outcome != Outcome::AlreadyPresent;
        if let Err(e) = log
            .append(&item.log_outcome(), &item.item, &item.log_detail())
            .await
        {
            log::warn!("Cannot write to {}: {}", log.path().display(), e);
        }
        self.items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_outcomes_in_first_seen_order() {
        let report = RunReport {
            items: vec![
                ItemReport::new("a", "1", Outcome::Added),
                ItemReport::new("b", "2", Outcome::Skipped(SkipReason::NotFound)),
                ItemReport::new("c", "3", Outcome::Added),
                ItemReport::new("d", "4", Outcome::Failed("boom".into())),
            ],
        };

        assert_eq!(
            report.summary(),
            vec![
                ("added".to_string(), 2),
                ("skipped: not found".to_string(), 1),
                ("errors".to_string(), 1),
            ]
        );
        assert_eq!(report.added(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(SkipReason::NotFound), 1);
    }

    #[test]
    fn log_columns_carry_reason_and_dry_run_marker() {
        let mut item = ItemReport::new("Band - Song", "42", Outcome::Skipped(SkipReason::AmbiguousMatch))
            .with_detail("2 credits");
        item.dry_run = true;

        assert_eq!(item.log_outcome(), "DRY-RUN SKIPPED");
        assert_eq!(item.log_detail(), "id=42 | ambiguous match | 2 credits");
    }
}
