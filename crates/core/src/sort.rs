use crate::model::TrackEntry;
use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// Read-order applied on top of the canonical `position` order. Never
/// persisted and never written back into `position`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    #[default]
    Position,
    RecentlyAdded,
    Title,
}

impl std::str::FromStr for SortKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "position" | "default" | "none" => Ok(SortKind::Position),
            "recent" | "recently_added" => Ok(SortKind::RecentlyAdded),
            "title" => Ok(SortKind::Title),
            other => Err(format!("unknown sort '{other}'")),
        }
    }
}

/// Produces the displayed sequence for `kind` from the canonical entries.
pub fn materialize(entries: &[TrackEntry], kind: SortKind) -> Vec<TrackEntry> {
    let mut out = entries.to_vec();
    match kind {
        SortKind::Position => out.sort_by_key(|e| e.position),
        SortKind::RecentlyAdded => out.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then_with(|| b.position.cmp(&a.position))
        }),
        SortKind::Title => {
            let collator = title_collator();
            out.sort_by(|a, b| {
                compare_titles(collator.as_ref(), &a.title, &b.title)
                    .then_with(|| a.position.cmp(&b.position))
            })
        }
    }
    out
}

// Root-locale collation at secondary strength: accents count, case does not.
fn title_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!(error = %err, "title collator unavailable; falling back to case folding");
            None
        }
    }
}

fn compare_titles(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    let (a, b) = (a.trim(), b.trim());
    let primary = match collator {
        Some(collator) => collator.compare(a, b),
        None => fold(a).cmp(&fold(b)),
    };
    primary.then_with(|| a.cmp(b))
}

fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
