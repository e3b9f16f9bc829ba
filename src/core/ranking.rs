use std::ops::Range;

use crate::models::{EventSummary, PageRequest, RankedPage, ScoredEvent};

/// Sort scored events by descending score
///
/// Order among equal scores is unspecified.
pub fn rank(mut scored: Vec<ScoredEvent>) -> Vec<ScoredEvent> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Offset/limit window over `total` ranked items, clamped to a valid range
pub fn page_window(total: usize, page: PageRequest) -> Range<usize> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let size = usize::try_from(page.size).unwrap_or(usize::MAX);

    let from = offset.min(total);
    let to = from.saturating_add(size).min(total);
    if from > to {
        return from..from;
    }
    from..to
}

/// Cut the requested page out of a ranked sequence
pub fn paginate(ranked: Vec<ScoredEvent>, page: PageRequest) -> RankedPage {
    let total = ranked.len();
    let window = page_window(total, page);

    let items = ranked
        .get(window)
        .unwrap_or_default()
        .iter()
        .map(EventSummary::from)
        .collect();

    RankedPage {
        items,
        total_count: total as u64,
        page: page.page,
        size: page.size,
    }
}
