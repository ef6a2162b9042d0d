//! Link-keyed deduplication.

use crate::models::Linked;
use std::collections::HashMap;
use tracing::debug;

/// Collapse candidates to one entry per distinct link.
///
/// A later candidate with the same link replaces the earlier one's payload
/// (last write wins) but keeps the slot where that link first appeared, so
/// output order is stable with respect to input order.
pub fn dedup_by_link<T: Linked>(candidates: Vec<T>) -> Vec<T> {
    let total = candidates.len();
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(total);
    let mut out: Vec<T> = Vec::with_capacity(total);

    for candidate in candidates {
        match slots.get(candidate.link()) {
            Some(&idx) => out[idx] = candidate,
            None => {
                slots.insert(candidate.link().to_string(), out.len());
                out.push(candidate);
            }
        }
    }

    debug!(before = total, after = out.len(), "Deduplicated by link");
    out
}
