use super::models::Attendee;
use std::collections::HashSet;

/// Merge an event's explicit attendees with the fallback set.
///
/// Explicit attendees come first in listed order, then every fallback attendee
/// whose address is not already present. Addresses compare case-insensitively
/// and the first occurrence wins, so an explicit entry keeps its own name.
pub fn resolve_attendees(explicit: Option<&[Attendee]>, fallback: &[Attendee]) -> Vec<Attendee> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    let candidates = explicit.unwrap_or_default().iter().chain(fallback.iter());
    for attendee in candidates {
        let key = attendee.key();
        if key.is_empty() {
            continue;
        }
        if seen.insert(key) {
            resolved.push(attendee.clone());
        }
    }

    resolved
}
