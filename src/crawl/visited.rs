// src/crawl/visited.rs
// =============================================================================
// The visited set: who owns which address, and what title it had.
//
// Claiming an address is the ONLY way a crawl unit comes into existence, and
// the check-and-insert happens in one critical section. Two units that find
// the same link at the same moment can't both win, so no page is fetched
// twice.
//
// An entry starts as a bare claim (no title yet). When the owning unit
// finishes its page it records the title, which turns the claim into a
// committed result. Only committed entries show up in snapshots.
// =============================================================================

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct VisitedSet {
    // None = claimed but not yet recorded
    entries: Mutex<HashMap<String, Option<String>>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means some unit panicked while holding it; the
    // map itself is still consistent because every critical section is a
    // single insert or remove.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Returns true if the caller now owns `url`, false if someone already did
    pub fn try_claim(&self, url: &str) -> bool {
        let mut entries = self.lock();
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(url.to_string(), None);
        true
    }

    // Stores the title for an address the caller has claimed
    pub fn record(&self, url: &str, title: &str) {
        let mut entries = self.lock();
        match entries.get_mut(url) {
            Some(slot @ None) => *slot = Some(title.to_string()),
            Some(Some(_)) => {
                tracing::warn!("{} was already recorded; keeping the first title", url);
            }
            None => {
                tracing::debug!("recording {} without a prior claim", url);
                entries.insert(url.to_string(), Some(title.to_string()));
            }
        }
    }

    // Gives up a claim that never turned into a visit
    //
    // Used when a unit is pruned by depth before fetching anything, so a
    // later discovery (after the depth governor was raised) can still claim
    // the address. Recorded entries are never released.
    //
    // A sibling that tries to claim the address while the pruned unit still
    // holds it loses and skips the link. Parents avoid this by not claiming
    // links that are already too deep (see CrawlUnit::spawn_children).
    pub fn release(&self, url: &str) -> bool {
        let mut entries = self.lock();
        if matches!(entries.get(url), Some(None)) {
            entries.remove(url);
            return true;
        }
        false
    }

    #[cfg(test)]
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    #[cfg(test)]
    pub fn claimed_len(&self) -> usize {
        self.lock().len()
    }

    // Committed (address -> title) pairs, sorted by address
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock()
            .iter()
            .filter_map(|(url, title)| title.as_ref().map(|t| (url.clone(), t.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_claim_is_exclusive() {
        let visited = VisitedSet::new();
        assert!(visited.try_claim("http://a"));
        assert!(!visited.try_claim("http://a"));
        assert!(visited.contains("http://a"));
        assert_eq!(visited.claimed_len(), 1);
    }

    #[test]
    fn test_snapshot_only_shows_recorded_entries() {
        let visited = VisitedSet::new();
        visited.try_claim("http://a");
        visited.try_claim("http://b");
        visited.record("http://a", "A");

        let snapshot = visited.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("http://a").map(String::as_str), Some("A"));
    }

    #[test]
    fn test_record_keeps_first_title() {
        let visited = VisitedSet::new();
        visited.try_claim("http://a");
        visited.record("http://a", "first");
        visited.record("http://a", "second");
        assert_eq!(visited.snapshot()["http://a"], "first");
    }

    #[test]
    fn test_release_only_drops_unrecorded_claims() {
        let visited = VisitedSet::new();
        visited.try_claim("http://pruned");
        visited.try_claim("http://done");
        visited.record("http://done", "");

        assert!(visited.release("http://pruned"));
        assert!(!visited.release("http://done"));
        assert!(!visited.release("http://never-seen"));

        assert!(visited.try_claim("http://pruned"));
        assert!(!visited.try_claim("http://done"));
    }

    #[test]
    fn test_record_fills_an_open_claim() {
        let visited = VisitedSet::new();
        visited.try_claim("http://a");
        assert!(visited.snapshot().is_empty());

        visited.record("http://a", "A");
        assert_eq!(visited.snapshot()["http://a"], "A");
        assert!(!visited.release("http://a"));
    }

    #[test]
    fn test_concurrent_claims_have_a_single_winner() {
        let visited = Arc::new(VisitedSet::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = Arc::clone(&visited);
                std::thread::spawn(move || {
                    (0..100)
                        .filter(|i| visited.try_claim(&format!("http://page/{}", i)))
                        .count()
                })
            })
            .collect();

        let total_wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total_wins, 100);
        assert_eq!(visited.claimed_len(), 100);
    }
}
