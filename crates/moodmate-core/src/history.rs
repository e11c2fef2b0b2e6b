//! Append-only mood log mirrored to a key-value store.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::mood::Mood;
use crate::store::KeyValueStore;

/// Key holding the JSON array of entries.
pub const MOOD_HISTORY_KEY: &str = "moodHistory";
/// Legacy display-name key. Only ever removed.
pub const USER_NAME_KEY: &str = "userName";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub mood: Mood,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoodSummary {
    /// Newest entry first.
    pub recent_first: Vec<MoodEntry>,
    /// Per-mood totals, in order of first occurrence.
    pub counts: Vec<(Mood, usize)>,
}

impl MoodSummary {
    pub fn is_empty(&self) -> bool {
        self.recent_first.is_empty()
    }

    pub fn count(&self, mood: Mood) -> usize {
        self.counts
            .iter()
            .find(|(m, _)| *m == mood)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Today's date in US locale form, e.g. "10/14/2026".
pub fn today() -> String {
    chrono::Local::now().format("%-m/%-d/%Y").to_string()
}

pub struct HistoryStore<S> {
    store: S,
    entries: Vec<MoodEntry>,
    clock: fn() -> String,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Starts empty. Whatever the store already holds is never read back.
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
            clock: today,
        }
    }

    /// Replace the date source.
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append an entry dated today and persist the whole log.
    pub fn record(&mut self, mood: Mood) -> MoodEntry {
        let entry = MoodEntry {
            mood,
            date: (self.clock)(),
        };
        self.entries.push(entry.clone());
        self.persist();
        debug!("Recorded mood '{mood}' ({} entries)", self.entries.len());
        entry
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(MOOD_HISTORY_KEY) {
            warn!("Failed to remove persisted mood history: {e}");
        }
    }

    /// Clear the log and every other key a session leaves behind.
    pub fn clear_all(&mut self) {
        self.clear();
        if let Err(e) = self.store.remove(USER_NAME_KEY) {
            warn!("Failed to remove cached user name: {e}");
        }
    }

    pub fn summarize(&self) -> MoodSummary {
        let mut counts: Vec<(Mood, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.iter_mut().find(|(m, _)| *m == entry.mood) {
                Some((_, n)) => *n += 1,
                None => counts.push((entry.mood, 1)),
            }
        }
        MoodSummary {
            recent_first: self.entries.iter().rev().cloned().collect(),
            counts,
        }
    }

    // Writes are fire-and-forget; a failure leaves the previous blob in place.
    fn persist(&mut self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize mood history: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(MOOD_HISTORY_KEY, &json) {
            warn!("Failed to persist mood history: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fixed_day() -> String {
        "10/14/2026".to_string()
    }

    fn test_history() -> HistoryStore<MemoryStore> {
        HistoryStore::new(MemoryStore::new()).with_clock(fixed_day)
    }

    #[test]
    fn test_record_then_summarize_puts_newest_first() {
        let mut history = test_history();
        history.record(Mood::Calm);
        history.record(Mood::Angry);

        let summary = history.summarize();
        assert_eq!(summary.recent_first[0].mood, Mood::Angry);
        assert_eq!(summary.recent_first[0].date, "10/14/2026");
        assert_eq!(summary.recent_first[1].mood, Mood::Calm);
    }

    #[test]
    fn test_record_persists_full_log() {
        let mut history = test_history();
        history.record(Mood::Happy);
        history.record(Mood::Sad);

        let blob = history.store().get(MOOD_HISTORY_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                { "mood": "happy", "date": "10/14/2026" },
                { "mood": "sad", "date": "10/14/2026" }
            ])
        );
    }

    #[test]
    fn test_clear_twice_is_harmless() {
        let mut history = test_history();
        history.record(Mood::Stressed);

        history.clear();
        assert!(history.is_empty());
        assert!(history.store().get(MOOD_HISTORY_KEY).is_none());

        history.clear();
        assert!(history.is_empty());
        assert!(history.summarize().is_empty());
    }

    #[test]
    fn test_clear_all_removes_user_name() {
        let mut store = MemoryStore::new();
        store.set(USER_NAME_KEY, "Ann").unwrap();
        store.set(MOOD_HISTORY_KEY, "[]").unwrap();

        let mut history = HistoryStore::new(store);
        history.clear_all();
        assert!(history.store().is_empty());
    }

    #[test]
    fn test_new_ignores_existing_blob() {
        let mut store = MemoryStore::new();
        store
            .set(MOOD_HISTORY_KEY, r#"[{"mood":"sad","date":"1/1/2026"}]"#)
            .unwrap();
        let history = HistoryStore::new(store);
        assert!(history.is_empty());
    }

    #[test]
    fn test_counts_follow_first_occurrence() {
        let mut history = test_history();
        for mood in [Mood::Sad, Mood::Happy, Mood::Sad, Mood::Sad, Mood::Happy] {
            history.record(mood);
        }
        let summary = history.summarize();
        assert_eq!(summary.counts, vec![(Mood::Sad, 3), (Mood::Happy, 2)]);
        assert_eq!(summary.count(Mood::Sad), 3);
        assert_eq!(summary.count(Mood::Calm), 0);
    }

    #[test]
    fn test_today_format() {
        let date = today();
        let parts: Vec<&str> = date.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
    }
}
