use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use indexmap::IndexSet;
use rand::Rng;
use tracing::warn;

use crate::error::ContestError;

/// The contest participant list: unique user ids in insertion order,
/// mirrored to a JSON file after every mutation. The file is the only
/// state that survives a restart.
pub struct Participants {
    entries: IndexSet<String>,
    path: PathBuf,
}

impl Participants {
    /// Read the store at `path`. A missing file means an empty list; a file
    /// that does not parse is treated as empty with a warning, so a damaged
    /// store never prevents the bot from starting.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => IndexSet::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        %err,
                        "participant store is corrupted, starting with an empty list"
                    );
                    IndexSet::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => IndexSet::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "participant store is unreadable");
                IndexSet::new()
            }
        };
        Self { entries, path }
    }

    /// Register one participant. Duplicates are a no-op; a new id is
    /// persisted immediately.
    pub fn add(&mut self, id: impl Into<String>) -> Result<bool, ContestError> {
        let inserted = self.entries.insert(id.into());
        if inserted {
            self.persist()?;
        }
        Ok(inserted)
    }

    /// Register a batch of participants with a single store write at the
    /// end. Returns how many ids were new.
    pub fn absorb<I>(&mut self, ids: I) -> Result<usize, ContestError>
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.entries.len();
        for id in ids {
            self.entries.insert(id);
        }
        self.persist()?;
        Ok(self.entries.len() - before)
    }

    /// Drop every participant and persist the empty list.
    pub fn clear(&mut self) -> Result<(), ContestError> {
        self.entries.clear();
        self.persist()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains(id)
    }

    /// Pick one participant with uniform probability.
    pub fn pick_random(&self) -> Result<&str, ContestError> {
        if self.entries.is_empty() {
            return Err(ContestError::NoParticipants);
        }
        let index = rand::thread_rng().gen_range(0..self.entries.len());
        self.entries
            .get_index(index)
            .map(String::as_str)
            .ok_or(ContestError::NoParticipants)
    }

    // Whole-file overwrite, pretty printed so the store stays hand-editable.
    // A crash mid-write leaves a torn file; load() heals that to empty.
    fn persist(&self) -> Result<(), ContestError> {
        let serialized = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("participants.json")
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let participants = Participants::load(store_in(&dir));
        assert_eq!(participants.count(), 0);
    }

    #[test]
    fn blank_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = store_in(&dir);
        fs::write(&path, "  \n").unwrap();
        assert_eq!(Participants::load(path).count(), 0);
    }

    #[test]
    fn corrupted_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = store_in(&dir);
        fs::write(&path, "not valid json").unwrap();
        let participants = Participants::load(path);
        assert_eq!(participants.count(), 0);
    }

    #[test]
    fn add_deduplicates() {
        let dir = tempdir().unwrap();
        let mut participants = Participants::load(store_in(&dir));
        assert!(participants.add("100").unwrap());
        assert!(participants.add("200").unwrap());
        assert!(!participants.add("100").unwrap());
        assert_eq!(participants.count(), 2);
        assert!(participants.contains("100"));
        assert!(participants.contains("200"));
    }

    #[test]
    fn round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let path = store_in(&dir);
        let mut participants = Participants::load(&path);
        for id in ["30", "10", "20"] {
            participants.add(id).unwrap();
        }
        drop(participants);

        let raw = fs::read_to_string(&path).unwrap();
        let reloaded: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(reloaded, vec!["30", "10", "20"]);

        let reopened = Participants::load(&path);
        assert_eq!(reopened.count(), 3);
        assert!(reopened.contains("10"));
    }

    #[test]
    fn clear_writes_empty_list() {
        let dir = tempdir().unwrap();
        let path = store_in(&dir);
        let mut participants = Participants::load(&path);
        participants.add("1").unwrap();
        participants.clear().unwrap();
        assert!(participants.is_empty());

        let raw = fs::read_to_string(&path).unwrap();
        let reloaded: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert!(reloaded.is_empty());
    }

    #[test]
    fn absorb_counts_only_new_ids() {
        let dir = tempdir().unwrap();
        let mut participants = Participants::load(store_in(&dir));
        participants.add("1").unwrap();
        let added = participants
            .absorb(["1", "2", "3", "2"].map(String::from))
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(participants.count(), 3);
    }

    #[test]
    fn pick_random_on_empty_fails() {
        let dir = tempdir().unwrap();
        let participants = Participants::load(store_in(&dir));
        assert!(matches!(
            participants.pick_random(),
            Err(ContestError::NoParticipants)
        ));
    }

    #[test]
    fn pick_random_is_roughly_uniform() {
        let dir = tempdir().unwrap();
        let mut participants = Participants::load(store_in(&dir));
        for id in ["A", "B", "C"] {
            participants.add(id).unwrap();
        }

        let mut hits: HashMap<String, u32> = HashMap::new();
        for _ in 0..3000 {
            let picked = participants.pick_random().unwrap().to_string();
            *hits.entry(picked).or_default() += 1;
        }

        assert_eq!(hits.len(), 3);
        for (id, count) in hits {
            // expectation 1000; a ±250 band is far outside normal variance
            assert!(
                (750..=1250).contains(&count),
                "{id} drawn {count} times out of 3000"
            );
        }
    }
}
