//! On-device persistence of the person list and the remote link record.
//!
//! The store is best-effort: reads of missing or unreadable files yield
//! empty values and failed writes are logged, never returned. The app keeps
//! working in memory when the data directory is unavailable.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::person::Person;

const PEOPLE_FILE: &str = "people.json";
const LINK_FILE: &str = "link.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    /// A real provider (e.g. the Google Sheets provider).
    Provider,
    /// Simulated sync with no remote dependency.
    Demo,
}

/// Which remote document this device is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub mode: LinkMode,
    pub document_id: String,
    /// Cached tab name so the document layout does not need re-discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LocalStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn people_path(&self) -> PathBuf {
        self.dir.join(PEOPLE_FILE)
    }

    fn link_path(&self) -> PathBuf {
        self.dir.join(LINK_FILE)
    }

    pub fn load(&self) -> Vec<Person> {
        let path = self.people_path();
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };

        match serde_json::from_str(&content) {
            Ok(people) => people,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable people file");
                Vec::new()
            }
        }
    }

    pub fn save(&self, people: &[Person]) {
        let result = serde_json::to_string_pretty(people)
            .map_err(std::io::Error::other)
            .and_then(|content| write_atomic(&self.dir, PEOPLE_FILE, &content));

        if let Err(e) = result {
            tracing::warn!(dir = %self.dir.display(), error = %e, "local store unavailable, keeping changes in memory");
        }
    }

    pub fn load_link(&self) -> Option<LinkRecord> {
        let content = std::fs::read_to_string(self.link_path()).ok()?;
        match toml::from_str(&content) {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable link record");
                None
            }
        }
    }

    pub fn save_link(&self, link: &LinkRecord) {
        let result = toml::to_string_pretty(link)
            .map_err(std::io::Error::other)
            .and_then(|content| write_atomic(&self.dir, LINK_FILE, &content));

        if let Err(e) = result {
            tracing::warn!(error = %e, "could not persist link record");
        }
    }

    pub fn clear_link(&self) {
        remove_if_exists(&self.link_path());
    }

    /// Forget everything stored on this device.
    pub fn clear(&self) {
        self.clear_link();
        remove_if_exists(&self.people_path());
    }
}

fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove file"),
    }
}

/// Write via a temp file and rename so a crash never leaves a torn file.
fn write_atomic(dir: &Path, file_name: &str, content: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(file_name);
    let temp = dir.join(format!("{file_name}.tmp"));

    std::fs::write(&temp, content)?;
    std::fs::rename(&temp, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::birthday::Birthday;
    use crate::person::{Gift, PersonColor};

    fn sample() -> Vec<Person> {
        let mut ana = Person::new("Ana", Birthday { day: 15, month: 5 }, PersonColor::Rose);
        ana.gifts.push(Gift::new("Libro"));
        let luis = Person::new("Luis", Birthday { day: 3, month: 11 }, PersonColor::Blue);
        vec![ana, luis]
    }

    #[test]
    fn test_save_then_load_is_identity() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("data"));
        let people = sample();

        store.save(&people);
        assert_eq!(store.load(), people);
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(LocalStore::new(dir.path()).load().is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PEOPLE_FILE), "{not json").unwrap();
        assert!(LocalStore::new(dir.path()).load().is_empty());
    }

    #[test]
    fn test_unavailable_store_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be.
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();

        let store = LocalStore::new(&blocker);
        store.save(&sample());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_link_record_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert_eq!(store.load_link(), None);

        let link = LinkRecord {
            mode: LinkMode::Provider,
            document_id: "sheet-123".into(),
            sheet_name: Some("Personas".into()),
        };
        store.save_link(&link);
        assert_eq!(store.load_link(), Some(link));

        store.clear_link();
        assert_eq!(store.load_link(), None);
    }

    #[test]
    fn test_clear_forgets_people() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store.save(&sample());
        store.clear();
        assert!(store.load().is_empty());
    }
}
