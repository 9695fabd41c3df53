use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key-value persistence: each key is one pretty-printed JSON file in the
/// data directory.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// `Ok(None)` when nothing has been stored under `key` yet.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read {} failed", path.display())),
        };
        let value = serde_json::from_str(&content)
            .with_context(|| format!("parse {} failed", path.display()))?;
        Ok(Some(value))
    }

    /// Replace the blob stored under `key`. Written to a sibling temp file
    /// first so a crash never leaves a half-written blob behind.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create dir {} failed", self.dir.display()))?;
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let payload = serde_json::to_string_pretty(value)
            .with_context(|| format!("serialize {key} failed"))?;
        fs::write(&tmp, payload).with_context(|| format!("write {} failed", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("rename {} -> {} failed", tmp.display(), path.display()))?;
        Ok(())
    }
}

/// Fresh, empty store under the system temp dir.
#[cfg(test)]
pub fn scratch_store(label: &str) -> JsonStore {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!(
        "kickoff-{label}-{}-{nanos}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    JsonStore::new(dir)
}

/// Store whose data dir sits under a regular file, so every write fails.
#[cfg(test)]
pub fn unwritable_store(label: &str) -> JsonStore {
    let scratch = scratch_store(label);
    fs::create_dir_all(scratch.dir()).unwrap();
    let blocker = scratch.dir().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    JsonStore::new(blocker.join("data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn missing_key_reads_as_none() {
        let store = scratch_store("missing");
        let value: Option<Vec<u64>> = store.get("nothing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn put_then_get_returns_same_value() {
        let store = scratch_store("put-get");
        let ids: BTreeSet<u64> = [3, 1, 2].into_iter().collect();
        store.put("ids", &ids).unwrap();
        let loaded: BTreeSet<u64> = store.get("ids").unwrap().unwrap();
        assert_eq!(loaded, ids);
        assert!(store.path("ids").exists());
        assert!(!store.dir().join(".ids.json.tmp").exists());
    }

    #[test]
    fn put_overwrites_previous_blob() {
        let store = scratch_store("overwrite");
        store.put("list", &vec![1u64, 2, 3]).unwrap();
        store.put("list", &vec![9u64]).unwrap();
        let loaded: Vec<u64> = store.get("list").unwrap().unwrap();
        assert_eq!(loaded, vec![9]);
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let store = scratch_store("corrupt");
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path("favorites"), "{not json").unwrap();
        let err = store.get::<Vec<u64>>("favorites").unwrap_err();
        assert!(err.to_string().contains("parse"), "got {err}");
    }

    #[test]
    fn put_reports_unusable_dir() {
        let store = unwritable_store("unusable");
        let err = store.put("ids", &vec![1u64]).unwrap_err();
        assert!(err.to_string().contains("create dir"), "got {err}");
    }
}
