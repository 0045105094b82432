//! Analytics response cache
//!
//! Caches raw stats API response bodies on disk so same-day repeat runs skip
//! the network. Entries are keyed by a SHA-256 hash of the request descriptor
//! plus the current date, so a new day never reuses yesterday's data.

use crate::types::{Result, TallyError};
use chrono::Local;
use directories::BaseDirs;
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

pub struct ResponseCacheService {
    cache_dir: PathBuf,
}

impl ResponseCacheService {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| TallyError::Cache("Cannot determine home directory".into()))?;
        let cache_dir = base_dirs.home_dir().join(".traffictally").join("cache");
        fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn day_stamp() -> String {
        Local::now().format("%Y%m%d").to_string()
    }

    /// Cache file for a request descriptor, stamped with today's date:
    /// `<sha256(descriptor + day)>--<yyyymmdd>.json`.
    pub fn entry_path(&self, descriptor: &str) -> PathBuf {
        let day = Self::day_stamp();
        let mut hasher = Sha256::new();
        hasher.update(descriptor.as_bytes());
        hasher.update(day.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        self.cache_dir.join(format!("{}--{}.json", hex, day))
    }

    /// Return today's cached body for this descriptor, if any. Read and lock
    /// failures degrade to a miss with a warning rather than aborting a run.
    pub fn lookup(&self, descriptor: &str) -> Option<String> {
        let path = self.entry_path(descriptor);
        if !path.exists() {
            return None;
        }

        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[traffictally] Warning: failed to open cache entry: {}", e);
                return None;
            }
        };

        if let Err(e) = file.lock_shared() {
            eprintln!(
                "[traffictally] Warning: failed to acquire cache read lock: {}",
                e
            );
            return None;
        }

        let mut body = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let outcome = reader.read_to_string(&mut body);
        let _ = file.unlock();

        match outcome {
            Ok(_) => Some(body),
            Err(e) => {
                eprintln!("[traffictally] Warning: failed to read cache entry: {}", e);
                None
            }
        }
    }

    /// Store a response body using atomic write (temp file + rename) with an
    /// exclusive lock.
    pub fn store(&self, descriptor: &str, body: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let path = self.entry_path(descriptor);
        let temp_path = path.with_extension("json.tmp");

        {
            let mut file = File::create(&temp_path)
                .map_err(|e| TallyError::Cache(format!("Failed to create temp file: {}", e)))?;
            file.write_all(body.as_bytes())
                .map_err(|e| TallyError::Cache(format!("Failed to write temp file: {}", e)))?;
            file.sync_all()
                .map_err(|e| TallyError::Cache(format!("Failed to sync temp file: {}", e)))?;
        }

        let target = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        target
            .lock_exclusive()
            .map_err(|e| TallyError::Cache(format!("Failed to acquire write lock: {}", e)))?;

        fs::rename(&temp_path, &path)
            .map_err(|e| TallyError::Cache(format!("Failed to rename temp file: {}", e)))?;

        let _ = target.unlock();
        Ok(())
    }

    /// Remove entries stamped with a day other than today. Returns the
    /// number of files removed.
    pub fn sweep(&self) -> Result<usize> {
        let suffix = format!("--{}.json", Self::day_stamp());
        let pattern = self.cache_dir.join("*.json");
        let stale: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| paths.filter_map(|e| e.ok()).collect())
            .unwrap_or_default();

        let mut removed = 0;
        for path in stale {
            let name = path.file_name().map(|n| n.to_string_lossy().to_string());
            let is_today = name.map(|n| n.ends_with(&suffix)).unwrap_or(false);
            if !is_today {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
