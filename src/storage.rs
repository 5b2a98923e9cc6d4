// File: ./src/storage.rs
// File locking and atomic writes shared by everything that persists to disk.
use anyhow::Result;
use fs2::FileExt;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStorage;

impl LocalStorage {
    pub(crate) fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        let name = lock_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "dealcal".to_string());
        lock_path.set_file_name(format!("{}.lock", name));
        lock_path
    }

    /// Run `f` while holding an exclusive lock on a sidecar `.lock` file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AppContext, TestContext};

    #[test]
    fn test_atomic_write_and_read_back() {
        let ctx = TestContext::new();
        let path = ctx.get_data_dir().unwrap().join("blob.json");
        LocalStorage::with_lock(&path, || LocalStorage::atomic_write(&path, "{\"a\":1}")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
        assert!(!path.with_extension("tmp").exists());
        assert!(ctx.get_data_dir().unwrap().join("blob.json.lock").exists());
    }

    #[test]
    fn test_locking_concurrency() {
        let ctx = TestContext::new();
        let path = ctx.get_data_dir().unwrap().join("counter.txt");
        fs::write(&path, "0").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    LocalStorage::with_lock(&path, || {
                        let n: u32 = fs::read_to_string(&path)?.trim().parse()?;
                        LocalStorage::atomic_write(&path, (n + 1).to_string())
                    })
                    .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "8");
    }
}
