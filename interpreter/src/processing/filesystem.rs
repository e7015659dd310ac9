use std::fmt::Debug;
use std::fs::{Metadata, ReadDir};
use std::iter::Iterator;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::AttributeMask;
use crate::datatype::{Number, Time};
use crate::lang::RuntimeMsg;

/// Metadata bundle of one path, filled according to an [AttributeMask].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileData {
    pub exists: bool,
    pub is_file: bool,
    pub is_directory: bool,
    pub hidden: bool,
    pub readonly: bool,
    pub empty: bool,
    pub size: Number,
    pub access: Time,
    pub change: Time,
    pub creation: Time,
    pub modification: Time,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Directory listing, read fully on first pull then handed out in name order.
#[derive(Debug)]
pub struct SortedReadDir {
    dir_iter: Option<ReadDir>,
    cache: Vec<DirEntry>,
}

impl SortedReadDir {
    pub fn from_entries(mut entries: Vec<DirEntry>) -> Self {
        Self::sort(&mut entries);
        Self {
            dir_iter: None,
            cache: entries,
        }
    }

    fn sort(entries: &mut [DirEntry]) {
        // popped from the back
        entries.sort_by_key(|e| std::cmp::Reverse(e.name.to_lowercase()));
    }
}

impl Iterator for SortedReadDir {
    type Item = DirEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(dir_iter) = self.dir_iter.take() {
            for entry in dir_iter {
                match entry {
                    Ok(e) => {
                        let is_directory = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
                        self.cache.push(DirEntry {
                            name: e.file_name().to_string_lossy().into_owned(),
                            is_directory,
                        });
                    }
                    Err(e) => tracing::warn!("skipping unreadable directory entry: {}", e),
                }
            }
            Self::sort(&mut self.cache);
        }
        self.cache.pop()
    }
}

impl std::convert::From<ReadDir> for SortedReadDir {
    fn from(item: ReadDir) -> Self {
        Self {
            dir_iter: Some(item),
            cache: Vec::new(),
        }
    }
}

pub trait FilesystemQuerier: Debug {
    fn file_data(&mut self, path: &str, mask: AttributeMask) -> FileData;

    fn exists(&mut self, path: &str) -> bool;

    fn is_directory(&mut self, path: &str) -> bool;

    fn open_dir(&mut self, path: &str) -> Result<SortedReadDir, RuntimeMsg>;

    fn create_file(&mut self, path: &str) -> Result<(), RuntimeMsg>;

    fn create_directory(&mut self, path: &str) -> Result<(), RuntimeMsg>;

    fn delete(&mut self, path: &str) -> Result<(), RuntimeMsg>;

    fn copy(&mut self, from: &str, to: &str) -> Result<(), RuntimeMsg>;

    fn move_to(&mut self, from: &str, to: &str) -> Result<(), RuntimeMsg>;

    fn rename(&mut self, from: &str, to: &str) -> Result<(), RuntimeMsg> {
        self.move_to(from, to)
    }

    fn expand(&self, path: &str) -> Result<String, RuntimeMsg> {
        #[cfg(feature = "shellexpand")]
        return Ok(shellexpand::full(path)
            .map_err(|e| RuntimeMsg(format!("Path expansion error: {}", e)))?
            .into_owned());
        #[cfg(not(feature = "shellexpand"))]
        Ok(path.to_string())
    }
}

#[derive(Debug)]
pub struct FilesystemExecutor {
    running: Arc<AtomicBool>,
}

impl FilesystemExecutor {
    pub fn new(running: Arc<AtomicBool>) -> Self {
        Self { running }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Total size of a directory tree; stops early once the interpreter is halted.
    fn directory_size(&self, path: &Path) -> u64 {
        let mut total = 0;
        let mut pending = vec![path.to_path_buf()];
        while let Some(dir) = pending.pop() {
            if !self.is_running() {
                break;
            }
            let read = match dir.read_dir() {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("cannot read directory `{}`: {}", dir.display(), e);
                    continue;
                }
            };
            for entry in read.flatten() {
                match entry.metadata() {
                    Ok(m) if m.is_dir() => pending.push(entry.path()),
                    Ok(m) => total += m.len(),
                    Err(_) => {}
                }
            }
        }
        total
    }

    fn fill_times(data: &mut FileData, meta: &Metadata) {
        if let Ok(t) = meta.accessed() {
            data.access = Time::from_system(t);
        }
        if let Ok(t) = meta.modified() {
            data.modification = Time::from_system(t);
            data.change = data.modification;
        }
        data.creation = match meta.created() {
            Ok(t) => Time::from_system(t),
            Err(_) => data.modification,
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let secs = meta.ctime();
            if secs >= 0 {
                let t = std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs as u64);
                data.change = Time::from_system(t);
            }
        }
    }

    /// Fails with [std::io::ErrorKind::Interrupted] when stopped part way.
    fn copy_recursive(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        if !self.is_running() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Interrupted,
                format!("copying `{}` was interrupted", from.display()),
            ));
        }
        if from.is_dir() {
            std::fs::create_dir_all(to)?;
            for entry in from.read_dir()? {
                let entry = entry?;
                self.copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
            }
            Ok(())
        } else {
            std::fs::copy(from, to).map(|_| ())
        }
    }
}

impl Default for FilesystemExecutor {
    fn default() -> Self {
        Self::new(Arc::new(AtomicBool::new(true)))
    }
}

impl FilesystemQuerier for FilesystemExecutor {
    fn file_data(&mut self, path: &str, mask: AttributeMask) -> FileData {
        let p = Path::new(path);
        let meta = match std::fs::metadata(p) {
            Ok(m) => m,
            Err(_) => return FileData::default(),
        };
        let mut data = FileData {
            exists: true,
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
            readonly: meta.permissions().readonly(),
            hidden: p
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(false),
            ..Default::default()
        };
        if mask.contains(AttributeMask::SIZE) {
            data.size = if data.is_directory {
                Number::Int(self.directory_size(p) as i64)
            } else {
                Number::Int(meta.len() as i64)
            };
        }
        if mask.contains(AttributeMask::EMPTY) {
            data.empty = if data.is_directory {
                p.read_dir().map(|mut r| r.next().is_none()).unwrap_or(false)
            } else {
                meta.len() == 0
            };
        }
        if mask.contains(AttributeMask::TIMES) {
            Self::fill_times(&mut data, &meta);
        }
        data
    }

    fn exists(&mut self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_directory(&mut self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn open_dir(&mut self, path: &str) -> Result<SortedReadDir, RuntimeMsg> {
        Path::new(path)
            .read_dir()
            .map(SortedReadDir::from)
            .map_err(|e| RuntimeMsg(format!("Directory read error for `{}`: {}", path, e)))
    }

    fn create_file(&mut self, path: &str) -> Result<(), RuntimeMsg> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        Ok(())
    }

    fn create_directory(&mut self, path: &str) -> Result<(), RuntimeMsg> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn delete(&mut self, path: &str) -> Result<(), RuntimeMsg> {
        let p = Path::new(path);
        if p.is_dir() {
            std::fs::remove_dir_all(p)?;
        } else {
            std::fs::remove_file(p)?;
        }
        Ok(())
    }

    fn copy(&mut self, from: &str, to: &str) -> Result<(), RuntimeMsg> {
        self.copy_recursive(Path::new(from), Path::new(to))?;
        Ok(())
    }

    fn move_to(&mut self, from: &str, to: &str) -> Result<(), RuntimeMsg> {
        if let Some(parent) = Path::new(to).parent() {
            std::fs::create_dir_all(parent)?;
        }
        if std::fs::rename(from, to).is_err() {
            // across devices; the source goes only after a complete copy
            self.copy_recursive(Path::new(from), Path::new(to))?;
            self.delete(from)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_entries() {
        let dir = SortedReadDir::from_entries(vec![
            DirEntry {
                name: "b.txt".into(),
                is_directory: false,
            },
            DirEntry {
                name: "A".into(),
                is_directory: true,
            },
        ]);
        let names: Vec<String> = dir.map(|e| e.name).collect();
        assert_eq!(names, vec!["A".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn interrupted_move_keeps_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("precious.txt"), "keep").unwrap();
        std::fs::create_dir_all(&dst).unwrap();
        std::fs::write(dst.join("other.txt"), "").unwrap();

        let running = Arc::new(AtomicBool::new(false));
        let mut fs = FilesystemExecutor::new(running);
        let (from, to) = (src.to_string_lossy(), dst.to_string_lossy());
        assert!(fs.move_to(&from, &to).is_err());
        assert!(fs.copy(&from, &dir.path().join("copy").to_string_lossy()).is_err());
        assert_eq!(std::fs::read_to_string(src.join("precious.txt")).unwrap(), "keep");
    }

    #[test]
    fn data_for_missing_path() {
        let mut fs = FilesystemExecutor::default();
        let data = fs.file_data("/definitely/not/here", AttributeMask::ALL);
        assert!(!data.exists);
        assert!(data.creation.is_never());
    }
}
