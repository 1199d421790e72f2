// File: ./src/sync/transport.rs
// Access to the flat file store of the device's document library.
use crate::error::{PlannerError, PlannerResult};
use crate::storage::LocalStorage;
use std::fs;
use std::path::{Path, PathBuf};

pub trait DeviceTransport {
    /// File names in the library root.
    fn list(&self) -> PlannerResult<Vec<String>>;

    /// `None` if the file does not exist.
    fn read(&self, name: &str) -> PlannerResult<Option<Vec<u8>>>;

    /// Replaces `name` atomically: readers see the old or the new contents.
    fn write(&self, name: &str, contents: &[u8]) -> PlannerResult<()>;

    fn exists(&self, name: &str) -> PlannerResult<bool> {
        Ok(self.list()?.iter().any(|n| n == name))
    }

    /// Called once after a sync run.
    fn finish(&self) -> PlannerResult<()> {
        Ok(())
    }
}

impl<T: DeviceTransport + ?Sized> DeviceTransport for Box<T> {
    fn list(&self) -> PlannerResult<Vec<String>> {
        (**self).list()
    }

    fn read(&self, name: &str) -> PlannerResult<Option<Vec<u8>>> {
        (**self).read(name)
    }

    fn write(&self, name: &str, contents: &[u8]) -> PlannerResult<()> {
        (**self).write(name, contents)
    }

    fn exists(&self, name: &str) -> PlannerResult<bool> {
        (**self).exists(name)
    }

    fn finish(&self) -> PlannerResult<()> {
        (**self).finish()
    }
}

/// Library entries are plain file names in one flat directory.
pub(crate) fn check_name(name: &str) -> PlannerResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(PlannerError::Sync(format!("Invalid library file name '{}'", name)));
    }
    Ok(())
}

/// Library reachable as a local directory (USB mass storage or sshfs).
#[derive(Debug, Clone)]
pub struct MountedTransport {
    root: PathBuf,
}

impl MountedTransport {
    pub fn new(root: impl Into<PathBuf>) -> PlannerResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(PlannerError::Sync(format!(
                "Device library '{}' is not mounted",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PlannerResult<PathBuf> {
        check_name(name)?;
        Ok(self.root.join(name))
    }
}

impl DeviceTransport for MountedTransport {
    fn list(&self) -> PlannerResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            PlannerError::Sync(format!("Cannot list '{}': {}", self.root.display(), e))
        })?;
        let mut names = Vec::new();
        for entry in entries.flatten() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> PlannerResult<Option<Vec<u8>>> {
        let path = self.path_of(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PlannerError::Sync(format!("Cannot read '{}': {}", name, e))),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> PlannerResult<()> {
        let path = self.path_of(name)?;
        LocalStorage::atomic_write(&path, contents)
            .map_err(|e| PlannerError::Sync(format!("Cannot write '{}': {}", name, e)))
    }

    fn exists(&self, name: &str) -> PlannerResult<bool> {
        Ok(self.path_of(name)?.exists())
    }
}
