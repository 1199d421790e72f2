// File: ./src/sync/mod.rs
/*! Publishes generated planners into a tablet document library.

The library is reached through a mounted directory or over SSH. It is a
flat directory of `<uuid>.pdf`, `<uuid>.metadata` and
`<uuid>.content` files; folders are metadata-only entries. Uploads are
idempotent by visible name: a document with the same name in the same folder
is updated in place, which keeps the device's `.content` (page annotations
and reading position) untouched.

Each file is replaced atomically and the metadata is written last, so an
interrupted upload never leaves a listed document pointing at a partial PDF.
*/

pub mod metadata;
pub mod ssh;
pub mod transport;

use crate::error::{PlannerError, PlannerResult};
pub use metadata::{DocumentMetadata, EntryType};
use std::fs;
use std::path::{Path, PathBuf};
pub use ssh::{RemoteSession, SessionConnector, Ssh2Connector, SshTransport};
pub use transport::{DeviceTransport, MountedTransport};

const METADATA_SUFFIX: &str = ".metadata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Created { id: String },
    Updated { id: String },
}

impl UploadOutcome {
    pub fn id(&self) -> &str {
        match self {
            UploadOutcome::Created { id } | UploadOutcome::Updated { id } => id,
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub folder_id: String,
    pub uploaded: Vec<(PathBuf, UploadOutcome)>,
    pub failed: Vec<(PathBuf, PlannerError)>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct DeviceLibrary<T> {
    transport: T,
}

impl<T: DeviceTransport> DeviceLibrary<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// All readable metadata entries. Unparseable ones are skipped.
    pub fn entries(&self) -> PlannerResult<Vec<(String, DocumentMetadata)>> {
        let mut entries = Vec::new();
        for name in self.transport.list()? {
            let Some(id) = name.strip_suffix(METADATA_SUFFIX) else {
                continue;
            };
            let Some(bytes) = self.transport.read(&name)? else {
                continue;
            };
            match serde_json::from_slice::<DocumentMetadata>(&bytes) {
                Ok(meta) => entries.push((id.to_string(), meta)),
                Err(e) => log::debug!("Skipping unreadable metadata '{}': {}", name, e),
            }
        }
        Ok(entries)
    }

    fn find(&self, kind: EntryType, name: &str, parent: &str) -> PlannerResult<Option<String>> {
        Ok(self
            .entries()?
            .into_iter()
            .find(|(_, meta)| meta.matches(kind, name, parent))
            .map(|(id, _)| id))
    }

    pub fn find_folder(&self, name: &str, parent: &str) -> PlannerResult<Option<String>> {
        self.find(EntryType::CollectionType, name, parent)
    }

    pub fn find_document(&self, name: &str, parent: &str) -> PlannerResult<Option<String>> {
        self.find(EntryType::DocumentType, name, parent)
    }

    fn write_json<V: serde::Serialize>(&self, name: &str, value: &V) -> PlannerResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.transport.write(name, &bytes)
    }

    pub fn create_folder(&self, name: &str, parent: &str) -> PlannerResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.write_json(&format!("{}.content", id), &serde_json::json!({}))?;
        self.write_json(
            &format!("{}{}", id, METADATA_SUFFIX),
            &DocumentMetadata::folder(name, parent),
        )?;
        log::info!("Created device folder '{}'", name);
        Ok(id)
    }

    pub fn get_or_create_folder(&self, name: &str, parent: &str) -> PlannerResult<String> {
        match self.find_folder(name, parent)? {
            Some(id) => {
                log::debug!("Using existing device folder '{}'", name);
                Ok(id)
            }
            None => self.create_folder(name, parent),
        }
    }

    /// Uploads one PDF into `parent`. The visible name is the file stem.
    pub fn upload_file(
        &self,
        local: &Path,
        parent: &str,
        update_existing: bool,
    ) -> PlannerResult<UploadOutcome> {
        let name = local
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PlannerError::Sync(format!("'{}' has no usable name", local.display())))?;
        let pdf = fs::read(local)?;

        let existing = if update_existing {
            self.find_document(name, parent)?
        } else {
            None
        };
        let (id, outcome) = match existing {
            Some(id) => (id.clone(), UploadOutcome::Updated { id }),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                (id.clone(), UploadOutcome::Created { id })
            }
        };

        self.transport.write(&format!("{}.pdf", id), &pdf)?;

        let content_name = format!("{}.content", id);
        if !self.transport.exists(&content_name)? {
            self.write_json(&content_name, &metadata::pdf_content())?;
        }

        let metadata_name = format!("{}{}", id, METADATA_SUFFIX);
        let previous = self
            .transport
            .read(&metadata_name)?
            .and_then(|bytes| serde_json::from_slice::<DocumentMetadata>(&bytes).ok());
        let meta = match previous {
            Some(mut meta) => {
                meta.touch();
                meta
            }
            None => DocumentMetadata::document(name, parent),
        };
        self.write_json(&metadata_name, &meta)?;

        match &outcome {
            UploadOutcome::Updated { .. } => log::info!("Updated '{}' on device", name),
            UploadOutcome::Created { .. } => log::info!("Uploaded '{}' to device", name),
        }
        Ok(outcome)
    }

    /// Uploads every PDF of `dir` (sorted by name) into `folder`, or the
    /// library root when `folder` is `None`. A failing file is recorded in
    /// the report and the rest still go through.
    pub fn upload_directory(
        &self,
        dir: &Path,
        folder: Option<&str>,
        update_existing: bool,
    ) -> PlannerResult<SyncReport> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| PlannerError::Sync(format!("Cannot read '{}': {}", dir.display(), e)))?
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        files.sort();

        if files.is_empty() {
            log::warn!("No PDF files in {}", dir.display());
            return Ok(SyncReport::default());
        }
        log::info!("Syncing {} file(s) from {}", files.len(), dir.display());

        let folder_id = match folder {
            Some(name) => self.get_or_create_folder(name, "")?,
            None => String::new(),
        };

        let mut report = SyncReport {
            folder_id: folder_id.clone(),
            ..Default::default()
        };
        for file in files {
            match self.upload_file(&file, &folder_id, update_existing) {
                Ok(outcome) => report.uploaded.push((file, outcome)),
                Err(e) => {
                    log::error!("Failed to upload {}: {}", file.display(), e);
                    report.failed.push((file, e));
                }
            }
        }
        Ok(report)
    }
}
