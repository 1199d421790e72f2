// File: ./src/sync/metadata.rs
// Sidecar files describing library entries: `<id>.metadata` and `<id>.content`.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EntryType {
    CollectionType,
    #[default]
    DocumentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(default)]
    pub deleted: bool,
    /// Milliseconds since the epoch, as a string.
    #[serde(default)]
    pub last_modified: String,
    #[serde(default, rename = "metadatamodified")]
    pub metadata_modified: bool,
    #[serde(default)]
    pub modified: bool,
    /// Id of the containing folder, empty for the library root.
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub synced: bool,
    #[serde(default, rename = "type")]
    pub kind: EntryType,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub visible_name: String,
    /// Fields written by the device that we carry through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> u32 {
    1
}

impl DocumentMetadata {
    fn new(kind: EntryType, name: &str, parent: &str) -> Self {
        Self {
            deleted: false,
            last_modified: now_millis(),
            metadata_modified: false,
            modified: false,
            parent: parent.to_string(),
            pinned: false,
            synced: false,
            kind,
            version: 1,
            visible_name: name.to_string(),
            extra: Map::new(),
        }
    }

    pub fn folder(name: &str, parent: &str) -> Self {
        Self::new(EntryType::CollectionType, name, parent)
    }

    pub fn document(name: &str, parent: &str) -> Self {
        Self::new(EntryType::DocumentType, name, parent)
    }

    /// Marks the entry as changed now.
    pub fn touch(&mut self) {
        self.last_modified = now_millis();
        self.modified = true;
    }

    /// Live (not deleted) entry of `kind` named `name` inside `parent`.
    pub fn matches(&self, kind: EntryType, name: &str, parent: &str) -> bool {
        !self.deleted && self.kind == kind && self.visible_name == name && self.parent == parent
    }
}

pub fn now_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// `.content` of a freshly uploaded PDF.
pub fn pdf_content() -> Value {
    json!({
        "extraMetadata": {},
        "fileType": "pdf",
        "fontName": "",
        "lastOpenedPage": 0,
        "lineHeight": -1,
        "margins": 100,
        "orientation": "portrait",
        "pageCount": 0,
        "pages": [],
        "textScale": 1,
        "transform": {}
    })
}
