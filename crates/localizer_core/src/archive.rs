use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// URL prefix of references that already point at a local file.
pub const LOCAL_SCHEME: &str = "file:";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("not well-formed JSON: {0}")]
    Syntax(serde_json::Error),
    #[error("unexpected archive structure: {0}")]
    Shape(serde_json::Error),
}

/// Which list of a message record an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    Attachment,
    Embed,
}

impl ElementKind {
    fn key(self) -> &'static str {
        match self {
            ElementKind::Attachment => "a",
            ElementKind::Embed => "e",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Attachment => write!(f, "attachment"),
            ElementKind::Embed => write!(f, "embed"),
        }
    }
}

/// Non-owning address of one attachment or embed inside the archive tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    pub channel_id: String,
    pub message_id: String,
    pub kind: ElementKind,
    pub index: usize,
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "channel {} message {} {} #{}",
            self.channel_id, self.message_id, self.kind, self.index
        )
    }
}

/// Typed read-only view used to validate the document and drive collection.
/// Fields not listed here are ignored by the view and kept in the document.
#[derive(Debug, Deserialize)]
pub(crate) struct ArchiveView {
    pub data: BTreeMap<String, BTreeMap<String, MessageView>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageView {
    #[serde(default)]
    pub a: Option<Vec<AttachmentView>>,
    #[serde(default)]
    pub e: Option<Vec<EmbedView>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttachmentView {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbedView {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// A loaded chat archive. The full JSON document is kept so that unknown
/// fields and key order survive a save.
#[derive(Debug, Clone, PartialEq)]
pub struct Archive {
    document: Value,
}

impl Archive {
    /// Parses and validates an archive from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArchiveError> {
        let document: Value = serde_json::from_slice(bytes).map_err(ArchiveError::Syntax)?;
        Self::from_value(document)
    }

    /// Validates an already parsed document.
    pub fn from_value(document: Value) -> Result<Self, ArchiveError> {
        let archive = Self { document };
        archive.view()?;
        Ok(archive)
    }

    pub(crate) fn view(&self) -> Result<ArchiveView, ArchiveError> {
        ArchiveView::deserialize(&self.document).map_err(ArchiveError::Shape)
    }

    /// Compact encoding: no whitespace between tokens.
    pub fn to_compact_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.document)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Current `url` of the addressed element, if it exists and is a string.
    pub fn url_of(&self, owner: &OwnerRef) -> Option<&str> {
        self.element(owner)?.get("url")?.as_str()
    }

    pub(crate) fn set_url(&mut self, owner: &OwnerRef, url: &str) -> bool {
        match self.element_mut(owner).and_then(Value::as_object_mut) {
            Some(element) => {
                element.insert("url".to_string(), Value::String(url.to_string()));
                true
            }
            None => false,
        }
    }

    fn element(&self, owner: &OwnerRef) -> Option<&Value> {
        self.document
            .get("data")?
            .get(&owner.channel_id)?
            .get(&owner.message_id)?
            .get(owner.kind.key())?
            .get(owner.index)
    }

    fn element_mut(&mut self, owner: &OwnerRef) -> Option<&mut Value> {
        self.document
            .get_mut("data")?
            .get_mut(&owner.channel_id)?
            .get_mut(&owner.message_id)?
            .get_mut(owner.kind.key())?
            .get_mut(owner.index)
    }
}

#[cfg(test)]
mod tests {
    use super::{Archive, ArchiveError, ElementKind, OwnerRef};

    fn owner(kind: ElementKind, index: usize) -> OwnerRef {
        OwnerRef {
            channel_id: "1".to_string(),
            message_id: "100".to_string(),
            kind,
            index,
        }
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Archive::from_slice(b"{\"data\":").unwrap_err();
        assert!(matches!(err, ArchiveError::Syntax(_)));
    }

    #[test]
    fn rejects_missing_data_mapping() {
        let err = Archive::from_slice(br#"{"meta":{}}"#).unwrap_err();
        assert!(matches!(err, ArchiveError::Shape(_)));
    }

    #[test]
    fn rejects_non_string_url() {
        let err = Archive::from_slice(br#"{"data":{"1":{"100":{"a":[{"url":5}]}}}}"#).unwrap_err();
        assert!(matches!(err, ArchiveError::Shape(_)));
    }

    #[test]
    fn accepts_messages_without_lists() {
        let archive = Archive::from_slice(br#"{"data":{"1":{"100":{"m":"hi"}}}}"#).unwrap();
        assert!(archive.url_of(&owner(ElementKind::Attachment, 0)).is_none());
    }

    #[test]
    fn set_url_keeps_sibling_fields() {
        let mut archive = Archive::from_slice(
            br#"{"data":{"1":{"100":{"a":[{"url":"https://x/a","size":3}]}}}}"#,
        )
        .unwrap();
        assert!(archive.set_url(&owner(ElementKind::Attachment, 0), "file:./d/a"));
        let bytes = archive.to_compact_bytes().unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"data":{"1":{"100":{"a":[{"url":"file:./d/a","size":3}]}}}}"#
        );
    }

    #[test]
    fn set_url_reports_missing_element() {
        let mut archive = Archive::from_slice(br#"{"data":{}}"#).unwrap();
        assert!(!archive.set_url(&owner(ElementKind::Embed, 2), "file:./d/a"));
    }
}
