//! Mail.ru Cloud web API response types

use serde::Deserialize;
use serde_json::Value;

/// `{status, body}` envelope wrapping every response
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub status: u16,

    #[serde(default)]
    pub body: Option<FolderBody>,
}

/// Folder listing body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderBody {
    /// Children, kept raw so one malformed entry does not fail the page
    #[serde(default)]
    pub list: Vec<Value>,

    /// Either a plain number or `{"folders": n, "files": m}`
    #[serde(default)]
    pub count: Option<Value>,
}

impl FolderBody {
    /// Total children in the folder, if reported
    pub fn total(&self) -> Option<u64> {
        match self.count.as_ref()? {
            Value::Number(n) => n.as_u64(),
            Value::Object(parts) => {
                let folders = parts.get("folders").and_then(Value::as_u64).unwrap_or(0);
                let files = parts.get("files").and_then(Value::as_u64).unwrap_or(0);
                Some(folders + files)
            }
            _ => None,
        }
    }
}

/// One folder child
#[derive(Debug, Clone, Deserialize)]
pub struct CloudEntry {
    pub name: String,

    /// `file` or `folder`
    #[serde(rename = "type")]
    pub entry_type: String,

    #[serde(default)]
    pub weblink: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    /// Unix seconds, as a number or numeric string
    #[serde(default)]
    pub mtime: Option<Value>,
}

impl CloudEntry {
    pub fn is_file(&self) -> bool {
        self.entry_type == "file"
    }

    pub fn is_folder(&self) -> bool {
        self.entry_type == "folder"
    }

    pub fn mtime_seconds(&self) -> Option<i64> {
        match self.mtime.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_from_number_and_object() {
        let body: FolderBody = serde_json::from_str(r#"{"list": [], "count": 7}"#).unwrap();
        assert_eq!(body.total(), Some(7));

        let body: FolderBody =
            serde_json::from_str(r#"{"list": [], "count": {"folders": 2, "files": 5}}"#).unwrap();
        assert_eq!(body.total(), Some(7));

        let body: FolderBody = serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert_eq!(body.total(), None);
    }

    #[test]
    fn test_mtime_variants() {
        let entry: CloudEntry =
            serde_json::from_str(r#"{"name": "a.jpg", "type": "file", "mtime": 1700000000}"#)
                .unwrap();
        assert_eq!(entry.mtime_seconds(), Some(1_700_000_000));

        let entry: CloudEntry =
            serde_json::from_str(r#"{"name": "a.jpg", "type": "file", "mtime": "1700000000"}"#)
                .unwrap();
        assert_eq!(entry.mtime_seconds(), Some(1_700_000_000));

        let entry: CloudEntry =
            serde_json::from_str(r#"{"name": "a.jpg", "type": "file", "mtime": "soon"}"#).unwrap();
        assert_eq!(entry.mtime_seconds(), None);
    }
}
