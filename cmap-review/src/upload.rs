//! Upload coordinator
//!
//! Holds the file the user picked for analysis. Content is never inspected
//! here; the service decides whether the spreadsheet is usable.

use crate::error::ClientResult;
use std::path::Path;
use std::sync::Arc;

/// A file chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    data: Arc<[u8]>,
}

impl SelectedFile {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data: Arc::from(data),
        }
    }

    /// Read a file from disk, keeping its file name for the upload
    pub async fn from_path(path: &Path) -> ClientResult<Self> {
        let data = tokio::fs::read(path)
            .await
            .map_err(cmap_common::Error::from)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        tracing::debug!(file = %path.display(), bytes = data.len(), "Read upload file");
        Ok(Self::from_bytes(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// MIME type for the multipart part, inferred from the extension
    pub fn content_type(&self) -> &'static str {
        let extension = Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") => "text/csv",
            Some("xls") => "application/vnd.ms-excel",
            Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            _ => "application/octet-stream",
        }
    }
}

/// Single-slot holder for the selected file
#[derive(Debug, Default)]
pub struct UploadCoordinator {
    selected: Option<SelectedFile>,
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection unconditionally, returning the previous one
    pub fn select(&mut self, file: SelectedFile) -> Option<SelectedFile> {
        self.selected.replace(file)
    }

    pub fn clear(&mut self) -> Option<SelectedFile> {
        self.selected.take()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_replaces_previous() {
        let mut upload = UploadCoordinator::new();
        assert!(upload.select(SelectedFile::from_bytes("a.csv", b"x".to_vec())).is_none());

        let previous = upload.select(SelectedFile::from_bytes("b.xlsx", b"yz".to_vec()));
        assert_eq!(previous.map(|f| f.name().to_string()), Some("a.csv".to_string()));
        assert_eq!(upload.selected().map(SelectedFile::name), Some("b.xlsx"));
        assert_eq!(upload.selected().map(SelectedFile::len), Some(2));
    }

    #[test]
    fn test_clear_drops_selection() {
        let mut upload = UploadCoordinator::new();
        upload.select(SelectedFile::from_bytes("a.csv", Vec::new()));
        assert!(upload.clear().is_some());
        assert!(upload.selected().is_none());
        assert!(upload.clear().is_none());
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(SelectedFile::from_bytes("people.CSV", Vec::new()).content_type(), "text/csv");
        assert_eq!(
            SelectedFile::from_bytes("p.xls", Vec::new()).content_type(),
            "application/vnd.ms-excel"
        );
        assert!(SelectedFile::from_bytes("p.xlsx", Vec::new())
            .content_type()
            .contains("spreadsheetml"));
        // Unknown types are still uploaded; the service decides
        assert_eq!(
            SelectedFile::from_bytes("notes.txt", Vec::new()).content_type(),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_from_path_reads_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pessoas.csv");
        std::fs::write(&path, "Nome,Interesses\nAna,Cinema\n").unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(file.name(), "pessoas.csv");
        assert!(file.data().starts_with(b"Nome,"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SelectedFile::from_path(&dir.path().join("missing.csv")).await;
        assert!(matches!(result, Err(crate::ClientError::Common(_))));
    }
}
