// # File Design Source
//
// Reads design documents from the local filesystem for `file://` references.

use async_trait::async_trait;
use tokio::fs;
use url::Url;

use crate::traits::DesignSource;
use crate::Error;

/// Local-file design source
///
/// # Example
///
/// ```rust,no_run
/// use drydock_core::source::FileSource;
/// use drydock_core::traits::DesignSource;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = FileSource::new();
///     let url = url::Url::parse("file:///etc/drydock/site.yaml")?;
///     let text = source.fetch(&url).await?;
///     println!("{} bytes", text.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DesignSource for FileSource {
    fn scheme(&self) -> &str {
        "file"
    }

    async fn fetch(&self, design_ref: &Url) -> Result<String, Error> {
        let path = design_ref.to_file_path().map_err(|_| {
            Error::invalid_argument(format!("Design reference {} is not a local file path", design_ref))
        })?;

        tracing::debug!("Reading design document {}", path.display());

        fs::read_to_string(&path).await.map_err(|e| {
            Error::processing(format!("Failed to read design document {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "---\nkind: Region\n").unwrap();

        let url = Url::from_file_path(file.path()).unwrap();
        let text = FileSource::new().fetch(&url).await.unwrap();
        assert!(text.contains("Region"));
    }

    #[test]
    fn test_missing_file_is_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("absent.yaml")).unwrap();

        let err = tokio_test::block_on(FileSource::new().fetch(&url)).unwrap_err();
        assert!(err.is_processing());
    }
}
