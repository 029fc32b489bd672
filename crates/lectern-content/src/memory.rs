//! In-memory content source.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ContentError;
use crate::source::{validate_path, ContentSource, RawFile, WriteReceipt, WriteRequest};

#[derive(Debug, Default)]
struct Inner {
    files: HashMap<String, (String, u64)>,
    failures: HashMap<String, u16>,
    reads: Vec<String>,
}

/// A content source backed by a map, recording every read.
///
/// Writes follow the same conflict rule as the contents API: replacing an
/// existing file requires the sha it was read at.
#[derive(Debug, Default)]
pub struct MemorySource {
    inner: Mutex<Inner>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    pub fn with_file(self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Make reads of `path` fail with an API error of the given status.
    pub fn with_failure(self, path: impl Into<String>, status: u16) -> Self {
        self.lock().failures.insert(path.into(), status);
        self
    }

    pub fn insert(&self, path: impl Into<String>, contents: impl Into<String>) {
        let mut inner = self.lock();
        let path = path.into();
        let version = inner.files.get(&path).map(|(_, v)| v + 1).unwrap_or(1);
        inner.files.insert(path, (contents.into(), version));
    }

    /// Current contents of a file.
    pub fn get(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|(c, _)| c.clone())
    }

    /// Paths read so far, in order.
    pub fn reads(&self) -> Vec<String> {
        self.lock().reads.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-read; the map is still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn sha_for(version: u64) -> String {
    format!("mem-{}", version)
}

#[async_trait]
impl ContentSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, path: &str) -> Result<RawFile, ContentError> {
        let path = validate_path(path)?;
        let mut inner = self.lock();
        inner.reads.push(path.to_string());

        if let Some(status) = inner.failures.get(path) {
            return Err(ContentError::Api {
                status: *status,
                path: path.to_string(),
                message: "injected failure".to_string(),
            });
        }

        match inner.files.get(path) {
            Some((contents, version)) => Ok(RawFile {
                path: path.to_string(),
                sha: Some(sha_for(*version)),
                contents: contents.clone(),
            }),
            None => Err(ContentError::not_found(path, "memory")),
        }
    }

    async fn write(&self, request: &WriteRequest) -> Result<WriteReceipt, ContentError> {
        let path = validate_path(&request.path)?;
        let mut inner = self.lock();

        let next_version = match inner.files.get(path) {
            Some((_, version)) => {
                if request.sha.as_deref() != Some(sha_for(*version).as_str()) {
                    return Err(ContentError::Api {
                        status: 409,
                        path: path.to_string(),
                        message: "sha does not match".to_string(),
                    });
                }
                version + 1
            }
            None => 1,
        };

        inner
            .files
            .insert(path.to_string(), (request.contents.clone(), next_version));

        Ok(WriteReceipt {
            sha: Some(sha_for(next_version)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &str, contents: &str, sha: Option<&str>) -> WriteRequest {
        WriteRequest {
            path: path.to_string(),
            contents: contents.to_string(),
            sha: sha.map(String::from),
            message: "edit".to_string(),
        }
    }

    #[tokio::test]
    async fn records_reads_in_order() {
        let source = MemorySource::new().with_file("a.json", "{}");

        let _ = source.read("a.json").await;
        let _ = source.read("b.json").await;

        assert_eq!(source.reads(), vec!["a.json", "b.json"]);
    }

    #[tokio::test]
    async fn write_requires_current_sha() {
        let source = MemorySource::new().with_file("a.md", "one");
        let read = source.read("a.md").await.unwrap();

        let stale = source.write(&write("a.md", "two", Some("mem-0"))).await;
        assert!(matches!(stale, Err(ContentError::Api { status: 409, .. })));

        let receipt = source
            .write(&write("a.md", "two", read.sha.as_deref()))
            .await
            .unwrap();

        assert_eq!(receipt.sha.as_deref(), Some("mem-2"));
        assert_eq!(source.get("a.md").as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn injected_failures_are_not_not_found() {
        let source = MemorySource::new().with_failure("a.json", 500);

        let err = source.read("a.json").await.unwrap_err();

        assert!(!err.is_not_found());
    }
}
