use std::error::Error;

use thiserror::Error;

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A backend call that failed. `operation` is the API name, the SDK error is kept as source.
#[derive(Debug, Error)]
#[error("{operation} failed")]
pub struct StoreError {
    pub operation: &'static str,
    #[source]
    pub source: BoxError,
}

impl StoreError {
    pub fn new<E: Into<BoxError>>(
        operation: &'static str,
        source: E,
    ) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One entry of a version listing: either a stored version or a delete marker.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: Option<String>,
    /// payload size; always 0 for delete markers
    pub size: i64,
}

impl ObjectVersion {
    pub fn new<S: Into<String>>(
        key: S,
        version_id: Option<String>,
        size: i64,
    ) -> Self {
        Self {
            key: key.into(),
            version_id,
            size,
        }
    }

    pub fn marker<S: Into<String>>(
        key: S,
        version_id: Option<String>,
    ) -> Self {
        Self::new(key, version_id, 0)
    }

    pub fn version_label(&self) -> &str {
        self.version_id.as_deref().unwrap_or("null")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionPage {
    pub versions: Vec<ObjectVersion>,
    pub delete_markers: Vec<ObjectVersion>,
    pub is_truncated: bool,
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

/// Everything the cleanup workflow needs from an object store.
///
/// Calls are awaited one at a time; implementations don't have to be `Send`.
pub trait BucketStore: Sized {
    async fn list_buckets(&self) -> StoreResult<Vec<String>>;

    /// Raw location constraint of `bucket`, `None` when the backend reports none.
    async fn bucket_location(
        &self,
        bucket: &str,
    ) -> StoreResult<Option<String>>;

    async fn list_object_versions(
        &self,
        bucket: &str,
        key_marker: Option<String>,
        version_id_marker: Option<String>,
    ) -> StoreResult<VersionPage>;

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> StoreResult<()>;

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> StoreResult<ObjectPage>;

    /// Delete up to 1000 current objects in one request.
    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> StoreResult<()>;

    async fn delete_bucket(
        &self,
        bucket: &str,
    ) -> StoreResult<()>;

    /// A store talking to `region` with the same credentials.
    fn with_region(
        &self,
        region: &str,
    ) -> Self;
}
