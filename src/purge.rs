use byte_unit::{Byte, UnitType};
use owo_colors::OwoColorize;
use tabled::Tabled;
use thiserror::Error;
use tracing::{debug, info};

use crate::storage::{BucketStore, ObjectVersion, StoreError, StoreResult, VersionPage};

/// `DeleteObjects` accepts at most this many keys per request.
pub const BATCH_DELETE_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum EmptyError {
    #[error("listing object versions failed")]
    ListVersions(#[source] StoreError),

    #[error("deleting {kind} `{key}` (version {version_id}) failed")]
    DeleteVersion {
        kind: &'static str,
        key: String,
        version_id: String,
        #[source]
        source: StoreError,
    },

    #[error("listing current objects failed")]
    ListObjects(#[source] StoreError),

    #[error("batch delete of {count} objects failed")]
    BatchDelete {
        count: usize,
        #[source]
        source: StoreError,
    },
}

/// What a successful [`empty_bucket`] run removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyReport {
    pub versions: u64,
    pub delete_markers: u64,
    pub current_objects: u64,
    pub bytes: i64,
}

impl EmptyReport {
    pub const fn delete_calls(&self) -> u64 {
        self.versions + self.delete_markers
    }

    pub fn rows(&self) -> Vec<EmptyReportRow> {
        vec![
            EmptyReportRow::new("versions", self.versions),
            EmptyReportRow::new("delete markers", self.delete_markers),
            EmptyReportRow::new("current objects", self.current_objects),
            EmptyReportRow::new("payload", human_size(self.bytes)).bold(),
        ]
    }
}

#[derive(Tabled)]
pub struct EmptyReportRow {
    removed: String,
    amount: String,
}

impl EmptyReportRow {
    fn new<S: ToString>(
        removed: &str,
        amount: S,
    ) -> Self {
        Self {
            removed: removed.to_owned(),
            amount: amount.to_string(),
        }
    }

    fn bold(mut self) -> Self {
        self.removed = self.removed.bold().to_string();
        self.amount = self.amount.bold().to_string();

        self
    }
}

pub fn human_size(bytes: i64) -> String {
    let byte = Byte::from_i64(bytes)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Decimal);

    format!("{byte:#.2}")
}

/// Explicit "fetch next page" iteration over a version listing.
///
/// Not restartable: once the backend says there is nothing more, or a request
/// fails, `next` keeps returning `None`.
pub struct VersionPages<'a, S: BucketStore> {
    store: &'a S,
    bucket: &'a str,
    key_marker: Option<String>,
    version_id_marker: Option<String>,
    done: bool,
}

impl<'a, S: BucketStore> VersionPages<'a, S> {
    pub const fn new(
        store: &'a S,
        bucket: &'a str,
    ) -> Self {
        Self {
            store,
            bucket,
            key_marker: None,
            version_id_marker: None,
            done: false,
        }
    }

    pub async fn next(&mut self) -> Option<StoreResult<VersionPage>> {
        if self.done {
            return None;
        }

        let result = self
            .store
            .list_object_versions(
                self.bucket,
                self.key_marker.take(),
                self.version_id_marker.take(),
            )
            .await;

        match &result {
            Ok(page) if page.is_truncated && page.next_key_marker.is_some() => {
                self.key_marker.clone_from(&page.next_key_marker);
                self.version_id_marker.clone_from(&page.next_version_id_marker);
            }
            _ => self.done = true,
        }

        Some(result)
    }
}

async fn delete_version<S: BucketStore>(
    store: &S,
    bucket: &str,
    kind: &'static str,
    version: &ObjectVersion,
) -> Result<(), EmptyError> {
    eprintln!("Deleting {kind}: {}", version.key.dimmed());
    debug!(bucket, key = %version.key, version_id = version.version_label(), kind, "delete");

    store
        .delete_object(bucket, &version.key, version.version_id.as_deref())
        .await
        .map_err(|source| EmptyError::DeleteVersion {
            kind,
            key: version.key.clone(),
            version_id: version.version_label().to_owned(),
            source,
        })
}

/// Remove every version and delete marker, one call each.
///
/// Stops at the first failed delete; whatever was deleted before stays deleted.
pub async fn purge_versions<S: BucketStore>(
    store: &S,
    bucket: &str,
    report: &mut EmptyReport,
) -> Result<(), EmptyError> {
    let mut pages = VersionPages::new(store, bucket);

    while let Some(page) = pages.next().await {
        let page = page.map_err(EmptyError::ListVersions)?;

        for version in &page.versions {
            delete_version(store, bucket, "version", version).await?;
            report.versions += 1;
            report.bytes += version.size;
        }

        for marker in &page.delete_markers {
            delete_version(store, bucket, "delete marker", marker).await?;
            report.delete_markers += 1;
        }
    }

    Ok(())
}

/// Delete whatever the plain object listing still shows, in batches.
///
/// Covers backends where the version listing is unsupported or empty.
pub async fn purge_current_objects<S: BucketStore>(
    store: &S,
    bucket: &str,
    report: &mut EmptyReport,
) -> Result<(), EmptyError> {
    let mut token = None;

    loop {
        let page = store
            .list_objects(bucket, token)
            .await
            .map_err(EmptyError::ListObjects)?;

        for batch in page.keys.chunks(BATCH_DELETE_LIMIT) {
            eprintln!("Deleting {} current objects", batch.len());

            store
                .delete_objects(bucket, batch)
                .await
                .map_err(|source| EmptyError::BatchDelete {
                    count: batch.len(),
                    source,
                })?;
            report.current_objects += batch.len() as u64;
        }

        match page.next_continuation_token {
            Some(next) if page.is_truncated => token = Some(next),
            _ => return Ok(()),
        }
    }
}

pub async fn empty_bucket<S: BucketStore>(
    store: &S,
    bucket: &str,
) -> Result<EmptyReport, EmptyError> {
    let mut report = EmptyReport::default();

    purge_versions(store, bucket, &mut report).await?;
    purge_current_objects(store, bucket, &mut report).await?;

    info!(
        bucket,
        versions = report.versions,
        delete_markers = report.delete_markers,
        current_objects = report.current_objects,
        "bucket emptied"
    );

    Ok(report)
}
