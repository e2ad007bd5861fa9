use tracing::info;

use crate::error::{CleanupError, Phase};
use crate::prompt::Prompter;
use crate::purge::{EmptyReport, empty_bucket};
use crate::s3::region_for_location;
use crate::storage::{BucketStore, StoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    NoBuckets,
    NothingSelected,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Deleted {
        bucket: String,
        region: String,
        report: EmptyReport,
    },
    Aborted(AbortReason),
}

pub async fn list_bucket_names<S: BucketStore>(store: &S) -> Result<Vec<String>, CleanupError> {
    store.list_buckets().await.map_err(CleanupError::List)
}

/// Location constraint of `bucket`; the empty string when it has none.
pub async fn resolve_region<S: BucketStore>(
    store: &S,
    bucket: &str,
) -> StoreResult<String> {
    let location = store.bucket_location(bucket).await?;

    Ok(location.unwrap_or_default())
}

pub async fn delete_bucket<S: BucketStore>(
    store: &S,
    bucket: &str,
) -> Result<(), CleanupError> {
    store
        .delete_bucket(bucket)
        .await
        .map_err(|source| CleanupError::DeleteBucket {
            bucket: bucket.to_owned(),
            source,
        })
}

pub fn confirmation_label(bucket: &str) -> String {
    format!("Are you sure you want to delete the bucket '{bucket}' (yes/no)")
}

/// List, select, confirm, resolve region, empty, delete.
///
/// Nothing is mutated before the operator answered `yes`.
pub async fn run_cleanup<S: BucketStore, P: Prompter>(
    store: &S,
    prompter: &mut P,
) -> Result<Outcome, CleanupError> {
    let buckets = list_bucket_names(store).await?;
    info!(count = buckets.len(), "listed buckets");

    if buckets.is_empty() {
        return Ok(Outcome::Aborted(AbortReason::NoBuckets));
    }

    let choice = prompter
        .select("Select bucket to delete", &buckets)
        .map_err(|source| CleanupError::Prompt {
            phase: Phase::Select,
            source,
        })?;

    let Some(bucket) = choice.and_then(|index| buckets.get(index)) else {
        return Ok(Outcome::Aborted(AbortReason::NothingSelected));
    };

    let answer = prompter
        .confirm(&confirmation_label(bucket))
        .map_err(|source| CleanupError::Prompt {
            phase: Phase::Confirm,
            source,
        })?;

    if !answer.is_yes() {
        return Ok(Outcome::Aborted(AbortReason::Declined));
    }

    // most mutating calls must go to the bucket's own region
    let location = resolve_region(store, bucket)
        .await
        .map_err(|source| CleanupError::Location {
            bucket: bucket.clone(),
            source,
        })?;
    let region = region_for_location(&location).to_owned();
    info!(%bucket, %region, "resolved bucket region");

    let regional = store.with_region(&region);

    eprintln!("Now deleting: {bucket}");

    let report = empty_bucket(&regional, bucket)
        .await
        .map_err(|source| CleanupError::Empty {
            bucket: bucket.clone(),
            source,
        })?;

    delete_bucket(&regional, bucket).await?;
    info!(%bucket, "bucket deleted");

    Ok(Outcome::Deleted {
        bucket: bucket.clone(),
        region,
        report,
    })
}
