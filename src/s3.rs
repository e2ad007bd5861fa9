use aws_config::BehaviorVersion;
use aws_config::SdkConfig;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use tracing::debug;

use crate::storage::{BucketStore, ObjectPage, ObjectVersion, StoreError, StoreResult, VersionPage};

/// Region used when neither the environment nor a bucket's location says otherwise.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Map a bucket location constraint to the region a client should be built for.
///
/// Buckets in the default region report no constraint at all, and some very old
/// buckets still report the legacy `EU` alias.
pub fn region_for_location(location: &str) -> &str {
    match location {
        "" => DEFAULT_REGION,
        "EU" => "eu-west-1",
        other => other,
    }
}

#[derive(Debug, Clone)]
pub struct S3Store {
    config: SdkConfig,
    client: Client,
}

impl S3Store {
    pub fn new(config: SdkConfig) -> Self {
        let client = Client::new(&config);
        Self { config, client }
    }

    /// Load credentials and region the way the AWS CLI does (env, profile, IMDS, ...).
    pub async fn from_env() -> Self {
        let region = RegionProviderChain::default_provider().or_else(DEFAULT_REGION);
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        Self::new(config)
    }

    pub fn region(&self) -> Option<&str> {
        self.client.config().region().map(|region| region.as_ref())
    }
}

impl BucketStore for S3Store {
    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|err| StoreError::new("ListBuckets", err))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|bucket| bucket.name().map(ToOwned::to_owned))
            .collect())
    }

    async fn bucket_location(
        &self,
        bucket: &str,
    ) -> StoreResult<Option<String>> {
        let output = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| StoreError::new("GetBucketLocation", err))?;

        Ok(output
            .location_constraint()
            .map(|constraint| constraint.as_str().to_owned()))
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        key_marker: Option<String>,
        version_id_marker: Option<String>,
    ) -> StoreResult<VersionPage> {
        let output = self
            .client
            .list_object_versions()
            .bucket(bucket)
            .set_key_marker(key_marker)
            .set_version_id_marker(version_id_marker)
            .send()
            .await
            .map_err(|err| StoreError::new("ListObjectVersions", err))?;

        let versions = output
            .versions()
            .iter()
            .filter_map(|version| {
                let key = version.key()?;
                Some(ObjectVersion::new(
                    key,
                    version.version_id().map(ToOwned::to_owned),
                    version.size().unwrap_or_default(),
                ))
            })
            .collect();

        let delete_markers = output
            .delete_markers()
            .iter()
            .filter_map(|marker| {
                let key = marker.key()?;
                Some(ObjectVersion::marker(
                    key,
                    marker.version_id().map(ToOwned::to_owned),
                ))
            })
            .collect();

        Ok(VersionPage {
            versions,
            delete_markers,
            is_truncated: output.is_truncated().unwrap_or_default(),
            next_key_marker: output.next_key_marker().map(ToOwned::to_owned),
            next_version_id_marker: output.next_version_id_marker().map(ToOwned::to_owned),
        })
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(version_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| StoreError::new("DeleteObject", err))?;

        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> StoreResult<ObjectPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|err| StoreError::new("ListObjectsV2", err))?;

        Ok(ObjectPage {
            keys: output
                .contents()
                .iter()
                .filter_map(|object| object.key().map(ToOwned::to_owned))
                .collect(),
            is_truncated: output.is_truncated().unwrap_or_default(),
            next_continuation_token: output.next_continuation_token().map(ToOwned::to_owned),
        })
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> StoreResult<()> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StoreError::new("DeleteObjects", err))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|err| StoreError::new("DeleteObjects", err))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|err| StoreError::new("DeleteObjects", err))?;

        // quiet mode: only failures are reported back
        if let Some(failed) = output.errors().first() {
            return Err(StoreError::new(
                "DeleteObjects",
                format!(
                    "could not delete `{}` ({} of {} keys failed): {} {}",
                    failed.key().unwrap_or_default(),
                    output.errors().len(),
                    keys.len(),
                    failed.code().unwrap_or("UnknownError"),
                    failed.message().unwrap_or_default(),
                ),
            ));
        }

        Ok(())
    }

    async fn delete_bucket(
        &self,
        bucket: &str,
    ) -> StoreResult<()> {
        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| StoreError::new("DeleteBucket", err))?;

        Ok(())
    }

    fn with_region(
        &self,
        region: &str,
    ) -> Self {
        debug!(region, "building region-scoped client");

        let config = aws_sdk_s3::config::Builder::from(&self.config)
            .region(Region::new(region.to_owned()))
            .build();

        Self {
            config: self.config.clone(),
            client: Client::from_conf(config),
        }
    }
}
