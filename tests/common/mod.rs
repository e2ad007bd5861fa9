#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io;
use std::rc::Rc;

use s3_cleanup::prompt::{Confirmation, PromptError, Prompter};
use s3_cleanup::storage::{BucketStore, ObjectPage, ObjectVersion, StoreError, StoreResult, VersionPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListBuckets,
    BucketLocation(String),
    ListObjectVersions(String),
    DeleteObject {
        region: String,
        bucket: String,
        key: String,
        version_id: Option<String>,
    },
    ListObjects(String),
    DeleteObjects {
        region: String,
        bucket: String,
        keys: Vec<String>,
    },
    DeleteBucket {
        region: String,
        bucket: String,
    },
}

impl Call {
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::DeleteObject { .. } | Self::DeleteObjects { .. } | Self::DeleteBucket { .. }
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    size: i64,
    delete_marker: bool,
}

#[derive(Debug, Default)]
struct Bucket {
    location: Option<String>,
    versions: BTreeMap<(String, Option<String>), Entry>,
    /// visible through the plain object listing only
    objects: BTreeSet<String>,
}

#[derive(Debug)]
struct State {
    buckets: BTreeMap<String, Bucket>,
    calls: Vec<Call>,
    version_page_size: usize,
    object_page_size: usize,
    fail_list_buckets: bool,
    fail_location: bool,
    fail_delete_key: Option<String>,
    fail_delete_bucket: bool,
    fail_batch_key: Option<String>,
    /// the n-th (0-based) version listing fails
    fail_version_listing_at: Option<usize>,
    version_listings: usize,
}

fn failure(
    operation: &'static str,
    message: &str,
) -> StoreError {
    StoreError::new(operation, message.to_owned())
}

/// In-memory object store that records every call made against it.
///
/// Clones and region-scoped copies share the same buckets and call log.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    region: String,
    state: Rc<RefCell<State>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            region: "default".to_owned(),
            state: Rc::new(RefCell::new(State {
                buckets: BTreeMap::new(),
                calls: Vec::new(),
                version_page_size: 1000,
                object_page_size: 1000,
                fail_list_buckets: false,
                fail_location: false,
                fail_delete_key: None,
                fail_delete_bucket: false,
                fail_batch_key: None,
                fail_version_listing_at: None,
                version_listings: 0,
            })),
        }
    }
}

impl MemoryStore {
    pub fn with_buckets(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store.add_bucket(name, None);
        }
        store
    }

    pub fn add_bucket(
        &self,
        name: &str,
        location: Option<&str>,
    ) {
        self.state.borrow_mut().buckets.insert(
            name.to_owned(),
            Bucket {
                location: location.map(ToOwned::to_owned),
                ..Bucket::default()
            },
        );
    }

    pub fn add_version(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
        size: i64,
    ) {
        self.insert_entry(bucket, key, version_id, size, false);
    }

    pub fn add_delete_marker(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
    ) {
        self.insert_entry(bucket, key, version_id, 0, true);
    }

    pub fn add_object(
        &self,
        bucket: &str,
        key: &str,
    ) {
        let mut state = self.state.borrow_mut();
        let bucket = state.buckets.entry(bucket.to_owned()).or_default();
        bucket.objects.insert(key.to_owned());
    }

    fn insert_entry(
        &self,
        bucket: &str,
        key: &str,
        version_id: &str,
        size: i64,
        delete_marker: bool,
    ) {
        let mut state = self.state.borrow_mut();
        let bucket = state.buckets.entry(bucket.to_owned()).or_default();
        bucket.versions.insert(
            (key.to_owned(), Some(version_id.to_owned())),
            Entry { size, delete_marker },
        );
    }

    pub fn set_version_page_size(
        &self,
        size: usize,
    ) {
        self.state.borrow_mut().version_page_size = size;
    }

    pub fn set_object_page_size(
        &self,
        size: usize,
    ) {
        self.state.borrow_mut().object_page_size = size;
    }

    pub fn fail_list_buckets(&self) {
        self.state.borrow_mut().fail_list_buckets = true;
    }

    pub fn fail_location(&self) {
        self.state.borrow_mut().fail_location = true;
    }

    pub fn fail_delete_of(
        &self,
        key: &str,
    ) {
        self.state.borrow_mut().fail_delete_key = Some(key.to_owned());
    }

    pub fn fail_batch_delete_of(
        &self,
        key: &str,
    ) {
        self.state.borrow_mut().fail_batch_key = Some(key.to_owned());
    }

    pub fn fail_delete_bucket(&self) {
        self.state.borrow_mut().fail_delete_bucket = true;
    }

    pub fn fail_version_listing_at(
        &self,
        index: usize,
    ) {
        self.state.borrow_mut().fail_version_listing_at = Some(index);
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn delete_object_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::DeleteObject { .. }))
            .count()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.state.borrow().buckets.keys().cloned().collect()
    }

    pub fn has_bucket(
        &self,
        name: &str,
    ) -> bool {
        self.state.borrow().buckets.contains_key(name)
    }

    /// Versions, markers and current objects still stored in `bucket`.
    pub fn remaining(
        &self,
        bucket: &str,
    ) -> usize {
        self.state
            .borrow()
            .buckets
            .get(bucket)
            .map_or(0, |bucket| bucket.versions.len() + bucket.objects.len())
    }

    fn record(
        &self,
        call: Call,
    ) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl BucketStore for MemoryStore {
    async fn list_buckets(&self) -> StoreResult<Vec<String>> {
        self.record(Call::ListBuckets);

        if self.state.borrow().fail_list_buckets {
            return Err(failure("ListBuckets", "AccessDenied"));
        }

        Ok(self.bucket_names())
    }

    async fn bucket_location(
        &self,
        bucket: &str,
    ) -> StoreResult<Option<String>> {
        self.record(Call::BucketLocation(bucket.to_owned()));

        let state = self.state.borrow();
        if state.fail_location {
            return Err(failure("GetBucketLocation", "AccessDenied"));
        }

        state
            .buckets
            .get(bucket)
            .map(|bucket| bucket.location.clone())
            .ok_or_else(|| failure("GetBucketLocation", "NoSuchBucket"))
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        key_marker: Option<String>,
        version_id_marker: Option<String>,
    ) -> StoreResult<VersionPage> {
        self.record(Call::ListObjectVersions(bucket.to_owned()));

        let mut state = self.state.borrow_mut();
        let listing = state.version_listings;
        state.version_listings += 1;
        if state.fail_version_listing_at == Some(listing) {
            return Err(failure("ListObjectVersions", "InternalError"));
        }

        let page_size = state.version_page_size;
        let Some(bucket) = state.buckets.get(bucket) else {
            return Err(failure("ListObjectVersions", "NoSuchBucket"));
        };

        let after = key_marker.map(|key| (key, version_id_marker));
        let mut remaining = bucket
            .versions
            .iter()
            .filter(|(id, _)| after.as_ref().is_none_or(|after| *id > after));

        let entries: Vec<_> = remaining.by_ref().take(page_size).collect();
        let is_truncated = remaining.next().is_some();

        let mut page = VersionPage {
            is_truncated,
            ..VersionPage::default()
        };

        if is_truncated {
            if let Some(((key, version_id), _)) = entries.last() {
                page.next_key_marker = Some(key.clone());
                page.next_version_id_marker.clone_from(version_id);
            }
        }

        for ((key, version_id), entry) in entries {
            if entry.delete_marker {
                page.delete_markers
                    .push(ObjectVersion::marker(key, version_id.clone()));
            } else {
                page.versions
                    .push(ObjectVersion::new(key, version_id.clone(), entry.size));
            }
        }

        Ok(page)
    }

    async fn delete_object(
        &self,
        bucket: &str,
        key: &str,
        version_id: Option<&str>,
    ) -> StoreResult<()> {
        self.record(Call::DeleteObject {
            region: self.region.clone(),
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            version_id: version_id.map(ToOwned::to_owned),
        });

        let mut state = self.state.borrow_mut();
        if state.fail_delete_key.as_deref() == Some(key) {
            return Err(failure("DeleteObject", "AccessDenied"));
        }

        let Some(bucket) = state.buckets.get_mut(bucket) else {
            return Err(failure("DeleteObject", "NoSuchBucket"));
        };
        bucket
            .versions
            .remove(&(key.to_owned(), version_id.map(ToOwned::to_owned)));

        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> StoreResult<ObjectPage> {
        self.record(Call::ListObjects(bucket.to_owned()));

        let state = self.state.borrow();
        let Some(bucket) = state.buckets.get(bucket) else {
            return Err(failure("ListObjectsV2", "NoSuchBucket"));
        };

        let mut remaining = bucket
            .objects
            .iter()
            .filter(|key| continuation_token.as_ref().is_none_or(|token| *key > token));

        let keys: Vec<String> = remaining
            .by_ref()
            .take(state.object_page_size)
            .cloned()
            .collect();
        let is_truncated = remaining.next().is_some();

        Ok(ObjectPage {
            next_continuation_token: if is_truncated { keys.last().cloned() } else { None },
            keys,
            is_truncated,
        })
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> StoreResult<()> {
        self.record(Call::DeleteObjects {
            region: self.region.clone(),
            bucket: bucket.to_owned(),
            keys: keys.to_vec(),
        });

        let mut state = self.state.borrow_mut();
        let fail_key = state.fail_batch_key.clone();
        let Some(bucket) = state.buckets.get_mut(bucket) else {
            return Err(failure("DeleteObjects", "NoSuchBucket"));
        };

        for key in keys {
            if fail_key.as_ref() == Some(key) {
                return Err(failure("DeleteObjects", "AccessDenied"));
            }
            bucket.objects.remove(key);
        }

        Ok(())
    }

    async fn delete_bucket(
        &self,
        bucket: &str,
    ) -> StoreResult<()> {
        self.record(Call::DeleteBucket {
            region: self.region.clone(),
            bucket: bucket.to_owned(),
        });

        let mut state = self.state.borrow_mut();
        if state.fail_delete_bucket {
            return Err(failure("DeleteBucket", "AccessDenied"));
        }

        let Some(found) = state.buckets.get(bucket) else {
            return Err(failure("DeleteBucket", "NoSuchBucket"));
        };
        if !found.versions.is_empty() || !found.objects.is_empty() {
            return Err(failure("DeleteBucket", "BucketNotEmpty"));
        }

        state.buckets.remove(bucket);
        Ok(())
    }

    fn with_region(
        &self,
        region: &str,
    ) -> Self {
        Self {
            region: region.to_owned(),
            state: Rc::clone(&self.state),
        }
    }
}

/// Answers prompts from a script instead of a terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    /// bucket name to pick; `None` backs out of the list
    pub selection: Option<String>,
    /// typed answers, invalid ones are asked again like the terminal prompt does
    pub answers: VecDeque<String>,
    pub fail_select: bool,
    pub labels: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(
        selection: &str,
        answers: &[&str],
    ) -> Self {
        Self {
            selection: Some(selection.to_owned()),
            answers: answers.iter().map(|answer| (*answer).to_owned()).collect(),
            ..Self::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select(
        &mut self,
        label: &str,
        items: &[String],
    ) -> Result<Option<usize>, PromptError> {
        self.labels.push(label.to_owned());

        if self.fail_select {
            let err = io::Error::new(io::ErrorKind::NotConnected, "not a terminal");
            return Err(PromptError(dialoguer::Error::from(err)));
        }

        Ok(self
            .selection
            .as_ref()
            .and_then(|wanted| items.iter().position(|item| item == wanted)))
    }

    fn confirm(
        &mut self,
        label: &str,
    ) -> Result<Confirmation, PromptError> {
        self.labels.push(label.to_owned());

        while let Some(answer) = self.answers.pop_front() {
            if let Some(confirmation) = Confirmation::parse(&answer) {
                return Ok(confirmation);
            }
        }

        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "no answer");
        Err(PromptError(dialoguer::Error::from(err)))
    }
}
