//! Scripted stand-ins for object storage, the Pool Manager, and the
//! language model.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use crate::domain::ClaimedPod;
use crate::domain::ports::{
    CompletionRequest, CreatePoolPayload, LanguageModel, LanguageModelError, ObjectStorage,
    ObjectStorageError, PoolManager, PoolManagerError, PoolSummary, PresignRequest,
    TextDeltaStream,
};

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex"),
    }
}

/// Object storage that signs nothing and records deletes.
#[derive(Debug, Default)]
pub struct RecordingObjectStorage {
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl RecordingObjectStorage {
    /// Make every subsequent delete fail with a 500 rejection.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<String> {
        locked(&self.deleted).clone()
    }
}

#[async_trait]
impl ObjectStorage for RecordingObjectStorage {
    async fn presign(&self, request: PresignRequest) -> Result<String, ObjectStorageError> {
        Ok(format!(
            "https://storage.test/{key}?method={method}&expires={expires}",
            key = request.key,
            method = request.method.as_str(),
            expires = request.expires_in.as_secs(),
        ))
    }

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ObjectStorageError::rejected(500_u16, "scripted failure"));
        }
        locked(&self.deleted).push(key.to_owned());
        Ok(())
    }
}

/// Pool Manager returning queued responses in order.
#[derive(Debug, Default)]
pub struct ScriptedPoolManager {
    create_results: Mutex<VecDeque<Result<PoolSummary, PoolManagerError>>>,
    claim_result: Mutex<Option<Result<ClaimedPod, PoolManagerError>>>,
    create_calls: Mutex<Vec<(String, CreatePoolPayload)>>,
    claim_calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedPoolManager {
    /// Queue the outcome of the next `create_pool` call.
    pub fn push_create(&self, result: Result<PoolSummary, PoolManagerError>) {
        locked(&self.create_results).push_back(result);
    }

    /// Outcome of every `claim_pod` call.
    pub fn set_claim(&self, result: Result<ClaimedPod, PoolManagerError>) {
        *locked(&self.claim_result) = Some(result);
    }

    /// `(api_key, payload)` for each create call.
    pub fn create_calls(&self) -> Vec<(String, CreatePoolPayload)> {
        locked(&self.create_calls).clone()
    }

    /// `(api_key, pool_name)` for each claim call.
    pub fn claim_calls(&self) -> Vec<(String, String)> {
        locked(&self.claim_calls).clone()
    }
}

#[async_trait]
impl PoolManager for ScriptedPoolManager {
    async fn create_pool(
        &self,
        api_key: &str,
        payload: &CreatePoolPayload,
    ) -> Result<PoolSummary, PoolManagerError> {
        locked(&self.create_calls).push((api_key.to_owned(), payload.clone()));
        locked(&self.create_results)
            .pop_front()
            .unwrap_or_else(|| Err(PoolManagerError::transport("no scripted response")))
    }

    async fn claim_pod(
        &self,
        api_key: &str,
        pool_name: &str,
    ) -> Result<ClaimedPod, PoolManagerError> {
        locked(&self.claim_calls).push((api_key.to_owned(), pool_name.to_owned()));
        locked(&self.claim_result)
            .clone()
            .unwrap_or_else(|| Err(PoolManagerError::transport("no scripted response")))
    }
}

/// Language model replaying a fixed reply.
///
/// Streaming splits the reply into the configured chunks; a scripted failure
/// is yielded after them.
#[derive(Debug, Default)]
pub struct ScriptedLanguageModel {
    reply: Mutex<String>,
    chunks: Mutex<Vec<String>>,
    stream_failure: Mutex<Option<LanguageModelError>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLanguageModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        let model = Self::default();
        *locked(&model.reply) = reply.into();
        model
    }

    pub fn streaming<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::default();
        *locked(&model.chunks) = chunks.into_iter().map(Into::into).collect();
        model
    }

    /// End the stream with `error` after the scripted chunks.
    pub fn failing_with(self, error: LanguageModelError) -> Self {
        *locked(&self.stream_failure) = Some(error);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LanguageModelError> {
        locked(&self.requests).push(request);
        Ok(locked(&self.reply).clone())
    }

    async fn stream(
        &self,
        request: CompletionRequest,
    ) -> Result<TextDeltaStream, LanguageModelError> {
        locked(&self.requests).push(request);
        let mut items: Vec<Result<String, LanguageModelError>> =
            locked(&self.chunks).iter().cloned().map(Ok).collect();
        if let Some(error) = locked(&self.stream_failure).clone() {
            items.push(Err(error));
        }
        Ok(stream::iter(items).boxed())
    }
}
