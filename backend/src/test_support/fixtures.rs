//! Canned entities and a fully wired set of in-memory ports.

use std::sync::Arc;

use uuid::Uuid;

use super::{
    FixedClock, InMemoryStore, RecordingObjectStorage, RecordingSleeper, ScriptedLanguageModel,
    ScriptedPoolManager,
};
use crate::domain::ports::{FieldCipher, FixtureLoginService};
use crate::domain::{
    AgentService, AgentServicePorts, EncryptedField, PoolService, PoolServicePorts, SecretKind,
    TaskService, UserId, Workspace, WorkspaceAccess, WorkspaceLogoService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::crypto::AesGcmFieldCipher;

/// Key id of [`test_cipher`].
pub const TEST_KEY_ID: &str = "test-key";
const TEST_KEY_HEX: &str = "8f2c1e4a9b7d6c5e3f1a2b4c6d8e0f1a3b5c7d9e1f2a4b6c8d0e2f4a6b8c0d2e";

/// Real AES-GCM cipher with a fixed key.
pub fn test_cipher() -> AesGcmFieldCipher {
    match AesGcmFieldCipher::new(TEST_KEY_ID, TEST_KEY_HEX) {
        Ok(cipher) => cipher,
        Err(error) => panic!("test key rejected: {error}"),
    }
}

/// Seal `plaintext` with [`test_cipher`].
pub fn seal(kind: SecretKind, plaintext: &str) -> EncryptedField {
    let at = mockable::Clock::utc(&FixedClock::at(2025, 1, 1, 0, 0, 0));
    match test_cipher().encrypt(kind, plaintext, at) {
        Ok(field) => field,
        Err(error) => panic!("test encryption failed: {error}"),
    }
}

/// Fresh random user.
pub fn user() -> UserId {
    UserId::random()
}

/// Active workspace owned by `owner`.
pub fn workspace(slug: &str, owner: &UserId) -> Workspace {
    Workspace {
        id: Uuid::new_v4(),
        name: slug.to_uppercase(),
        slug: slug.to_owned(),
        owner_id: *owner.as_uuid(),
        logo_key: None,
        deleted: false,
        deleted_at: None,
    }
}

/// Services wired to in-memory and scripted ports.
pub struct TestHarness {
    pub store: InMemoryStore,
    pub storage: Arc<RecordingObjectStorage>,
    pub pool_manager: Arc<ScriptedPoolManager>,
    pub model: Arc<ScriptedLanguageModel>,
    pub sleeper: Arc<RecordingSleeper>,
    pub clock: Arc<FixedClock>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            store: InMemoryStore::default(),
            storage: Arc::new(RecordingObjectStorage::default()),
            pool_manager: Arc::new(ScriptedPoolManager::default()),
            model: Arc::new(ScriptedLanguageModel::default()),
            sleeper: Arc::new(RecordingSleeper::default()),
            clock: Arc::new(FixedClock::at(2025, 3, 1, 9, 0, 0)),
        }
    }

    /// Replace the language model.
    pub fn with_model(mut self, model: ScriptedLanguageModel) -> Self {
        self.model = Arc::new(model);
        self
    }

    /// Handler state backed by this harness.
    pub fn http_state(&self) -> HttpState {
        let store = Arc::new(self.store.clone());
        let access = WorkspaceAccess::new(store.clone());
        let logos = Arc::new(WorkspaceLogoService::new(
            access.clone(),
            self.storage.clone(),
            self.clock.clone(),
        ));
        HttpState::new(HttpStatePorts {
            login: Arc::new(FixtureLoginService),
            tasks: Arc::new(TaskService::new(access, store.clone(), self.clock.clone())),
            logos: logos.clone(),
            logo_urls: logos,
            pools: Arc::new(PoolService::new(PoolServicePorts {
                workspaces: store.clone(),
                swarms: store.clone(),
                github_credentials: store.clone(),
                pool_manager: self.pool_manager.clone(),
                cipher: Arc::new(test_cipher()),
                sleeper: self.sleeper.clone(),
            })),
            agent: Arc::new(AgentService::new(AgentServicePorts {
                workspaces: store.clone(),
                tasks: store.clone(),
                messages: store,
                model: self.model.clone(),
                clock: self.clock.clone(),
            })),
        })
    }
}
