//! Tests for pool provisioning and pod claims.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    MockFieldCipher, MockGithubCredentialsRepository, MockPoolManager, MockSwarmRepository,
    MockWorkspaceRepository,
};
use crate::domain::retry::MockSleeper;
use crate::domain::{
    ClaimedPod, ErrorCode, GithubCredentials, SwarmEnvVar, Workspace, WorkspaceRole,
};

const WORKSPACE: Uuid = Uuid::from_u128(0x10);
const SWARM_ROW: Uuid = Uuid::from_u128(0x20);

fn owner() -> UserId {
    UserId::from_uuid(Uuid::from_u128(1))
}

fn sealed(data: &str) -> EncryptedField {
    EncryptedField {
        data: data.into(),
        iv: "iv".into(),
        tag: "tag".into(),
        key_id: "k1".into(),
        version: "1".into(),
        encrypted_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("time"),
    }
}

fn swarm() -> Swarm {
    Swarm {
        id: SWARM_ROW,
        workspace_id: WORKSPACE,
        swarm_id: Some("swarm-42".into()),
        name: "Acme swarm".into(),
        pool_name: Some("swarm-42".into()),
        pool_api_key: Some(sealed("pool-key")),
        pool_state: PoolState::NotStarted,
        repository_url: Some("https://github.com/acme/widgets.git".into()),
        default_branch: Some("main".into()),
        environment_variables: vec![SwarmEnvVar {
            name: "API_TOKEN".into(),
            value: sealed("env-token"),
        }],
    }
}

fn workspaces(role: Option<WorkspaceRole>) -> MockWorkspaceRepository {
    let mut repo = MockWorkspaceRepository::new();
    repo.expect_find_active_by_id().returning(|_| {
        Ok(Some(Workspace {
            id: WORKSPACE,
            name: "Acme".into(),
            slug: "acme".into(),
            owner_id: *owner().as_uuid(),
            logo_key: None,
            deleted: false,
            deleted_at: None,
        }))
    });
    repo.expect_find_member_role()
        .returning(move |_, _| Ok(role));
    repo
}

fn cipher() -> MockFieldCipher {
    let mut cipher = MockFieldCipher::new();
    cipher
        .expect_decrypt()
        .returning(|kind, field| Ok(Zeroizing::new(format!("{kind}:{}", field.data))));
    cipher
}

fn credentials() -> MockGithubCredentialsRepository {
    let mut repo = MockGithubCredentialsRepository::new();
    repo.expect_find_for_user().returning(|_| {
        Ok(Some(GithubCredentials {
            username: "octocat".into(),
            token: sealed("gh"),
        }))
    });
    repo
}

fn sleeper(expected_sleeps: usize) -> MockSleeper {
    let mut sleeper = MockSleeper::new();
    sleeper
        .expect_sleep()
        .withf(|delay| *delay == Duration::from_millis(1000))
        .times(expected_sleeps)
        .return_const(());
    sleeper
}

struct Harness {
    workspaces: MockWorkspaceRepository,
    swarms: MockSwarmRepository,
    pool_manager: MockPoolManager,
    sleeper: MockSleeper,
}

impl Harness {
    fn new() -> Self {
        Self {
            workspaces: workspaces(None),
            swarms: MockSwarmRepository::new(),
            pool_manager: MockPoolManager::new(),
            sleeper: sleeper(0),
        }
    }

    fn build(self) -> PoolService {
        PoolService::new(PoolServicePorts {
            workspaces: Arc::new(self.workspaces),
            swarms: Arc::new(self.swarms),
            github_credentials: Arc::new(credentials()),
            pool_manager: Arc::new(self.pool_manager),
            cipher: Arc::new(cipher()),
            sleeper: Arc::new(self.sleeper),
        })
    }
}

fn create_request() -> CreatePoolRequest {
    CreatePoolRequest {
        user_id: owner(),
        swarm: SwarmSelector::SwarmId("swarm-42".into()),
        container_files: BTreeMap::from([("Dockerfile".into(), "FROM node:20".into())]),
    }
}

fn summary() -> PoolSummary {
    PoolSummary {
        id: Some("pool-1".into()),
        name: "swarm-42".into(),
        extra: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn create_pool_sends_decrypted_payload_and_marks_complete() {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_swarm_id()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .swarms
        .expect_update_pool_state()
        .withf(|id, state, name| {
            *id == SWARM_ROW && *state == PoolState::Complete && name.as_deref() == Some("swarm-42")
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));
    harness
        .pool_manager
        .expect_create_pool()
        .withf(|api_key, payload| {
            let body = serde_json::to_value(payload).expect("payload json");
            api_key == "poolApiKey:pool-key"
                && body["pool_name"] == "swarm-42"
                && body["minimum_vms"] == 2
                && body["repo_name"] == "acme/widgets"
                && body["branch_name"] == "main"
                && body["github_pat"] == "githubToken:gh"
                && body["github_username"] == "octocat"
                && body["env_vars"]
                    == json!([{ "name": "API_TOKEN", "value": "environmentVariables:env-token" }])
                && body["container_files"]["Dockerfile"] == "FROM node:20"
        })
        .times(1)
        .returning(|_, _| Ok(summary()));

    let pool = harness
        .build()
        .create_pool(create_request())
        .await
        .expect("pool created");
    assert_eq!(pool, summary());
}

#[tokio::test]
async fn create_pool_recovers_after_transient_failures() {
    let mut harness = Harness::new();
    harness.sleeper = sleeper(2);
    harness
        .swarms
        .expect_find_by_swarm_id()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .swarms
        .expect_update_pool_state()
        .withf(|_, state, _| *state == PoolState::Complete)
        .times(1)
        .return_once(|_, _, _| Ok(()));
    let mut seq = mockall::Sequence::new();
    harness
        .pool_manager
        .expect_create_pool()
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_, _| Err(PoolManagerError::transport("connection reset")));
    harness
        .pool_manager
        .expect_create_pool()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(summary()));

    harness
        .build()
        .create_pool(create_request())
        .await
        .expect("third attempt succeeds");
}

#[tokio::test]
async fn exhausted_upstream_errors_pass_through_and_mark_failed() {
    let mut harness = Harness::new();
    harness.sleeper = sleeper(3);
    harness
        .swarms
        .expect_find_by_swarm_id()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .swarms
        .expect_update_pool_state()
        .withf(|_, state, name| *state == PoolState::Failed && name.is_none())
        .times(1)
        .return_once(|_, _, _| Ok(()));
    harness
        .pool_manager
        .expect_create_pool()
        .times(4)
        .returning(|_, _| {
            Err(PoolManagerError::api(
                409_u16,
                "pool already exists",
                Some(json!({ "pool": "swarm-42" })),
            ))
        });

    let err = harness
        .build()
        .create_pool(create_request())
        .await
        .expect_err("exhausted");
    assert_eq!(err.code(), ErrorCode::UpstreamError);
    assert_eq!(err.upstream_status(), Some(409));
    assert_eq!(err.service(), Some("poolManager"));
    assert_eq!(err.message(), "pool already exists");
    assert_eq!(err.details(), Some(&json!({ "pool": "swarm-42" })));
}

#[tokio::test]
async fn exhausted_transport_errors_return_generic_failure() {
    let mut harness = Harness::new();
    harness.sleeper = sleeper(3);
    harness
        .swarms
        .expect_find_by_workspace()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .swarms
        .expect_update_pool_state()
        .return_once(|_, _, _| Err(SwarmRepositoryError::query("write failed")));
    harness
        .pool_manager
        .expect_create_pool()
        .times(4)
        .returning(|_, _| Err(PoolManagerError::transport("timed out")));

    let mut request = create_request();
    request.swarm = SwarmSelector::Workspace(WORKSPACE);
    let err = harness
        .build()
        .create_pool(request)
        .await
        .expect_err("exhausted");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Failed to create pool");
    assert!(err.is_exposed());
}

#[tokio::test]
async fn create_pool_without_swarm_is_not_found() {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_swarm_id()
        .return_once(|_| Ok(None));
    harness.pool_manager.expect_create_pool().never();

    let err = harness
        .build()
        .create_pool(create_request())
        .await
        .expect_err("missing swarm");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "Swarm not found");
}

#[tokio::test]
async fn create_pool_requires_api_key() {
    let mut harness = Harness::new();
    harness.swarms.expect_find_by_swarm_id().return_once(|_| {
        Ok(Some(Swarm {
            pool_api_key: None,
            ..swarm()
        }))
    });

    let err = harness
        .build()
        .create_pool(create_request())
        .await
        .expect_err("missing key");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Swarm is missing a pool API key");
}

#[rstest]
#[case(Some(WorkspaceRole::Developer))]
#[case(None)]
#[tokio::test]
async fn create_pool_requires_administer(#[case] role: Option<WorkspaceRole>) {
    let mut harness = Harness::new();
    harness.workspaces = workspaces(role);
    harness
        .swarms
        .expect_find_by_swarm_id()
        .return_once(|_| Ok(Some(swarm())));
    harness.pool_manager.expect_create_pool().never();

    let mut request = create_request();
    request.user_id = UserId::random();
    let err = harness
        .build()
        .create_pool(request)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

fn claim_request() -> ClaimPodRequest {
    ClaimPodRequest {
        user_id: owner(),
        workspace_id: WORKSPACE,
    }
}

fn pod(mappings: &[(&str, &str)]) -> ClaimedPod {
    ClaimedPod {
        id: "pod-7".into(),
        url: None,
        port_mappings: mappings
            .iter()
            .map(|(port, url)| ((*port).to_owned(), (*url).to_owned()))
            .collect(),
    }
}

#[tokio::test]
async fn claim_pod_returns_frontend() {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_workspace()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .pool_manager
        .expect_claim_pod()
        .withf(|api_key, pool| api_key == "poolApiKey:pool-key" && pool == "swarm-42")
        .return_once(|_, _| {
            Ok(pod(&[
                ("15552", "https://control.test"),
                ("3000", "https://app.test"),
                ("8080", "https://api.test"),
            ]))
        });

    let response = harness
        .build()
        .claim_pod(claim_request())
        .await
        .expect("claimed");
    assert_eq!(response.frontend, "https://app.test");
    assert_eq!(response.workspace_id, WORKSPACE);
}

#[tokio::test]
async fn claim_pod_without_swarm_is_not_found() {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_workspace()
        .return_once(|_| Ok(None));

    let err = harness
        .build()
        .claim_pod(claim_request())
        .await
        .expect_err("no swarm");
    assert_eq!(err.message(), "No swarm found for this workspace");
}

#[rstest]
#[case(Swarm { pool_name: None, ..swarm() })]
#[case(Swarm { pool_api_key: None, ..swarm() })]
#[tokio::test]
async fn claim_pod_requires_pool_configuration(#[case] configured: Swarm) {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_workspace()
        .return_once(move |_| Ok(Some(configured)));
    harness.pool_manager.expect_claim_pod().never();

    let err = harness
        .build()
        .claim_pod(claim_request())
        .await
        .expect_err("misconfigured");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.message(),
        "Swarm not properly configured with pool information"
    );
}

#[tokio::test]
async fn claim_pod_without_frontend_fails() {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_workspace()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .pool_manager
        .expect_claim_pod()
        .return_once(|_, _| Ok(pod(&[("8080", "a"), ("9090", "b")])));

    let err = harness
        .build()
        .claim_pod(claim_request())
        .await
        .expect_err("no frontend");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Failed to claim pod: no frontend available");
}

#[tokio::test]
async fn claim_pod_passes_upstream_errors_through() {
    let mut harness = Harness::new();
    harness
        .swarms
        .expect_find_by_workspace()
        .return_once(|_| Ok(Some(swarm())));
    harness
        .pool_manager
        .expect_claim_pod()
        .return_once(|_, _| {
            Err(PoolManagerError::api(
                503_u16,
                "no pods available",
                None::<serde_json::Value>,
            ))
        });

    let err = harness
        .build()
        .claim_pod(claim_request())
        .await
        .expect_err("upstream");
    assert_eq!(err.upstream_status(), Some(503));
    assert_eq!(err.service(), Some("poolManager"));
    assert!(err.details().is_none());
}
