//! Tests for the workspace logo service.

use std::time::Duration;

use super::*;
use crate::domain::ports::{MockObjectStorage, MockWorkspaceRepository};
use crate::domain::{ErrorCode, UserId, WorkspaceRole};
use crate::test_support::FixedClock;
use rstest::rstest;

const WORKSPACE: Uuid = Uuid::from_u128(0x77);

fn owner() -> UserId {
    UserId::from_uuid(Uuid::from_u128(1))
}

fn workspace(logo_key: Option<&str>) -> Workspace {
    Workspace {
        id: WORKSPACE,
        name: "Acme".into(),
        slug: "acme".into(),
        owner_id: *owner().as_uuid(),
        logo_key: logo_key.map(str::to_owned),
        deleted: false,
        deleted_at: None,
    }
}

fn workspaces(logo_key: Option<&'static str>) -> MockWorkspaceRepository {
    let mut repo = MockWorkspaceRepository::new();
    repo.expect_find_active_by_slug()
        .returning(move |_| Ok(Some(workspace(logo_key))));
    repo
}

fn service(repo: MockWorkspaceRepository, storage: MockObjectStorage) -> WorkspaceLogoService {
    WorkspaceLogoService::new(
        WorkspaceAccess::new(Arc::new(repo)),
        Arc::new(storage),
        Arc::new(FixedClock::at(2025, 1, 2, 3, 4, 5)),
    )
}

fn existing_key() -> String {
    format!("workspace-logos/{WORKSPACE}/1_old.png")
}

#[tokio::test]
async fn upload_presigns_put_under_workspace_prefix() {
    let mut storage = MockObjectStorage::new();
    storage
        .expect_presign()
        .withf(|req| {
            req.method == PresignMethod::Put
                && req.expires_in == Duration::from_secs(900)
                && req.key.starts_with(&format!("workspace-logos/{WORKSPACE}/"))
                && req.key.ends_with(".webp")
        })
        .times(1)
        .returning(|req| Ok(format!("https://s3.test/{}?sig", req.key)));

    let ticket = service(workspaces(None), storage)
        .request_upload(LogoUploadRequest {
            user_id: owner(),
            slug: "acme".into(),
            filename: "logo.webp".into(),
            content_type: "image/webp".into(),
            size: 4096,
        })
        .await
        .expect("ticket issued");

    assert_eq!(ticket.expires_in, 900);
    assert!(ticket.presigned_url.contains(&ticket.s3_path));
}

#[tokio::test]
async fn upload_requires_administer_permission() {
    let mut repo = workspaces(None);
    repo.expect_find_member_role()
        .return_once(|_, _| Ok(Some(WorkspaceRole::Developer)));
    let mut storage = MockObjectStorage::new();
    storage.expect_presign().never();

    let err = service(repo, storage)
        .request_upload(LogoUploadRequest {
            user_id: UserId::random(),
            slug: "acme".into(),
            filename: "logo.png".into(),
            content_type: "image/png".into(),
            size: 10,
        })
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn confirm_replaces_key_and_removes_previous_object() {
    let new_key = format!("workspace-logos/{WORKSPACE}/2_new.png");
    let mut repo = workspaces(Some("workspace-logos/00000000-0000-0000-0000-000000000077/1_old.png"));
    let stored = new_key.clone();
    repo.expect_set_logo_key()
        .withf(move |id, key| *id == WORKSPACE && key.as_deref() == Some(stored.as_str()))
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .withf(|key| key == existing_key())
        .times(1)
        .return_once(|_| Err(ObjectStorageError::transport("timeout")));

    let key = service(repo, storage)
        .confirm_upload(ConfirmLogoRequest {
            user_id: owner(),
            slug: "acme".into(),
            s3_path: new_key.clone(),
        })
        .await
        .expect("cleanup failure is not fatal");
    assert_eq!(key, new_key);
}

#[rstest]
#[case("workspace-logos/00000000-0000-0000-0000-000000000001/x.png")]
#[case("workspace-logos/00000000-0000-0000-0000-000000000077/../x.png")]
#[tokio::test]
async fn confirm_rejects_foreign_paths(#[case] path: &str) {
    let mut repo = workspaces(None);
    repo.expect_set_logo_key().never();

    let err = service(repo, MockObjectStorage::new())
        .confirm_upload(ConfirmLogoRequest {
            user_id: owner(),
            slug: "acme".into(),
            s3_path: path.into(),
        })
        .await
        .expect_err("invalid path");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn get_without_logo_is_not_found() {
    let err = service(workspaces(None), MockObjectStorage::new())
        .logo_url(LogoUrlRequest {
            user_id: owner(),
            slug: "acme".into(),
        })
        .await
        .expect_err("no logo");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "No logo found");
}

#[tokio::test]
async fn viewers_can_read_logo() {
    let mut repo = workspaces(Some("workspace-logos/00000000-0000-0000-0000-000000000077/1_old.png"));
    repo.expect_find_member_role()
        .return_once(|_, _| Ok(Some(WorkspaceRole::Viewer)));
    let mut storage = MockObjectStorage::new();
    storage
        .expect_presign()
        .withf(|req| req.method == PresignMethod::Get && req.expires_in.as_secs() == 3600)
        .return_once(|_| Ok("https://s3.test/logo?sig".into()));

    let url = service(repo, storage)
        .logo_url(LogoUrlRequest {
            user_id: UserId::random(),
            slug: "acme".into(),
        })
        .await
        .expect("url issued");
    assert_eq!(url.expires_in, 3600);
}

#[tokio::test]
async fn delete_failure_keeps_key() {
    let mut repo = workspaces(Some("workspace-logos/00000000-0000-0000-0000-000000000077/1_old.png"));
    repo.expect_set_logo_key().never();
    let mut storage = MockObjectStorage::new();
    storage
        .expect_delete_object()
        .return_once(|_| Err(ObjectStorageError::rejected(403_u16, "denied")));

    let err = service(repo, storage)
        .delete_logo(DeleteLogoRequest {
            user_id: owner(),
            slug: "acme".into(),
        })
        .await
        .expect_err("delete fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Failed to delete logo");
}

#[tokio::test]
async fn delete_removes_object_then_clears_key() {
    let mut repo = workspaces(Some("workspace-logos/00000000-0000-0000-0000-000000000077/1_old.png"));
    repo.expect_set_logo_key()
        .withf(|_, key| key.is_none())
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut storage = MockObjectStorage::new();
    storage.expect_delete_object().times(1).return_once(|_| Ok(()));

    service(repo, storage)
        .delete_logo(DeleteLogoRequest {
            user_id: owner(),
            slug: "acme".into(),
        })
        .await
        .expect("logo deleted");
}
