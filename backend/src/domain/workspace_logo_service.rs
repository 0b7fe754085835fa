//! Workspace logo service: presigned uploads, confirmation, download and removal.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    ConfirmLogoRequest, DeleteLogoRequest, LogoUploadRequest, LogoUploadTicket, LogoUrl,
    LogoUrlRequest, ObjectStorage, ObjectStorageError, PresignMethod, PresignRequest,
    WorkspaceLogoCommand, WorkspaceLogoQuery,
};
use crate::domain::workspace_access::map_workspace_error;
use crate::domain::{
    Error, LOGO_DOWNLOAD_URL_TTL, LOGO_UPLOAD_URL_TTL, LogoUpload, Permission, Workspace,
    WorkspaceAccess, validate_logo_key,
};

/// Service implementing the workspace logo driving ports.
#[derive(Clone)]
pub struct WorkspaceLogoService {
    access: WorkspaceAccess,
    storage: Arc<dyn ObjectStorage>,
    clock: Arc<dyn Clock>,
}

impl WorkspaceLogoService {
    pub fn new(
        access: WorkspaceAccess,
        storage: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access,
            storage,
            clock,
        }
    }

    async fn authorised_workspace(
        &self,
        slug: &str,
        user_id: &crate::domain::UserId,
        permission: Permission,
    ) -> Result<Workspace, Error> {
        let workspace = self.access.by_slug(slug).await?;
        self.access.require(&workspace, user_id, permission).await?;
        Ok(workspace)
    }

    async fn presign(
        &self,
        method: PresignMethod,
        key: String,
        ttl: std::time::Duration,
    ) -> Result<String, Error> {
        self.storage
            .presign(PresignRequest {
                method,
                key,
                expires_in: ttl,
                signed_at: self.clock.utc(),
            })
            .await
            .map_err(|err| storage_failure("Failed to generate presigned URL", &err))
    }
}

fn storage_failure(message: &str, error: &ObjectStorageError) -> Error {
    warn!(error = %error, "{message}");
    Error::failed(message)
}

#[async_trait]
impl WorkspaceLogoCommand for WorkspaceLogoService {
    async fn request_upload(&self, request: LogoUploadRequest) -> Result<LogoUploadTicket, Error> {
        let workspace = self
            .authorised_workspace(&request.slug, &request.user_id, Permission::Administer)
            .await?;
        let upload = LogoUpload::new(&request.filename, &request.content_type, request.size)?;
        let key = upload.object_key(&workspace, self.clock.utc(), Uuid::new_v4());
        let presigned_url = self
            .presign(PresignMethod::Put, key.clone(), LOGO_UPLOAD_URL_TTL)
            .await?;
        Ok(LogoUploadTicket {
            presigned_url,
            s3_path: key,
            expires_in: LOGO_UPLOAD_URL_TTL.as_secs(),
        })
    }

    async fn confirm_upload(&self, request: ConfirmLogoRequest) -> Result<String, Error> {
        let workspace = self
            .authorised_workspace(&request.slug, &request.user_id, Permission::Administer)
            .await?;
        validate_logo_key(&workspace, &request.s3_path)?;
        let key = request.s3_path.trim().to_owned();

        self.access
            .repository()
            .set_logo_key(&workspace.id, Some(key.clone()))
            .await
            .map_err(map_workspace_error)?;

        if let Some(previous) = workspace.logo_key.filter(|previous| *previous != key) {
            if let Err(err) = self.storage.delete_object(&previous).await {
                warn!(workspace_id = %workspace.id, key = %previous, error = %err, "failed to remove replaced logo");
            }
        }
        info!(workspace_id = %workspace.id, key = %key, "workspace logo updated");
        Ok(key)
    }

    async fn delete_logo(&self, request: DeleteLogoRequest) -> Result<(), Error> {
        let workspace = self
            .authorised_workspace(&request.slug, &request.user_id, Permission::Administer)
            .await?;
        let key = workspace
            .logo_key
            .as_deref()
            .ok_or_else(|| Error::not_found("No logo found"))?;

        self.storage
            .delete_object(key)
            .await
            .map_err(|err| storage_failure("Failed to delete logo", &err))?;
        self.access
            .repository()
            .set_logo_key(&workspace.id, None)
            .await
            .map_err(map_workspace_error)?;
        info!(workspace_id = %workspace.id, "workspace logo deleted");
        Ok(())
    }
}

#[async_trait]
impl WorkspaceLogoQuery for WorkspaceLogoService {
    async fn logo_url(&self, request: LogoUrlRequest) -> Result<LogoUrl, Error> {
        let workspace = self
            .authorised_workspace(&request.slug, &request.user_id, Permission::Read)
            .await?;
        let key = workspace
            .logo_key
            .ok_or_else(|| Error::not_found("No logo found"))?;
        let presigned_url = self
            .presign(PresignMethod::Get, key, LOGO_DOWNLOAD_URL_TTL)
            .await?;
        Ok(LogoUrl {
            presigned_url,
            expires_in: LOGO_DOWNLOAD_URL_TTL.as_secs(),
        })
    }
}

#[cfg(test)]
#[path = "workspace_logo_service_tests.rs"]
mod tests;
