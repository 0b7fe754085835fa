//! Workspace logo endpoints.
//!
//! ```text
//! POST   /api/workspaces/{slug}/image/upload-url {"filename","contentType","size"}
//! POST   /api/workspaces/{slug}/image/confirm    {"s3Path"}
//! GET    /api/workspaces/{slug}/image
//! DELETE /api/workspaces/{slug}/image
//! ```
//!
//! The browser uploads straight to object storage with the presigned URL and
//! then confirms the key, so image bytes never pass through the backend.

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    ConfirmLogoRequest, DeleteLogoRequest, LogoUploadRequest, LogoUrlRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{DataEnvelope, MessageEnvelope};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, require_text};

/// Body of `POST /api/workspaces/{slug}/image/upload-url`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlBody {
    #[schema(example = "logo.png")]
    pub filename: Option<String>,
    #[schema(example = "image/png")]
    pub content_type: Option<String>,
    /// Declared size in bytes.
    #[schema(example = 20480)]
    pub size: Option<u64>,
}

/// Presigned upload target.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlData {
    pub presigned_url: String,
    #[schema(example = "workspace-logos/3fa85f64-5717-4562-b3fc-2c963f66afa6/1700000000000_0d9c.png")]
    pub s3_path: String,
    #[schema(example = 900)]
    pub expires_in: u64,
}

/// Body of `POST /api/workspaces/{slug}/image/confirm`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmBody {
    pub s3_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmData {
    pub logo_key: String,
}

/// Presigned download URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogoUrlData {
    pub presigned_url: String,
    #[schema(example = 3600)]
    pub expires_in: u64,
}

/// Presign an upload URL for a new workspace logo.
#[utoipa::path(
    post,
    path = "/api/workspaces/{slug}/image/upload-url",
    params(("slug" = String, Path, description = "Workspace slug")),
    request_body = UploadUrlBody,
    responses(
        (status = 200, description = "Presigned upload URL", body = DataEnvelope<UploadUrlData>),
        (status = 400, description = "Invalid file name, type, or size", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Owner or admin role required", body = ErrorSchema),
        (status = 404, description = "Workspace not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["workspaces"],
    operation_id = "requestLogoUpload"
)]
#[post("/workspaces/{slug}/image/upload-url")]
pub async fn request_logo_upload(
    user: CurrentUser,
    state: web::Data<HttpState>,
    slug: web::Path<String>,
    payload: web::Json<UploadUrlBody>,
) -> ApiResult<web::Json<DataEnvelope<UploadUrlData>>> {
    let UploadUrlBody {
        filename,
        content_type,
        size,
    } = payload.into_inner();
    let filename = require_text(filename, FieldName::new("filename"))?;
    let content_type = require_text(content_type, FieldName::new("contentType"))?;
    let size = size.ok_or_else(|| missing_field_error(FieldName::new("size")))?;

    let ticket = state
        .logos
        .request_upload(LogoUploadRequest {
            user_id: user.into_inner(),
            slug: slug.into_inner(),
            filename,
            content_type,
            size,
        })
        .await?;
    Ok(web::Json(DataEnvelope::ok(UploadUrlData {
        presigned_url: ticket.presigned_url,
        s3_path: ticket.s3_path,
        expires_in: ticket.expires_in,
    })))
}

/// Record an uploaded object as the workspace logo.
#[utoipa::path(
    post,
    path = "/api/workspaces/{slug}/image/confirm",
    params(("slug" = String, Path, description = "Workspace slug")),
    request_body = ConfirmBody,
    responses(
        (status = 200, description = "Logo recorded", body = DataEnvelope<ConfirmData>),
        (status = 400, description = "Key outside the workspace prefix", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Owner or admin role required", body = ErrorSchema),
        (status = 404, description = "Workspace not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["workspaces"],
    operation_id = "confirmLogoUpload"
)]
#[post("/workspaces/{slug}/image/confirm")]
pub async fn confirm_logo_upload(
    user: CurrentUser,
    state: web::Data<HttpState>,
    slug: web::Path<String>,
    payload: web::Json<ConfirmBody>,
) -> ApiResult<web::Json<DataEnvelope<ConfirmData>>> {
    let s3_path = require_text(payload.into_inner().s3_path, FieldName::new("s3Path"))?;
    let logo_key = state
        .logos
        .confirm_upload(ConfirmLogoRequest {
            user_id: user.into_inner(),
            slug: slug.into_inner(),
            s3_path,
        })
        .await?;
    Ok(web::Json(DataEnvelope::ok(ConfirmData { logo_key })))
}

/// Presign a download URL for the current logo.
#[utoipa::path(
    get,
    path = "/api/workspaces/{slug}/image",
    params(("slug" = String, Path, description = "Workspace slug")),
    responses(
        (status = 200, description = "Presigned download URL", body = DataEnvelope<LogoUrlData>),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "No access to the workspace", body = ErrorSchema),
        (status = 404, description = "Workspace or logo not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["workspaces"],
    operation_id = "getLogo"
)]
#[get("/workspaces/{slug}/image")]
pub async fn get_logo(
    user: CurrentUser,
    state: web::Data<HttpState>,
    slug: web::Path<String>,
) -> ApiResult<web::Json<DataEnvelope<LogoUrlData>>> {
    let url = state
        .logo_urls
        .logo_url(LogoUrlRequest {
            user_id: user.into_inner(),
            slug: slug.into_inner(),
        })
        .await?;
    Ok(web::Json(DataEnvelope::ok(LogoUrlData {
        presigned_url: url.presigned_url,
        expires_in: url.expires_in,
    })))
}

/// Delete the current logo.
#[utoipa::path(
    delete,
    path = "/api/workspaces/{slug}/image",
    params(("slug" = String, Path, description = "Workspace slug")),
    responses(
        (status = 200, description = "Logo deleted", body = MessageEnvelope),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Owner or admin role required", body = ErrorSchema),
        (status = 404, description = "Workspace or logo not found", body = ErrorSchema),
        (status = 500, description = "Storage deletion failed", body = ErrorSchema)
    ),
    tags = ["workspaces"],
    operation_id = "deleteLogo"
)]
#[delete("/workspaces/{slug}/image")]
pub async fn delete_logo(
    user: CurrentUser,
    state: web::Data<HttpState>,
    slug: web::Path<String>,
) -> ApiResult<web::Json<MessageEnvelope>> {
    state
        .logos
        .delete_logo(DeleteLogoRequest {
            user_id: user.into_inner(),
            slug: slug.into_inner(),
        })
        .await?;
    Ok(web::Json(MessageEnvelope::ok("Logo deleted successfully")))
}

#[cfg(test)]
#[path = "workspace_images_tests.rs"]
mod tests;
