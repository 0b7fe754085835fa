//! Workspaces, membership roles, and role-based permissions.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Error, UserId};

/// Prefix under which workspace logos are stored in object storage.
pub const WORKSPACE_LOGO_PREFIX: &str = "workspace-logos";

/// Tenant container owning tasks, members, and at most one swarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// Owning user; owners are never stored as member rows.
    pub owner_id: Uuid,
    /// Object key of the current logo, if any.
    pub logo_key: Option<String>,
    /// Soft-delete marker; deleted workspaces behave as missing.
    pub deleted: bool,
    /// When the workspace was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Workspace {
    /// Whether `user` owns this workspace.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == *user.as_uuid()
    }

    /// Key prefix that every logo object of this workspace must share.
    ///
    /// # Examples
    /// ```
    /// use hive_backend::domain::Workspace;
    /// use uuid::Uuid;
    ///
    /// let workspace = Workspace {
    ///     id: Uuid::nil(),
    ///     name: "Acme".into(),
    ///     slug: "acme".into(),
    ///     owner_id: Uuid::nil(),
    ///     logo_key: None,
    ///     deleted: false,
    ///     deleted_at: None,
    /// };
    /// assert_eq!(
    ///     workspace.logo_prefix(),
    ///     "workspace-logos/00000000-0000-0000-0000-000000000000/"
    /// );
    /// ```
    pub fn logo_prefix(&self) -> String {
        format!("{WORKSPACE_LOGO_PREFIX}/{}/", self.id)
    }
}

/// Role a user holds within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceRole {
    /// Derived from `workspaces.owner_id`.
    Owner,
    /// Full administrative rights.
    Admin,
    /// Product manager.
    Pm,
    /// Engineer.
    Developer,
    /// Read-only business stakeholder.
    Stakeholder,
    /// Read-only observer.
    Viewer,
}

/// Capability checked before a use-case runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// See workspace content.
    Read,
    /// Mutate tasks and chat with the agent.
    Write,
    /// Manage workspace settings and infrastructure.
    Administer,
}

impl WorkspaceRole {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Pm => "PM",
            Self::Developer => "DEVELOPER",
            Self::Stakeholder => "STAKEHOLDER",
            Self::Viewer => "VIEWER",
        }
    }

    /// Whether this role grants `permission`.
    pub const fn permits(self, permission: Permission) -> bool {
        match permission {
            Permission::Read => true,
            Permission::Write => matches!(
                self,
                Self::Owner | Self::Admin | Self::Pm | Self::Developer
            ),
            Permission::Administer => matches!(self, Self::Owner | Self::Admin),
        }
    }
}

/// Rejection for unknown stored role names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown workspace role: {0}")]
pub struct UnknownWorkspaceRole(pub String);

impl FromStr for WorkspaceRole {
    type Err = UnknownWorkspaceRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "PM" => Ok(Self::Pm),
            "DEVELOPER" => Ok(Self::Developer),
            "STAKEHOLDER" => Ok(Self::Stakeholder),
            "VIEWER" => Ok(Self::Viewer),
            other => Err(UnknownWorkspaceRole(other.to_owned())),
        }
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check a resolved role against a required permission.
///
/// `None` means the user is neither owner nor an active member.
pub fn authorize(role: Option<WorkspaceRole>, permission: Permission) -> Result<WorkspaceRole, Error> {
    match role {
        None => Err(Error::forbidden("Access denied")),
        Some(role) if role.permits(permission) => Ok(role),
        Some(_) => Err(Error::forbidden("Insufficient permissions")),
    }
}
