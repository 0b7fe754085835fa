//! Swarm: a workspace's external compute backend and its pool state.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EncryptedField;

/// Outcome of the last pool provisioning attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolState {
    /// No pool has been requested yet.
    #[default]
    NotStarted,
    /// The Pool Manager accepted the pool.
    Complete,
    /// Every provisioning attempt failed.
    Failed,
}

impl PoolState {
    /// Stored representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        }
    }
}

/// Rejection for unknown stored pool states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pool state: {0}")]
pub struct UnknownPoolState(pub String);

impl FromStr for PoolState {
    type Err = UnknownPoolState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(Self::NotStarted),
            "COMPLETE" => Ok(Self::Complete),
            "FAILED" => Ok(Self::Failed),
            other => Err(UnknownPoolState(other.to_owned())),
        }
    }
}

impl std::fmt::Display for PoolState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment variable injected into pool containers; the value is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwarmEnvVar {
    /// Variable name.
    pub name: String,
    /// Encrypted value.
    pub value: EncryptedField,
}

/// Pool configuration owned by exactly one workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swarm {
    /// Primary key.
    pub id: Uuid,
    /// Owning workspace (unique).
    pub workspace_id: Uuid,
    /// External swarm identifier.
    pub swarm_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Name of the provisioned pool at the Pool Manager.
    pub pool_name: Option<String>,
    /// Pool Manager API key, encrypted.
    pub pool_api_key: Option<EncryptedField>,
    /// Last provisioning outcome.
    pub pool_state: PoolState,
    /// Repository cloned into pool containers.
    pub repository_url: Option<String>,
    /// Branch checked out in pool containers.
    pub default_branch: Option<String>,
    /// Container environment.
    pub environment_variables: Vec<SwarmEnvVar>,
}

impl Swarm {
    /// Pool name used when provisioning: the external swarm id, or the row id.
    pub fn provisioning_pool_name(&self) -> String {
        self.swarm_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Repository name (`owner/repo`) derived from the repository URL.
    ///
    /// # Examples
    /// ```
    /// # use hive_backend::domain::Swarm;
    /// # use uuid::Uuid;
    /// # let mut swarm = Swarm {
    /// #     id: Uuid::nil(), workspace_id: Uuid::nil(), swarm_id: None, name: "s".into(),
    /// #     pool_name: None, pool_api_key: None, pool_state: Default::default(),
    /// #     repository_url: None, default_branch: None, environment_variables: vec![],
    /// # };
    /// swarm.repository_url = Some("https://github.com/acme/widgets.git".into());
    /// assert_eq!(swarm.repository_name().as_deref(), Some("acme/widgets"));
    /// ```
    pub fn repository_name(&self) -> Option<String> {
        let url = self.repository_url.as_deref()?.trim().trim_end_matches('/');
        let url = url.strip_suffix(".git").unwrap_or(url);
        let mut segments = url.rsplit(['/', ':']);
        let repo = segments.next().filter(|s| !s.is_empty())?;
        let owner = segments.next().filter(|s| !s.is_empty())?;
        Some(format!("{owner}/{repo}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn swarm(repository_url: Option<&str>) -> Swarm {
        Swarm {
            id: Uuid::nil(),
            workspace_id: Uuid::nil(),
            swarm_id: None,
            name: "swarm".into(),
            pool_name: None,
            pool_api_key: None,
            pool_state: PoolState::NotStarted,
            repository_url: repository_url.map(str::to_owned),
            default_branch: None,
            environment_variables: vec![],
        }
    }

    #[rstest]
    #[case(Some("https://github.com/acme/widgets"), Some("acme/widgets"))]
    #[case(Some("https://github.com/acme/widgets.git/"), Some("acme/widgets"))]
    #[case(Some("git@github.com:acme/widgets.git"), Some("acme/widgets"))]
    #[case(Some("widgets"), None)]
    #[case(None, None)]
    fn derives_repository_name(#[case] url: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(swarm(url).repository_name().as_deref(), expected);
    }

    #[rstest]
    fn pool_name_falls_back_to_row_id() {
        let mut swarm = swarm(None);
        assert_eq!(swarm.provisioning_pool_name(), Uuid::nil().to_string());
        swarm.swarm_id = Some("swarm-42".into());
        assert_eq!(swarm.provisioning_pool_name(), "swarm-42");
    }

    #[rstest]
    fn pool_states_round_trip() {
        for state in [PoolState::NotStarted, PoolState::Complete, PoolState::Failed] {
            assert_eq!(state.as_str().parse::<PoolState>(), Ok(state));
        }
    }
}
