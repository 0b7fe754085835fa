//! Claimed pods and frontend URL selection.

use std::collections::BTreeMap;

/// Ports used by the pod's own control plane; never user-facing.
pub const INTERNAL_POD_PORTS: [u16; 2] = [15552, 15553];

/// Port preferred when several user-facing ports are exposed.
pub const DEFAULT_FRONTEND_PORT: u16 = 3000;

/// Pod handed out by the Pool Manager for a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedPod {
    /// Pod identifier.
    pub id: String,
    /// Base URL of the pod, when reported.
    pub url: Option<String>,
    /// Exposed container port (as text) to public URL.
    pub port_mappings: BTreeMap<String, String>,
}

impl ClaimedPod {
    /// Public URL of the pod's frontend, if one can be chosen.
    pub fn frontend_url(&self) -> Option<&str> {
        select_frontend(&self.port_mappings)
    }
}

fn is_internal(port: &str) -> bool {
    port.trim()
        .parse::<u16>()
        .is_ok_and(|port| INTERNAL_POD_PORTS.contains(&port))
}

/// Choose the frontend URL from a pod's port mappings.
///
/// Internal ports are ignored. A single remaining mapping wins; otherwise the
/// mapping for port 3000 is used when present.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use hive_backend::domain::select_frontend;
///
/// let mappings = BTreeMap::from([
///     ("15552".to_owned(), "https://control".to_owned()),
///     ("8080".to_owned(), "https://app".to_owned()),
/// ]);
/// assert_eq!(select_frontend(&mappings), Some("https://app"));
/// ```
pub fn select_frontend(port_mappings: &BTreeMap<String, String>) -> Option<&str> {
    let mut candidates = port_mappings.iter().filter(|(port, _)| !is_internal(port));
    let first = candidates.next();
    if let (Some((_, url)), None) = (first, candidates.next()) {
        return Some(url.as_str());
    }
    port_mappings
        .iter()
        .find(|(port, _)| port.trim().parse::<u16>() == Ok(DEFAULT_FRONTEND_PORT))
        .map(|(_, url)| url.as_str())
}
