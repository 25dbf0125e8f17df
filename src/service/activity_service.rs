use std::net::IpAddr;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    domain::{ActivityLog, ActivityPage, ActivityQuery, ActivityType, ClientInfo},
    error::Result,
    repository::ActivityRepository,
};

const MAX_USER_AGENT_LEN: usize = 500;

pub struct ActivityService {
    repo: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    pub fn new(repo: Arc<dyn ActivityRepository>) -> Self {
        Self { repo }
    }

    /// Persists an audit entry. A failed write is logged and swallowed so
    /// it never undoes the action being recorded.
    pub async fn log(
        &self,
        user_id: Option<Uuid>,
        activity_type: ActivityType,
        description: &str,
        client: &ClientInfo,
    ) {
        if let Err(e) = self.repo.record(user_id, activity_type, description, client).await {
            tracing::warn!(
                activity = activity_type.as_str(),
                "Failed to record activity: {}",
                e
            );
        }
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<ActivityLog>> {
        self.repo.recent(limit).await
    }

    pub async fn search(&self, query: &ActivityQuery, per_page: i64) -> Result<ActivityPage> {
        self.repo.search(query, per_page).await
    }
}

/// Builds the request origin: first `X-Forwarded-For` entry, else the peer
/// address. The user agent is cut to 500 characters.
pub fn client_info(
    forwarded_for: Option<&str>,
    peer: Option<IpAddr>,
    user_agent: Option<&str>,
) -> ClientInfo {
    let forwarded = forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    ClientInfo {
        ip_address: forwarded.or_else(|| peer.map(|ip| ip.to_string())),
        user_agent: user_agent
            .unwrap_or_default()
            .chars()
            .take(MAX_USER_AGENT_LEN)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_forwarded_for_wins_over_peer() {
        let info = client_info(
            Some("203.0.113.7, 10.0.0.1"),
            Some(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            Some("curl/8.0"),
        );
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent, "curl/8.0");
    }

    #[test]
    fn test_falls_back_to_peer() {
        let info = client_info(None, Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 4))), None);
        assert_eq!(info.ip_address.as_deref(), Some("192.168.1.4"));
        assert_eq!(info.user_agent, "");

        let info = client_info(Some("  "), None, None);
        assert!(info.ip_address.is_none());
    }

    #[test]
    fn test_user_agent_truncated() {
        let long = "x".repeat(800);
        let info = client_info(None, None, Some(&long));
        assert_eq!(info.user_agent.len(), 500);
    }
}
