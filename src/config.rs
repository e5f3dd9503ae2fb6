//! Planner configuration
//!
//! Loaded from a JSON file; every field falls back to its default when
//! omitted.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Link and transfer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Our MAVLink system ID (default: 255, ground station).
    pub gcs_system_id: u8,
    /// Our MAVLink component ID (default: 190, MAV_COMP_ID_MISSIONPLANNER).
    pub gcs_component_id: u8,
    /// Vehicle system ID.
    pub target_system_id: u8,
    /// Vehicle component ID.
    pub target_component_id: u8,
    /// Per-message timeout in milliseconds before a retry.
    pub transfer_timeout_ms: u64,
    /// Retries per message before a transfer fails.
    pub max_retries: u8,
    /// Local UDP address to bind.
    pub bind_addr: String,
    /// Vehicle UDP address; discovered from the first datagram when unset.
    pub vehicle_addr: Option<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            gcs_system_id: 255,
            gcs_component_id: 190,
            target_system_id: 1,
            target_component_id: 1,
            transfer_timeout_ms: 1500,
            max_retries: 3,
            bind_addr: "0.0.0.0:14551".to_string(),
            vehicle_addr: None,
        }
    }
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_timeout_ms)
    }

    pub fn bind_socket_addr(&self) -> Result<SocketAddr> {
        parse_addr("bind_addr", &self.bind_addr)
    }

    pub fn vehicle_socket_addr(&self) -> Result<Option<SocketAddr>> {
        self.vehicle_addr
            .as_deref()
            .map(|addr| parse_addr("vehicle_addr", addr))
            .transpose()
    }

    fn validate(&self) -> Result<()> {
        if self.transfer_timeout_ms == 0 {
            return Err(PlannerError::Config(
                "transfer_timeout_ms must be positive".to_string(),
            ));
        }
        self.bind_socket_addr()?;
        self.vehicle_socket_addr()?;
        Ok(())
    }
}

fn parse_addr(field: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|_| PlannerError::Config(format!("invalid {field}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.gcs_system_id, 255);
        assert_eq!(config.gcs_component_id, 190);
        assert_eq!(config.transfer_timeout(), Duration::from_millis(1500));
        assert!(config.vehicle_socket_addr().unwrap().is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            PlannerConfig::from_json(r#"{"target_system_id": 7, "vehicle_addr": "127.0.0.1:14550"}"#)
                .unwrap();
        assert_eq!(config.target_system_id, 7);
        assert_eq!(config.max_retries, 3);
        assert_eq!(
            config.vehicle_socket_addr().unwrap(),
            Some("127.0.0.1:14550".parse().unwrap())
        );
    }

    #[test]
    fn test_invalid_address_rejected() {
        let err = PlannerConfig::from_json(r#"{"bind_addr": "nowhere"}"#).unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = PlannerConfig::from_json(r#"{"transfer_timeout_ms": 0}"#).unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = PlannerConfig::from_json("{").unwrap_err();
        assert!(matches!(err, PlannerError::Json(_)));
    }
}
