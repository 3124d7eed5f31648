// SPDX-FileCopyrightText: 2026 Teamdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `teamdesk status` command implementation.
//!
//! Runs the adapter health checks and probes the relay's `/health`
//! endpoint. Each failure is reported, never fatal.

use std::io::IsTerminal;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use teamdesk_config::TeamdeskConfig;
use teamdesk_core::{HealthStatus, PluginAdapter, TeamdeskError};

use crate::adapters;

/// Relay `/health` body.
#[derive(Debug, Deserialize)]
struct RelayHealth {
    status: String,
    uptime_secs: u64,
}

/// One adapter's health.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentStatus {
    pub name: String,
    pub healthy: bool,
    pub detail: Option<String>,
}

/// Structured output for `--json`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub components: Vec<ComponentStatus>,
    pub relay_running: bool,
    pub relay_uptime: Option<String>,
    pub relay_endpoint: String,
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

fn component(name: &str, health: Result<HealthStatus, TeamdeskError>) -> ComponentStatus {
    let (healthy, detail) = match health {
        Ok(HealthStatus::Healthy) => (true, None),
        Ok(HealthStatus::Degraded(why)) => (true, Some(why)),
        Ok(HealthStatus::Unhealthy(why)) => (false, Some(why)),
        Err(e) => (false, Some(e.to_string())),
    };
    ComponentStatus {
        name: name.to_string(),
        healthy,
        detail,
    }
}

async fn check<A: PluginAdapter + ?Sized>(adapter: &A) -> ComponentStatus {
    component(adapter.name(), adapter.health_check().await)
}

pub async fn run_status(
    config: &TeamdeskConfig,
    json: bool,
    plain: bool,
) -> Result<(), TeamdeskError> {
    let mut components = Vec::new();

    match adapters::store(config) {
        Ok(store) => components.push(check(store.as_ref()).await),
        Err(e) => components.push(component("supabase", Err(e))),
    }
    match adapters::chat_responder(config) {
        Ok(responder) => components.push(check(responder.as_ref()).await),
        Err(e) => components.push(component("responder", Err(e))),
    }
    match adapters::cache(config).await {
        Ok(cache) => {
            components.push(check(cache.as_ref()).await);
            cache.shutdown().await?;
        }
        Err(e) => components.push(component("sqlite-cache", Err(e))),
    }

    let host = &config.relay.host;
    let port = config.relay.port;
    let endpoint = format!("http://{host}:{port}/health");
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| TeamdeskError::Internal(format!("failed to create HTTP client: {e}")))?;

    let relay = match client.get(&endpoint).send().await {
        Ok(resp) if resp.status().is_success() => resp.json::<RelayHealth>().await.ok(),
        _ => None,
    };

    let response = StatusResponse {
        components,
        relay_running: relay.is_some(),
        relay_uptime: relay.as_ref().map(|r| format_uptime(r.uptime_secs)),
        relay_endpoint: endpoint,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, relay.map(|r| r.status), use_color);
    }
    Ok(())
}

fn mark(ok: bool, use_color: bool) -> String {
    use colored::Colorize;
    match (ok, use_color) {
        (true, true) => "✓".green().to_string(),
        (false, true) => "✗".red().to_string(),
        (true, false) => "[OK]".to_string(),
        (false, false) => "[FAIL]".to_string(),
    }
}

fn print_status(response: &StatusResponse, relay_status: Option<String>, use_color: bool) {
    println!();
    println!("  teamdesk status");
    println!("  {}", "-".repeat(35));

    for c in &response.components {
        match &c.detail {
            Some(detail) => println!("    {:<14} {} {detail}", c.name, mark(c.healthy, use_color)),
            None => println!("    {:<14} {}", c.name, mark(c.healthy, use_color)),
        }
    }

    match (relay_status, &response.relay_uptime) {
        (Some(status), Some(uptime)) => println!(
            "    {:<14} {} {status} (uptime: {uptime})",
            "relay",
            mark(true, use_color)
        ),
        _ => {
            println!("    {:<14} {} not running", "relay", mark(false, use_color));
            println!("    Endpoint: {}", response.relay_endpoint);
            println!("    Start with: teamdesk relay");
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use teamdesk_test_utils::MockResponder;

    #[test]
    fn format_uptime_units() {
        assert_eq!(format_uptime(120), "2m");
        assert_eq!(format_uptime(3720), "1h 2m");
        assert_eq!(format_uptime(90060), "1d 1h 1m");
    }

    #[test]
    fn unhealthy_and_errors_are_not_healthy() {
        let down = component("supabase", Ok(HealthStatus::Unhealthy("timeout".into())));
        assert!(!down.healthy);
        assert_eq!(down.detail.as_deref(), Some("timeout"));

        let err = component("supabase", Err(TeamdeskError::Config("no url".into())));
        assert!(!err.healthy);
        assert!(err.detail.unwrap().contains("no url"));
    }

    #[tokio::test]
    async fn adapter_checks_use_adapter_name() {
        let status = check(&MockResponder::new()).await;
        assert_eq!(status.name, "mock-responder");
        assert!(status.healthy);
    }

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse {
            components: vec![component("gemini", Ok(HealthStatus::Healthy))],
            relay_running: false,
            relay_uptime: None,
            relay_endpoint: "http://127.0.0.1:8787/health".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"relay_running\":false"));
        assert!(json.contains("\"name\":\"gemini\""));
    }
}
