//! Workflow execution coordination.
//!
//! Resolves the live CDP endpoint for a target browser, compiles the
//! workflow, and dispatches the script to a registered execution server.
//! This component performs no retries; retry and sequencing policy belong to
//! the task runner.

use crate::models::{Edge, Node, Server};
use crate::script::{self, CompileError};
use crate::session::PortCache;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BrowserType {
    Chrome,
    LinkenSphere,
}

/// Names the browser connection a workflow runs against, plus the port it
/// was selected with. For provider sessions the effective debug port is
/// recovered from the durable cache at run time.
#[derive(Debug, Clone)]
pub struct BrowserTarget {
    pub browser_type: BrowserType,
    pub browser_port: u16,
    pub session_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("No server selected")]
    NoServerSelected,
    #[error("No nodes in workflow")]
    EmptyWorkflow,
    #[error("Invalid browser port: {0}")]
    InvalidPort(u16),
    #[error("Session ID is required for LinkenSphere connections")]
    SessionIdRequired,
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("execution request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Remote { message: String },
    #[error(transparent)]
    Cache(#[from] anyhow::Error),
}

pub struct ExecutionCoordinator {
    client: reqwest::Client,
    cache: Arc<dyn PortCache>,
    provider_port: u16,
    server_token: String,
}

impl ExecutionCoordinator {
    pub fn new(provider_port: u16, server_token: &str, cache: Arc<dyn PortCache>) -> Self {
        Self {
            client: reqwest::Client::new(),
            cache,
            provider_port,
            server_token: server_token.to_string(),
        }
    }

    /// Compile the workflow and execute it against the target browser on the
    /// given server. Returns the server's parsed success payload.
    pub async fn run(
        &self,
        server: Option<&Server>,
        nodes: &[Node],
        edges: &[Edge],
        target: &BrowserTarget,
    ) -> Result<Value, ExecutionError> {
        let server = server.ok_or(ExecutionError::NoServerSelected)?;
        if nodes.is_empty() {
            return Err(ExecutionError::EmptyWorkflow);
        }
        if target.browser_port == 0 {
            return Err(ExecutionError::InvalidPort(target.browser_port));
        }

        let script = script::compile(nodes, edges)?;

        let mut debug_port = target.browser_port;
        let mut browser_info = None;
        let mut ws_endpoint = None;

        if target.browser_type == BrowserType::LinkenSphere {
            let session_id = target
                .session_id
                .as_deref()
                .ok_or(ExecutionError::SessionIdRequired)?;

            match self.cache.get(session_id)? {
                Some(port) => debug_port = port,
                None => warn!(
                    session_id,
                    port = target.browser_port,
                    "No cached debug port for session, using provided port"
                ),
            }

            let (info, ws) = self.resolve_ws_endpoint(debug_port).await;
            browser_info = info;
            // The remote executor may still succeed with the raw port, so a
            // failed probe only downgrades to a synthetic endpoint.
            ws_endpoint = Some(ws.unwrap_or_else(|| {
                format!("ws://127.0.0.1:{debug_port}/devtools/page/page")
            }));
        }

        let connection_port = match target.browser_type {
            BrowserType::LinkenSphere => self.provider_port,
            BrowserType::Chrome => target.browser_port,
        };

        let payload = json!({
            "script": script.text,
            "browserConnection": {
                "port": connection_port,
                "debugPort": debug_port,
                "browserType": target.browser_type,
                "sessionId": target.session_id,
                "browserInfo": browser_info,
                "wsEndpoint": ws_endpoint,
                "isAutomationRunning": true,
            },
            "nodes": nodes,
            "edges": edges,
            "serverId": server.id,
        });

        info!(
            server_id = %server.id,
            debug_port,
            node_count = script.node_count,
            "Dispatching workflow execution"
        );

        let response = self
            .client
            .post(format!("{}/execute-workflow", server.url))
            .bearer_auth(&self.server_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| status.to_string());
            return Err(ExecutionError::Remote { message });
        }

        Ok(response.json().await?)
    }

    /// Discover the WebSocket debugger URL for a debug port.
    ///
    /// Tries the open page list first, then a URL embedded in the devtools
    /// frontend link, then the browser version endpoint. Every probe failure
    /// is non-fatal.
    async fn resolve_ws_endpoint(&self, port: u16) -> (Option<Value>, Option<String>) {
        let mut ws = None;

        match self
            .client
            .get(format!("http://127.0.0.1:{port}/json/list"))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                if let Ok(pages) = response.json::<Vec<Value>>().await
                    && let Some(first) = pages.first()
                {
                    ws = first
                        .get("webSocketDebuggerUrl")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .or_else(|| {
                            first
                                .get("devtoolsFrontendUrl")
                                .and_then(Value::as_str)
                                .and_then(extract_ws_from_devtools_url)
                        });
                }
            }
            Ok(response) => debug!(port, status = %response.status(), "Page list probe refused"),
            Err(err) => debug!(port, error = %err, "Page list probe failed"),
        }

        if ws.is_some() {
            return (None, ws);
        }

        match self
            .client
            .get(format!("http://127.0.0.1:{port}/json/version"))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                if let Ok(info) = response.json::<Value>().await {
                    ws = info
                        .get("webSocketDebuggerUrl")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    return (Some(info), ws);
                }
            }
            Ok(response) => debug!(port, status = %response.status(), "Version probe refused"),
            Err(err) => debug!(port, error = %err, "Version probe failed"),
        }

        (None, None)
    }
}

/// Pull a percent-encoded WebSocket URL out of a devtools frontend link.
fn extract_ws_from_devtools_url(url: &str) -> Option<String> {
    static WS_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new("ws=([^&]+)").expect("ws pattern compiles"));

    WS_RE.captures(url).and_then(|caps| {
        let raw = caps.get(1)?.as_str();
        Some(
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string()),
        )
    })
}
