//! One-shot connectivity probe.
//!
//! Runs at startup and on `/status`. The result only drives what the
//! front-end shows; sending is never blocked on it.

use std::fmt;
use std::time::Instant;

use crate::session::SessionContext;
use crate::traits::HttpClient;
use crate::transport::{AssistantClient, HealthStatus};

/// Result of a connectivity probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionReport {
    pub connected: bool,
    pub response_time_ms: Option<u64>,
    pub status: Option<HealthStatus>,
    pub error_message: Option<String>,
}

/// Probe `GET /health` and record the result in the context's
/// connectivity flag.
pub async fn probe_connection<C: HttpClient>(
    client: &AssistantClient<C>,
    context: &mut SessionContext,
) -> ConnectionReport {
    let start = Instant::now();
    let report = match client.health_check().await {
        Ok(status) => ConnectionReport {
            connected: status.is_healthy(),
            response_time_ms: Some(start.elapsed().as_millis() as u64),
            error_message: (!status.is_healthy()).then(|| status.message.clone()),
            status: Some(status),
        },
        Err(e) => {
            tracing::debug!(error = %e, "Health probe failed");
            ConnectionReport {
                connected: false,
                response_time_ms: None,
                status: None,
                error_message: Some(e.user_message()),
            }
        }
    };

    context.set_connected(report.connected);
    report
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.connected {
            match self.response_time_ms {
                Some(ms) => write!(f, "✓ Server responding ({}ms)", ms),
                None => write!(f, "✓ Server healthy"),
            }
        } else {
            write!(f, "✗ Server not ready")?;
            if let Some(message) = self.error_message.as_deref().filter(|m| !m.is_empty()) {
                write!(f, ": {}", message)?;
            }
            Ok(())
        }
    }
}
