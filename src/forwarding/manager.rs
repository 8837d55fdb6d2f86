//! Forward process manager
//!
//! Each active forward is one spawned `ssh -N -L` child process. The
//! manager tracks children by id so the UI can list, stop, and restart
//! them; when the app exits, `kill_on_drop` reaps whatever is left.

use std::process::Stdio;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tracing::{info, warn};
use uuid::Uuid;

use super::PortForwardRule;

/// Grace period after spawn to catch immediate failures (unknown host,
/// port already bound)
const SPAWN_GRACE: Duration = Duration::from_millis(300);

/// Port forwarding errors
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Forward not found: {0}")]
    NotFound(String),

    #[error("ssh exited immediately: {0}")]
    SpawnFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl serde::Serialize for ForwardError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Status of a tracked forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardStatus {
    /// Child process is running
    Active,
    /// Child process has exited on its own
    Exited,
}

/// Snapshot of one tracked forward (for UI display)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardInfo {
    pub id: String,
    /// SSH destination (host alias or `user@host`)
    pub target: String,
    pub rule: PortForwardRule,
    pub status: ForwardStatus,
}

struct ActiveForward {
    target: String,
    rule: PortForwardRule,
    child: Child,
}

/// Registry of running port-forward processes
#[derive(Default)]
pub struct ForwardManager {
    forwards: DashMap<String, ActiveForward>,
}

impl ForwardManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a forward to `target` (a config host alias or `user@host`).
    ///
    /// Spawns `ssh -N -L <rule> <target>` and waits a short grace period
    /// so that immediate failures surface as an error instead of a
    /// zombie entry.
    pub async fn start(
        &self,
        target: &str,
        rule: PortForwardRule,
    ) -> Result<String, ForwardError> {
        let mut child = Command::new("ssh")
            .arg("-N")
            .arg("-o")
            .arg("ExitOnForwardFailure=yes")
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-L")
            .arg(rule.to_ssh_argument())
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        tokio::time::sleep(SPAWN_GRACE).await;
        if let Some(status) = child.try_wait()? {
            return Err(ForwardError::SpawnFailed(format!(
                "ssh -L {} {} exited with {}",
                rule.to_ssh_argument(),
                target,
                status
            )));
        }

        let id = Uuid::new_v4().to_string();
        info!("Started forward {} ({} via {})", id, rule, target);
        self.forwards.insert(
            id.clone(),
            ActiveForward {
                target: target.to_string(),
                rule,
                child,
            },
        );
        Ok(id)
    }

    /// Stop a forward by killing its ssh process
    pub async fn stop(&self, id: &str) -> Result<(), ForwardError> {
        let Some((_, mut forward)) = self.forwards.remove(id) else {
            return Err(ForwardError::NotFound(id.to_string()));
        };

        if let Err(e) = forward.child.kill().await {
            warn!("Failed to kill forward {}: {}", id, e);
        }
        info!("Stopped forward {} ({})", id, forward.rule);
        Ok(())
    }

    /// Stop all forwards (best-effort, for app shutdown)
    pub async fn stop_all(&self) {
        let ids: Vec<String> = self.forwards.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Err(e) = self.stop(&id).await {
                warn!("Failed to stop forward {} during shutdown: {}", id, e);
            }
        }
    }

    /// Snapshot all tracked forwards with their current status
    pub fn list(&self) -> Vec<ForwardInfo> {
        let mut infos: Vec<ForwardInfo> = self
            .forwards
            .iter_mut()
            .map(|mut entry| {
                let status = match entry.value_mut().child.try_wait() {
                    Ok(Some(_)) => ForwardStatus::Exited,
                    Ok(None) => ForwardStatus::Active,
                    Err(_) => ForwardStatus::Exited,
                };
                ForwardInfo {
                    id: entry.key().clone(),
                    target: entry.value().target.clone(),
                    rule: entry.value().rule.clone(),
                    status,
                }
            })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Number of tracked forwards
    pub fn len(&self) -> usize {
        self.forwards.len()
    }

    /// Whether no forwards are tracked
    pub fn is_empty(&self) -> bool {
        self.forwards.is_empty()
    }
}
