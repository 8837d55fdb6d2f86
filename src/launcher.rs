//! Terminal launch integration
//!
//! Opens the platform terminal running `ssh <host>` for a stored
//! connection. On macOS this goes through `osascript` to drive
//! Terminal.app; elsewhere it falls back to the distribution's default
//! terminal emulator.

use tokio::process::Command;
use tracing::info;

/// Terminal launch errors
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Terminal launch failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl serde::Serialize for LaunchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Open a terminal window connected to the named config host.
///
/// The host stanza in `~/.ssh/config` carries user, port, and identity
/// file, so the launched command is simply `ssh <name>`.
pub async fn launch_terminal(host_name: &str) -> Result<(), LaunchError> {
    let ssh_command = format!("ssh {}", host_name);
    info!("Launching terminal: {}", ssh_command);
    run_in_terminal(&ssh_command).await
}

#[cfg(target_os = "macos")]
async fn run_in_terminal(command: &str) -> Result<(), LaunchError> {
    // AppleScript string literals escape backslash and double quote
    let escaped = command.replace('\\', "\\\\").replace('"', "\\\"");
    let script = format!("tell application \"Terminal\" to do script \"{}\"", escaped);

    let output = Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .arg("-e")
        .arg("tell application \"Terminal\" to activate")
        .output()
        .await?;

    if !output.status.success() {
        return Err(LaunchError::CommandFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(())
}

#[cfg(all(unix, not(target_os = "macos")))]
async fn run_in_terminal(command: &str) -> Result<(), LaunchError> {
    let candidates: [(&str, &[&str]); 3] = [
        ("x-terminal-emulator", &["-e"]),
        ("gnome-terminal", &["--"]),
        ("xterm", &["-e"]),
    ];

    let args: Vec<&str> = command.split_whitespace().collect();
    let mut last_error = None;
    for (terminal, flags) in candidates {
        match Command::new(terminal).args(flags).args(&args).spawn() {
            Ok(_) => return Ok(()),
            Err(e) => last_error = Some(e),
        }
    }

    Err(LaunchError::CommandFailed(match last_error {
        Some(e) => format!("no terminal emulator found: {}", e),
        None => "no terminal emulator found".to_string(),
    }))
}

#[cfg(windows)]
async fn run_in_terminal(command: &str) -> Result<(), LaunchError> {
    Command::new("cmd")
        .args(["/C", "start", "cmd", "/K", command])
        .spawn()?;
    Ok(())
}
