use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

use crate::error::FixplsError;

/// Exit code and combined output of one run of the wrapped command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; -1 when the process was killed by a signal
    pub code: i32,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs the wrapped command
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput, FixplsError>;
}

/// Spawns the wrapped program directly, relaying its output live.
///
/// No shell is involved: arguments are passed as given, with no globbing,
/// variable expansion or pipes.
pub struct ProcessRunner {
    cwd: PathBuf,
}

impl ProcessRunner {
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &str, args: &[String]) -> Result<CommandOutput, FixplsError> {
        debug!("Spawning {} {:?} in {}", command, args, self.cwd.display());

        let mut child = Command::new(command)
            .args(args)
            .current_dir(&self.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FixplsError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("child stderr was not captured"))?;

        // Drain both pipes while waiting so the child never blocks on a full pipe
        let (out, err, status) = tokio::join!(
            relay(stdout, tokio::io::stdout()),
            relay(stderr, tokio::io::stderr()),
            child.wait()
        );
        let status = status?;
        let (out, err) = (out?, err?);

        Ok(CommandOutput {
            code: status.code().unwrap_or(-1),
            output: format!(
                "{}{}",
                String::from_utf8_lossy(&out),
                String::from_utf8_lossy(&err)
            ),
        })
    }
}

/// Copy everything from `reader` to `writer` as it arrives and keep a copy.
///
/// Write failures on our side (closed terminal, broken pipe) do not stop the
/// capture.
pub async fn relay<R, W>(mut reader: R, mut writer: W) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut buf = [0u8; 8192];
    let mut relaying = true;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if relaying && (writer.write_all(&buf[..n]).await.is_err() || writer.flush().await.is_err()) {
            relaying = false;
        }
        captured.extend_from_slice(&buf[..n]);
    }

    Ok(captured)
}
