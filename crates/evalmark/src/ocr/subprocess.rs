//! Running external OCR programs.

use crate::{EvalError, Result};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Run `program` with `args`, returning stdout as UTF-8 (lossy).
///
/// Spawn failures bubble up as `EvalError::Io`. Non-zero exit and timeout are
/// reported as `EvalError::Ocr` so the selector can move on to the next backend.
pub(crate) async fn run_ocr_command<I, S>(program: &str, args: I, timeout_secs: u64) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| std::io::Error::new(e.kind(), format!("Failed to execute {}: {}", program, e)))?;

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(std::io::Error::other(format!("Failed to wait for {}: {}", program, e)).into()),
        Err(_) => {
            return Err(EvalError::ocr(format!(
                "{} timed out after {} seconds",
                program, timeout_secs
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EvalError::ocr(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Whether `program --version` can be executed.
///
/// The probe is bounded by `timeout_secs`; a program that starts but does not
/// exit in time is killed and still counts as available.
pub(crate) async fn program_available(program: &str, timeout_secs: u64) -> bool {
    let mut child = match Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!("OCR program '{}' cannot be executed: {}", program, e);
            return false;
        }
    };

    if timeout(Duration::from_secs(timeout_secs), child.wait()).await.is_err() {
        tracing::debug!("OCR program '{}' did not answer --version within {}s", program, timeout_secs);
        let _ = child.kill().await;
    }
    true
}
