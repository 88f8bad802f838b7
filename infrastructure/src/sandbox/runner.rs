//! Script execution harness.
//!
//! Each run spawns `<interpreter> <script>` inside the workspace with stdin
//! closed, in its own process group. The timeout bounds the whole run,
//! including draining stdout and stderr. On timeout the whole group is
//! killed and the child reaped before the error is returned.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::SandboxError;

/// Per-process ceilings applied to every script. `0` disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub cpu_secs: u64,
    pub memory_mb: u64,
}

/// Output of a script that ran to completion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the script was terminated by a signal
    pub exit_code: i32,
}

#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    default_timeout: Duration,
    max_timeout: Duration,
    limits: ResourceLimits,
}

impl ScriptRunner {
    pub fn new(interpreter: impl Into<String>, default_timeout: Duration, max_timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            default_timeout,
            max_timeout,
            limits: ResourceLimits {
                cpu_secs: 0,
                memory_mb: 0,
            },
        }
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Requested timeout in seconds, defaulted and clamped to `[1, max]`.
    pub fn effective_timeout(&self, requested_secs: Option<i64>) -> Duration {
        let Some(secs) = requested_secs else {
            return self.default_timeout.min(self.max_timeout);
        };
        Duration::from_secs(secs.max(1) as u64).min(self.max_timeout)
    }

    /// Run `script` with `workdir` as the current directory.
    pub async fn run(
        &self,
        script: &Path,
        workdir: &Path,
        timeout: Duration,
    ) -> Result<RunOutput, SandboxError> {
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(script)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            let limits = self.limits;
            // SAFETY: the closure only issues async-signal-safe syscalls.
            unsafe {
                cmd.pre_exec(move || apply_limits(limits));
            }
        }

        let mut child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            interpreter: self.interpreter.clone(),
            source,
        })?;
        let pid = child.id();
        debug!(script = %script.display(), pid = ?pid, timeout_secs = timeout.as_secs(), "Script started");

        let mut stdout_reader = tokio::spawn(read_all(child.stdout.take()));
        let mut stderr_reader = tokio::spawn(read_all(child.stderr.take()));

        // The deadline covers the wait and both pipes.
        let finished = tokio::time::timeout(timeout, async {
            let status = child.wait().await?;
            // Stragglers left in the group would hold the pipes open.
            kill_group(pid);
            let stdout = (&mut stdout_reader).await.unwrap_or_default();
            let stderr = (&mut stderr_reader).await.unwrap_or_default();
            Ok::<_, std::io::Error>((status, stdout, stderr))
        })
        .await;

        let (status, stdout, stderr) = match finished {
            Ok(outcome) => outcome?,
            Err(_) => {
                warn!(script = %script.display(), pid = ?pid, "Script timed out, killing process group");
                kill_group(pid);
                let _ = child.kill().await;
                stdout_reader.abort();
                stderr_reader.abort();
                return Err(SandboxError::Timeout);
            }
        };

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code().unwrap_or(-1),
        })
    }
}

async fn read_all<R: tokio::io::AsyncRead + Unpin>(stream: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut stream) = stream {
        let _ = stream.read_to_end(&mut buf).await;
    }
    buf
}

#[cfg(unix)]
fn kill_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // SAFETY: plain syscall; ESRCH when the group is already gone.
        unsafe {
            libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) {}

#[cfg(unix)]
fn apply_limits(limits: ResourceLimits) -> std::io::Result<()> {
    // SAFETY: setpgid(0, 0) only moves the calling process into a new group.
    if unsafe { libc::setpgid(0, 0) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    if limits.cpu_secs > 0 {
        set_limit(libc::RLIMIT_CPU, limits.cpu_secs)?;
    }
    if limits.memory_mb > 0 {
        set_limit(libc::RLIMIT_AS, limits.memory_mb.saturating_mul(1024 * 1024))?;
    }

    #[cfg(target_os = "linux")]
    // SAFETY: prctl with PR_SET_PDEATHSIG takes a plain signal number.
    unsafe {
        libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL);
    }

    Ok(())
}

#[cfg(all(unix, target_os = "linux", target_env = "gnu"))]
type Resource = libc::__rlimit_resource_t;
#[cfg(not(all(unix, target_os = "linux", target_env = "gnu")))]
type Resource = libc::c_int;

#[cfg(unix)]
fn set_limit(resource: Resource, value: u64) -> std::io::Result<()> {
    let limit = libc::rlimit {
        rlim_cur: value as libc::rlim_t,
        rlim_max: value as libc::rlim_t,
    };
    // SAFETY: `limit` is a valid rlimit for the duration of the call.
    if unsafe { libc::setrlimit(resource, &limit) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh_runner() -> ScriptRunner {
        ScriptRunner::new("sh", Duration::from_secs(30), Duration::from_secs(300))
    }

    #[test]
    fn test_effective_timeout() {
        let runner = ScriptRunner::new("sh", Duration::from_secs(30), Duration::from_secs(60));
        assert_eq!(runner.effective_timeout(None), Duration::from_secs(30));
        assert_eq!(runner.effective_timeout(Some(5)), Duration::from_secs(5));
        assert_eq!(runner.effective_timeout(Some(0)), Duration::from_secs(1));
        assert_eq!(runner.effective_timeout(Some(-3)), Duration::from_secs(1));
        assert_eq!(runner.effective_timeout(Some(600)), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_run_captures_output_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("t.sh");
        std::fs::write(&script, "echo out\necho err >&2\nexit 3\n").unwrap();

        let output = sh_runner()
            .run(&script, dir.path(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.exit_code, 3);
    }

    #[tokio::test]
    async fn test_stdin_is_closed() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("t.sh");
        std::fs::write(&script, "cat\necho done\n").unwrap();

        let output = sh_runner()
            .run(&script, dir.path(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout, "done\n");
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("slow.sh");
        std::fs::write(&script, "echo $$ > pid.txt\necho partial\nsleep 30\n").unwrap();

        let err = sh_runner()
            .run(&script, dir.path(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Timeout));

        let pid: libc::pid_t = std::fs::read_to_string(dir.path().join("pid.txt"))
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let alive = unsafe { libc::kill(pid, 0) } == 0;
        assert!(!alive, "script process {pid} survived the timeout");
    }

    #[tokio::test]
    async fn test_timeout_covers_detached_descendants() {
        if which::which("setsid").is_err() {
            eprintln!("setsid not installed, skipping");
            return;
        }
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("detach.sh");
        std::fs::write(&script, "setsid sleep 8 &\necho started\n").unwrap();

        let started = std::time::Instant::now();
        let err = sh_runner()
            .run(&script, dir.path(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("t.sh");
        std::fs::write(&script, "true\n").unwrap();

        let runner = ScriptRunner::new(
            "definitely-not-an-interpreter",
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        let err = runner
            .run(&script, dir.path(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Spawn { .. }));
    }
}
