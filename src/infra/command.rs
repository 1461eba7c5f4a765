//! # Process Layer / 进程层
//!
//! Every external invocation (the decoder under test and the content diff)
//! goes through the [`Launcher`] trait, so the runner can be exercised with a
//! stub that records invocations instead of spawning processes.
//!
//! 所有外部调用（被测解码器和内容比较）都通过 [`Launcher`] trait 进行，
//! 因此可以用记录调用而不派生进程的桩实现来测试运行器。

use futures::future::BoxFuture;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Child;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A fully described external invocation with redirected streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
    /// Added to the inherited environment.
    pub env: Vec<(String, String)>,
    /// Truncated and receives standard output.
    pub stdout: PathBuf,
    /// Truncated and receives standard error.
    pub stderr: PathBuf,
    /// Wall-clock budget; the process group is killed when it runs out.
    pub timeout: Option<Duration>,
}

impl ProcessSpec {
    /// The command line, quoted for a POSIX shell.
    pub fn display_command(&self) -> String {
        let parts: Vec<String> = std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect();
        shlex::try_join(parts.iter().map(String::as_str)).unwrap_or_else(|_| parts.join(" "))
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The process exited. `raw` is the platform completion code.
    Exited { raw: i32, success: bool },
    /// The budget ran out and the process group was killed.
    TimedOut,
    /// The run was interrupted and the process group was killed.
    Interrupted,
}

/// Starts external processes and waits for them.
pub trait Launcher: Send + Sync {
    /// Runs `spec` to completion. An `Err` means the process could not be
    /// started (or its output files could not be created).
    fn launch<'a>(&'a self, spec: &'a ProcessSpec) -> BoxFuture<'a, io::Result<Completion>>;
}

/// Spawns real processes with tokio.
///
/// On Unix every child leads its own process group, which is killed as a
/// whole on timeout or interruption.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    cancel: CancellationToken,
}

impl SystemLauncher {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    async fn run(&self, spec: &ProcessSpec) -> io::Result<Completion> {
        let stdout = File::create(&spec.stdout)?;
        let stderr = File::create(&spec.stderr)?;

        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        debug!(command = %spec.display_command(), cwd = %spec.cwd.display(), "spawning");
        let mut child = cmd.spawn()?;

        let deadline = async {
            match spec.timeout {
                Some(budget) => tokio::time::sleep(budget).await,
                None => std::future::pending().await,
            }
        };

        let wake = tokio::select! {
            status = child.wait() => Wake::Exited(status),
            _ = deadline => Wake::Deadline,
            _ = self.cancel.cancelled() => Wake::Cancelled,
        };

        match wake {
            Wake::Exited(status) => {
                let status = status?;
                Ok(Completion::Exited {
                    raw: raw_status(status),
                    success: status.success(),
                })
            }
            Wake::Deadline => {
                debug!(command = %spec.display_command(), "timed out, killing process group");
                reclaim(&mut child).await;
                Ok(Completion::TimedOut)
            }
            Wake::Cancelled => {
                reclaim(&mut child).await;
                Ok(Completion::Interrupted)
            }
        }
    }
}

impl Launcher for SystemLauncher {
    fn launch<'a>(&'a self, spec: &'a ProcessSpec) -> BoxFuture<'a, io::Result<Completion>> {
        Box::pin(self.run(spec))
    }
}

enum Wake {
    Exited(io::Result<ExitStatus>),
    Deadline,
    Cancelled,
}

/// Kills the child's whole process group and reaps the child.
async fn reclaim(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            // SAFETY: the child leads its own process group (`process_group(0)`)
            // and has not been reaped yet, so the group id is still ours.
            unsafe {
                libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = child.start_kill();
    }
    let _ = child.wait().await;
}

#[cfg(unix)]
fn raw_status(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.into_raw()
}

#[cfg(not(unix))]
fn raw_status(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
