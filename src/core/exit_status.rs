//! # Exit-Status Decoder / 退出状态解码器
//!
//! Translates the raw completion code reported by the platform's wait
//! primitive into an [`ExitOutcome`]. The encoding differs per host, so the
//! decoder is a small closed set of variants picked once at startup.
//!
//! 将平台等待原语返回的原始完成码转换为 [`ExitOutcome`]。
//! 不同主机的编码不同，因此解码器是在启动时选定的一组封闭变体。

use serde::Serialize;
use std::fmt;

/// Set in a POSIX wait status when the process left a core dump.
const POSIX_CORE_FLAG: i32 = 0x80;
/// Low bits of a POSIX wait status naming the terminating signal.
const POSIX_SIGNAL_MASK: i32 = 0x7f;
/// Severity bits of an NTSTATUS error value (e.g. `0xC0000005`).
const NT_ERROR_SEVERITY: u32 = 0xC000_0000;

/// The normalized result of one process completion.
///
/// Only lives for the duration of a single runner invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitOutcome {
    /// The exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// `true` when the process is considered to have crashed.
    pub crashed: bool,
    /// The crash cause when known: a signal number on POSIX hosts, the
    /// NTSTATUS value on Windows.
    pub crash_signal: Option<i32>,
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.crashed, self.crash_signal, self.exit_code) {
            (true, Some(signal), _) => write!(f, "crashed with signal {signal}"),
            (true, None, _) => write!(f, "crashed (core dump found)"),
            (false, _, Some(code)) => write!(f, "exit code {code}"),
            (false, _, None) => write!(f, "terminated abnormally"),
        }
    }
}

/// Which raw completion-code encoding the host produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExitDecoder {
    /// A POSIX `wait(2)` status word.
    Posix,
    /// The exit code of a process spawned directly (no shell) on Windows.
    Windows,
    /// The status of a process run through a command shell, as a shell reports
    /// it: exit code in bits 8..16.
    ///
    /// The shell does not reliably propagate exception codes, so no crash
    /// detection is possible with this encoding. This is a known fidelity gap.
    ShellWrapped,
}

impl ExitDecoder {
    /// The decoder matching how this host reports child completion.
    pub fn host() -> Self {
        if cfg!(windows) {
            ExitDecoder::Windows
        } else {
            ExitDecoder::Posix
        }
    }

    /// Decodes `raw`.
    ///
    /// `core_dumped` reports whether a crash artifact appeared in the working
    /// directory of the run. It is only meaningful if any stale artifact was
    /// removed before the process was started.
    pub fn decode(self, raw: i32, core_dumped: bool) -> ExitOutcome {
        match self {
            ExitDecoder::Posix => decode_posix(raw, core_dumped),
            ExitDecoder::Windows => decode_windows(raw),
            ExitDecoder::ShellWrapped => ExitOutcome {
                exit_code: Some((raw >> 8) & 0xff),
                crashed: false,
                crash_signal: None,
            },
        }
    }
}

fn decode_posix(raw: i32, core_dumped: bool) -> ExitOutcome {
    if raw & POSIX_CORE_FLAG != 0 {
        return ExitOutcome {
            exit_code: None,
            crashed: true,
            crash_signal: Some(raw & POSIX_SIGNAL_MASK),
        };
    }
    if core_dumped {
        return ExitOutcome {
            exit_code: None,
            crashed: true,
            crash_signal: None,
        };
    }
    // WIFEXITED
    if raw & POSIX_SIGNAL_MASK == 0 {
        return ExitOutcome {
            exit_code: Some((raw >> 8) & 0xff),
            crashed: false,
            crash_signal: None,
        };
    }
    ExitOutcome::default()
}

fn decode_windows(raw: i32) -> ExitOutcome {
    if (raw as u32) & NT_ERROR_SEVERITY == NT_ERROR_SEVERITY {
        ExitOutcome {
            exit_code: None,
            crashed: true,
            crash_signal: Some(raw),
        }
    } else {
        ExitOutcome {
            exit_code: Some(raw),
            crashed: false,
            crash_signal: None,
        }
    }
}
