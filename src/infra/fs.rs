//! # File System Operations Module / 文件系统操作模块
//!
//! This module manages the per-worker scratch directories that hold captured
//! streams, diff output and crash artifacts, and copies the evidence of
//! failing tests out of them.
//!
//! 此模块管理每个工作者的临时目录（保存捕获的输出流、差异输出和崩溃产物），
//! 并将失败测试的证据从中复制出来。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the crash artifact a crashing decoder leaves in its working directory.
pub const CRASH_ARTIFACT: &str = "core";

/// A worker-private temporary directory. Removed from disk on drop.
///
/// 工作者私有的临时目录。在丢弃时从磁盘删除。
#[derive(Debug)]
pub struct WorkerScratch {
    _temp_root: TempDir,
    path: PathBuf,
}

impl WorkerScratch {
    /// Creates a uniquely named scratch directory for `worker` under `parent`
    /// (the system temp directory when `None`).
    pub fn create(parent: Option<&Path>, worker: usize) -> io::Result<Self> {
        let prefix = format!("capture-runner-w{worker}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let temp_dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let path = temp_dir.path().to_path_buf();
        Ok(Self {
            _temp_root: temp_dir,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stdout(&self) -> PathBuf {
        self.path.join("stdout.txt")
    }

    pub fn stderr(&self) -> PathBuf {
        self.path.join("stderr.txt")
    }

    pub fn diff_out(&self) -> PathBuf {
        self.path.join("diff.txt")
    }

    pub fn diff_err(&self) -> PathBuf {
        self.path.join("diff-stderr.txt")
    }

    pub fn crash_artifact(&self) -> PathBuf {
        self.path.join(CRASH_ARTIFACT)
    }

    /// Removes a crash artifact left by an earlier invocation. A missing
    /// artifact is not an error.
    pub fn clear_crash_artifact(&self) -> io::Result<()> {
        match fs::remove_file(self.crash_artifact()) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    pub fn crash_artifact_present(&self) -> bool {
        self.crash_artifact().exists()
    }

    /// Removes everything an earlier invocation in this directory may have
    /// left behind that is not overwritten by the next one.
    pub fn reset_for_run(&self) -> io::Result<()> {
        self.clear_crash_artifact()?;
        for stale in [self.diff_out(), self.diff_err()] {
            match fs::remove_file(stale) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Copies the captured output of a failing test into `dir`:
/// `<name>.out`, `<name>.out.diff` and `<name>.err` (the last two only when
/// they have content).
pub fn save_failure_artifacts(dir: &Path, name: &str, scratch: &WorkerScratch) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let sanitized_name = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect::<String>();

    copy_if_present(&scratch.stdout(), &dir.join(format!("{sanitized_name}.out")), true)?;
    copy_if_present(&scratch.diff_out(), &dir.join(format!("{sanitized_name}.out.diff")), false)?;
    copy_if_present(&scratch.stderr(), &dir.join(format!("{sanitized_name}.err")), false)?;
    Ok(())
}

fn copy_if_present(from: &Path, to: &Path, keep_empty: bool) -> io::Result<()> {
    match fs::metadata(from) {
        Ok(meta) if keep_empty || meta.len() > 0 => fs::copy(from, to).map(|_| ()),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
