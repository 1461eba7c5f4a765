// Shared test helpers for integration tests
#![allow(dead_code)]

use capture_runner::config::{BuildConfig, Capabilities, RunConfig};
use capture_runner::core::exit_status::ExitDecoder;
use capture_runner::infra::command::{Completion, Launcher, ProcessSpec};
use futures::future::BoxFuture;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

/// A run configuration rooted at `test_dir` with no build flags and no
/// decoder capabilities.
pub fn test_config(test_dir: &Path) -> RunConfig {
    let mut cfg = RunConfig::new(
        "/opt/decoder/bin/tcpdump",
        test_dir,
        BuildConfig::default(),
        Capabilities::default(),
    );
    cfg.exit_decoder = ExitDecoder::Posix;
    cfg.host_os = "linux".to_string();
    cfg
}

/// What a [`ScriptedLauncher`] does for one decoder invocation.
#[derive(Debug)]
pub struct Script {
    pub completion: io::Result<Completion>,
    pub stdout: String,
    pub stderr: String,
    /// Leave a crash artifact in the working directory.
    pub core: bool,
}

impl Script {
    pub fn exits(raw: i32) -> Self {
        Self {
            completion: Ok(Completion::Exited {
                raw,
                success: raw == 0,
            }),
            stdout: String::new(),
            stderr: String::new(),
            core: false,
        }
    }

    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Self::exits(0)
        }
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    pub fn with_core(mut self) -> Self {
        self.core = true;
        self
    }

    pub fn completes(completion: Completion) -> Self {
        Self {
            completion: Ok(completion),
            ..Self::exits(0)
        }
    }

    pub fn cannot_start() -> Self {
        Self {
            completion: Err(io::Error::new(io::ErrorKind::NotFound, "no such file or directory")),
            ..Self::exits(0)
        }
    }
}

/// A launcher that never spawns anything.
///
/// Decoder invocations follow `decoder` (chosen by the input path); `diff`
/// invocations succeed unless `diff_mismatch` is set. Every invocation is
/// recorded.
pub struct ScriptedLauncher {
    decoder: Box<dyn Fn(&ProcessSpec) -> Script + Send + Sync>,
    pub diff_mismatch: bool,
    calls: Mutex<Vec<ProcessSpec>>,
}

impl ScriptedLauncher {
    pub fn new(decoder: impl Fn(&ProcessSpec) -> Script + Send + Sync + 'static) -> Self {
        Self {
            decoder: Box::new(decoder),
            diff_mismatch: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn always(script: Script) -> Self {
        Self::new(move |_| Script {
            completion: match &script.completion {
                Ok(c) => Ok(*c),
                Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
            },
            stdout: script.stdout.clone(),
            stderr: script.stderr.clone(),
            core: script.core,
        })
    }

    pub fn calls(&self) -> Vec<ProcessSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn decoder_calls(&self) -> usize {
        self.calls().iter().filter(|spec| spec.program.to_str() != Some("diff")).count()
    }

    fn answer(&self, spec: &ProcessSpec) -> io::Result<Completion> {
        self.calls.lock().unwrap().push(spec.clone());
        if spec.program.to_str() == Some("diff") {
            if self.diff_mismatch {
                fs::write(&spec.stdout, "-expected\n+actual\n")?;
                return Ok(Completion::Exited {
                    raw: 0x100,
                    success: false,
                });
            }
            fs::write(&spec.stdout, "")?;
            return Ok(Completion::Exited { raw: 0, success: true });
        }

        let script = (self.decoder)(spec);
        let completion = script.completion?;
        fs::write(&spec.stdout, &script.stdout)?;
        fs::write(&spec.stderr, &script.stderr)?;
        if script.core {
            fs::write(spec.cwd.join("core"), "")?;
        }
        Ok(completion)
    }
}

impl Launcher for ScriptedLauncher {
    fn launch<'a>(&'a self, spec: &'a ProcessSpec) -> BoxFuture<'a, io::Result<Completion>> {
        let answer = self.answer(spec);
        Box::pin(async move { answer })
    }
}

/// A decoder stand-in: answers the capability probes, prints the progress
/// line on stderr and copies the capture to stdout. Captures whose name
/// contains `crash` kill the decoder with SIGSEGV.
pub const STUB_DECODER: &str = r#"#!/bin/sh
case "$1" in
  --fp-type) echo 9877; exit 0 ;;
  --time-t-size) echo 64; exit 0 ;;
esac
input=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-r" ]; then
    shift
    input="$1"
  fi
  shift
done
case "$input" in
  *crash*) kill -SEGV $$ ;;
esac
echo "reading from file $input, link-type EN10MB (Ethernet), snapshot length 262144" >&2
exec cat "$input"
"#;

/// A throwaway project: a test directory with a test list, a build header
/// and (on Unix) an executable stub decoder.
pub struct Project {
    pub root: TempDir,
}

impl Project {
    pub fn new(test_list: &str) -> Self {
        let root = tempdir().expect("Failed to create temporary directory");
        fs::create_dir_all(root.path().join("tests")).expect("Failed to create tests directory");
        fs::write(root.path().join("tests/TESTLIST"), test_list).expect("Failed to write TESTLIST");
        fs::write(
            root.path().join("config.h"),
            "/* config.h */\n#define HAVE_PCAP 1\n/* #undef HAVE_LIBCRYPTO */\n",
        )
        .expect("Failed to write config.h");
        fs::write(root.path().join("tcpdump"), STUB_DECODER).expect("Failed to write stub decoder");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(root.path().join("tcpdump"), fs::Permissions::from_mode(0o755))
                .expect("Failed to make stub decoder executable");
        }
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn test_dir(&self) -> PathBuf {
        self.root.path().join("tests")
    }

    pub fn write(&self, relative: &str, contents: &str) {
        fs::write(self.test_dir().join(relative), contents).expect("Failed to write fixture");
    }
}
