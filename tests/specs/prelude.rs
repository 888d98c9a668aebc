// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for specs

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;

pub const SPEC_USER: &str = "spec-user";

/// Job lines in `squeue -o '%i|%j|%u|%P|%T|%M|%l|%D|%R|%b'` form.
pub const JOBS: &str = "\
101|train-llm|spec-user|gpu|RUNNING|1:02:03|4:00:00|1|node01|gpu:a100:4
102|eval|spec-user|gpu|PENDING|0:00|1:00:00|1|Resources|gpu:1";

/// `sinfo -o '%P|%a|%D|%C'` rows
pub const PARTITIONS: &str = "\
gpu*|up|2|40/24/0/64
cpu|up|4|10/118/0/128";

/// `sinfo -o '%P|%G|%D|%t|%C'` rows
pub const NODE_GROUPS: &str = "\
gpu|gpu:a100:8(S:0-1)|1|mix|16/16/0/32
gpu|gpu:a100:8(S:0-1)|1|idle|0/32/0/32
cpu|(null)|4|mix|10/118/0/128";

/// Isolated environment with fake scheduler tools.
pub struct Cluster {
    dir: TempDir,
}

impl Cluster {
    pub fn new() -> Self {
        Self::with_jobs(JOBS)
    }

    pub fn with_jobs(jobs: &str) -> Self {
        let cluster = Self { dir: TempDir::new().unwrap() };
        cluster.tool("squeue", &print_script(jobs, 0));
        let sinfo = format!(
            "case \"$*\" in\n  *%G*) cat <<'OUT'\n{NODE_GROUPS}\nOUT\n;;\n  *) cat <<'OUT'\n{PARTITIONS}\nOUT\n;;\nesac\n"
        );
        cluster.tool("sinfo", &sinfo);
        cluster
    }

    /// Replace `squeue` with one that fails with `stderr`.
    pub fn failing_squeue(self, stderr: &str) -> Self {
        self.tool("squeue", &format!("echo '{stderr}' >&2\nexit 1\n"));
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the cluster root.
    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Arguments the fake `squeue` was last called with.
    pub fn squeue_args(&self) -> String {
        std::fs::read_to_string(self.dir.path().join("squeue.args")).unwrap().trim().to_string()
    }

    fn tool(&self, name: &str, body: &str) {
        let args_file = self.dir.path().join(format!("{name}.args"));
        let script = format!("#!/bin/sh\necho \"$@\" > '{}'\n{body}", args_file.display());
        let path = self.dir.path().join(name);
        std::fs::write(&path, script).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
    }

    pub fn monitor(&self) -> CliBuilder {
        let root = self.dir.path();
        let mut builder = cli();
        builder
            .cmd
            .env("HOME", root)
            .env("XDG_CONFIG_HOME", root.join("config"))
            .env("SLURM_MONITOR_STATE_DIR", root.join("state"))
            .env("SLURM_MONITOR_SQUEUE", root.join("squeue"))
            .env("SLURM_MONITOR_SINFO", root.join("sinfo"))
            .env("USER", SPEC_USER);
        builder
    }
}

fn print_script(stdout: &str, code: i32) -> String {
    format!("cat <<'OUT'\n{stdout}\nOUT\nexit {code}\n")
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

/// The binary with a clean environment and color disabled.
pub fn cli() -> CliBuilder {
    let mut cmd = assert_cmd::Command::cargo_bin("slurm-monitor").unwrap();
    for (key, _) in std::env::vars() {
        if key.starts_with("SLURM_MONITOR_") || key == "RUST_LOG" || key == "COLOR" {
            cmd.env_remove(key);
        }
    }
    cmd.env("NO_COLOR", "1");
    CliBuilder { cmd }
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails_with(mut self, code: i32) -> RunAssert {
        let output = self.cmd.output().unwrap();
        assert_eq!(
            output.status.code(),
            Some(code),
            "unexpected exit status\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {needle:?}:\n{stdout}");
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(needle), "stdout unexpectedly has {needle:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {needle:?}:\n{stderr}");
        self
    }
}
