// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_flags() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("--interval")
        .stdout_has("--all-users")
        .stdout_has("--once")
        .stdout_has("--compact")
        .stdout_has("--webhook-url")
        .stdout_has("--no-notify");
}

#[test]
fn version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn unknown_format_is_rejected() {
    cli().args(&["--once", "--format", "yaml"]).fails_with(2).stderr_has("invalid value");
}

#[test]
fn no_notify_conflicts_with_webhook() {
    cli()
        .args(&["--no-notify", "--webhook-url", "http://localhost:1"])
        .fails_with(2)
        .stderr_has("cannot be used with");
}
