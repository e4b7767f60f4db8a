/// Smoke tests to verify the binary runs without panicking
use std::process::Command;

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // skip to the final byte of the CSI sequence
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[test]
fn binary_shows_help() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --help: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("meterview"), "Help output should mention meterview");
    assert!(stdout.contains("watch"));
    assert!(stdout.contains("replay"));
}

#[test]
fn binary_shows_version() {
    let output = Command::new("cargo")
        .args(["run", "--", "--version"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "Binary failed to run --version: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_subcommand_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "nonexistent-command"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        !output.status.success(),
        "Invalid subcommand should return error status"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked at"),
        "Invalid subcommand should not cause panic"
    );
}

#[test]
fn replay_print_renders_fixture() {
    let output = Command::new("cargo")
        .args(["run", "--", "replay", "--print", "tests/fixtures/session.jsonl"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(
        output.status.success(),
        "replay --print failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let screen = strip_ansi(&String::from_utf8_lossy(&output.stdout));
    assert!(screen.contains("SERVER STATUS"));
    assert!(screen.contains("Actual sample rate: 44099.870"));
    assert!(screen.contains("Average CPU usage: 3.500%"));
    assert!(screen.contains("UGen count: 48"));
    assert!(screen.contains("IN"));
    assert!(screen.contains("OUT"));
    assert!(screen.contains("6 msgs, 1 ignored, 1 dropped"));
}

#[test]
fn replay_missing_file_fails_gracefully() {
    let output = Command::new("cargo")
        .args(["run", "--", "replay", "--print", "tests/fixtures/does-not-exist.jsonl"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read replay file"));
    assert!(!stderr.contains("panicked at"));
}

#[test]
fn watch_rejects_bad_host() {
    let output = Command::new("cargo")
        .args(["run", "--", "watch", "--host", "ws://nowhere/path", "--log-file", "/tmp/meterview-smoke.log"])
        .output()
        .expect("Failed to execute cargo run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid server host"));
}
