//! End-to-end CLI tests against a temporary shared root.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the developer's real config and environment.
fn isolated(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dropchat").unwrap();
    cmd.env("DROPCHAT_CONFIG", root.path().join("no-such-config.toml"));
    cmd.env_remove("DROPCHAT_ROOT");
    cmd.env_remove("DROPCHAT_USER");
    cmd
}

/// Build a command with the given args and the temp root appended.
fn run(root: &TempDir, args: &[&str]) -> Command {
    let mut cmd = isolated(root);
    cmd.args(args);
    cmd.arg("--root").arg(root.path());
    cmd
}

#[test]
fn help_lists_all_commands() {
    let tmp = TempDir::new().unwrap();
    let mut cmd = isolated(&tmp);
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("post"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("compact"));
}

#[test]
fn post_and_tail_round_trip() {
    let tmp = TempDir::new().unwrap();

    run(&tmp, &["init", "general"]).assert().success();
    run(&tmp, &["post", "general", "hello from the CLI", "--as", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Posted"));

    run(&tmp, &["tail", "general"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice: hello from the CLI"));
}

#[test]
fn post_json_emits_the_full_record() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["init", "general"]).assert().success();
    run(&tmp, &["post", "general", "hello", "--as", "alice", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"msg\""))
        .stdout(predicate::str::contains("\"from\":\"alice\""))
        .stdout(predicate::str::contains("\"replyTo\":null"));
}

#[test]
fn post_without_user_fails_with_guidance() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["post", "general", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No user name configured"));
}

#[test]
fn post_empty_text_fails_validation() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["init", "general"]).assert().success();
    run(&tmp, &["post", "general", "   ", "--as", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn tail_of_uninitialized_room_is_friendly() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["tail", "general"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not initialized"));
}

#[test]
fn presence_flow_heartbeat_then_who() {
    let tmp = TempDir::new().unwrap();

    // Without the presence directory the feature reports itself disabled.
    run(&tmp, &["who"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not enabled"));

    run(&tmp, &["init", "general", "--presence"]).assert().success();
    run(&tmp, &["heartbeat", "--as", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Heartbeat written for alice"));

    run(&tmp, &["who"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));
}

#[test]
fn compact_drains_old_messages_into_logs() {
    let tmp = TempDir::new().unwrap();

    run(&tmp, &["init", "general"]).assert().success();
    run(&tmp, &["post", "general", "to be archived", "--as", "alice"])
        .assert()
        .success();

    // A cutoff far in the future makes today's post due immediately.
    run(&tmp, &["compact", "general", "--through", "2099-12-30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 appended"))
        .stdout(predicate::str::contains("0 skipped"));

    // The spool is empty now; tail shows nothing.
    run(&tmp, &["tail", "general"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No messages"));
}

#[test]
fn compact_reports_lock_contention_informationally() {
    let tmp = TempDir::new().unwrap();
    run(&tmp, &["init", "general"]).assert().success();

    // Plant a valid, unexpired foreign lock.
    let lock_path = tmp
        .path()
        .join("rooms")
        .join("general")
        .join("logs")
        .join(".lock");
    std::fs::write(
        &lock_path,
        b"{\"createdAt\":\"2025-11-12T03:00:00.000Z\",\"expiresAt\":\"2099-01-01T00:00:00.000Z\",\"detail\":\"other client\"}\n",
    )
    .unwrap();

    run(&tmp, &["compact", "general"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compaction skipped"))
        .stdout(predicate::str::contains("other client"));
}
