//! End-to-end tests with a real directory sandbox and `sh`.
//!
//! These use temp directories for sandbox roots, suitable for CI.

use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use devops_lab::{DispatchOutcome, LabConfig, LabController, TerminalLog};

fn config_in(dir: &TempDir) -> LabConfig {
    LabConfig::default()
        .with_sandbox_dir(dir.path())
        .with_check_delay(Duration::from_millis(10))
        .with_autosave_delay(Duration::from_millis(50))
}

#[tokio::test]
async fn boot_mounts_the_template_bundle() {
    let base = TempDir::new().expect("failed to create base dir");
    let lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .expect("lab should boot");

    let root = lab.sandbox().root();
    assert!(root.starts_with(base.path()));
    assert!(root.join("k8s/hpa.yaml").is_file());
    assert!(root.join("package.json").is_file());
    assert!(lab.terminal().is_empty(), "no setup command configured");
}

#[tokio::test]
async fn shell_commands_see_mounted_files() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    let outcome = lab.run_command("grep -c 'kind: Service' k8s/service.yaml").await;

    assert_eq!(outcome, DispatchOutcome::Exited(0));
    assert_eq!(lab.terminal().last(), Some("1"));
}

#[tokio::test]
async fn failing_shell_command_reports_exit_code() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    let outcome = lab.run_command("echo oops >&2; exit 4").await;

    assert_eq!(outcome, DispatchOutcome::Exited(4));
    let lines = lab.terminal().lines();
    assert_eq!(lines[lines.len() - 2], "oops");
    assert_eq!(lines[lines.len() - 1], "❌ Command failed with exit code 4");
}

#[tokio::test]
async fn saved_buffer_lands_in_the_sandbox() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    lab.edit("console.log('saved');");
    lab.save().await;

    let written = std::fs::read_to_string(lab.sandbox().root().join("app.js")).unwrap();
    assert_eq!(written, "console.log('saved');");

    lab.run_command("cat app.js").await;
    assert_eq!(lab.terminal().last(), Some("console.log('saved');"));
}

#[tokio::test]
async fn command_timeout_kills_long_running_commands() {
    let base = TempDir::new().unwrap();
    let mut config = config_in(&base);
    config.command_timeout_secs = Some(1);
    let mut lab = LabController::boot(config, TerminalLog::new()).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(10), lab.run_command("sleep 30"))
        .await
        .expect("timeout should end the command");

    assert_eq!(outcome, DispatchOutcome::Failed);
    assert_eq!(
        lab.terminal().last(),
        Some("❌ Error: process timed out after 1 seconds")
    );
}

#[tokio::test]
async fn cancel_token_interrupts_the_running_command() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    let cancel = lab.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(10), lab.run_command("sleep 30"))
        .await
        .expect("cancel should end the command");
    assert_eq!(outcome, DispatchOutcome::Failed);
    assert_eq!(lab.terminal().last(), Some("❌ Error: process cancelled"));

    // A fresh token is handed out for the next command.
    assert!(!lab.cancel_token().is_cancelled());
    assert_eq!(lab.run_command("true").await, DispatchOutcome::Exited(0));
}

#[tokio::test]
async fn backgrounded_child_does_not_block_the_prompt() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(3),
        lab.run_command("sleep 5 & echo started"),
    )
    .await
    .expect("the shell exit should end the command");

    assert_eq!(outcome, DispatchOutcome::Exited(0));
    assert_eq!(lab.terminal().last(), Some("started"));
}

#[tokio::test]
async fn backgrounded_child_with_timeout_returns_when_the_shell_exits() {
    let base = TempDir::new().unwrap();
    let mut config = config_in(&base);
    config.command_timeout_secs = Some(1);
    let mut lab = LabController::boot(config, TerminalLog::new()).await.unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(3), lab.run_command("sleep 5 &"))
        .await
        .expect("the shell exit should end the command");

    assert_eq!(outcome, DispatchOutcome::Exited(0));
}

#[tokio::test]
async fn timeout_stops_output_from_a_backgrounded_child() {
    let base = TempDir::new().unwrap();
    let mut config = config_in(&base);
    config.command_timeout_secs = Some(1);
    let mut lab = LabController::boot(config, TerminalLog::new()).await.unwrap();

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        lab.run_command("(while true; do echo tick; sleep 0.05; done) &"),
    )
    .await
    .expect("timeout should end the command");

    assert_eq!(outcome, DispatchOutcome::Failed);
    assert!(lab.terminal().lines().iter().any(|line| line == "tick"));
    assert_eq!(
        lab.terminal().last(),
        Some("❌ Error: process timed out after 1 seconds")
    );
}

#[tokio::test]
async fn cancel_token_stops_output_from_a_backgrounded_child() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    let cancel = lab.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        lab.run_command("(while true; do echo tick; sleep 0.05; done) & echo started"),
    )
    .await
    .expect("cancel should end the command");

    assert_eq!(outcome, DispatchOutcome::Failed);
    assert!(lab.terminal().lines().iter().any(|line| line == "started"));
    assert_eq!(lab.terminal().last(), Some("❌ Error: process cancelled"));
}

#[tokio::test]
async fn invalid_utf8_output_keeps_streaming() {
    let base = TempDir::new().unwrap();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();

    let outcome = lab.run_command("printf 'a\\377b\\n'; echo after").await;

    assert_eq!(outcome, DispatchOutcome::Exited(0));
    let lines = lab.terminal().lines();
    assert_eq!(lines[1..], ["a\u{FFFD}b".to_string(), "after".to_string()]);
}

#[tokio::test]
async fn failing_setup_command_does_not_stop_boot() {
    let base = TempDir::new().unwrap();
    let mut config = config_in(&base);
    config.setup_command = Some(vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()]);

    let lab = LabController::boot(config, TerminalLog::new()).await.unwrap();

    assert_eq!(
        lab.terminal().lines(),
        [
            "🚀 Setting up lab environment...",
            "❌ Command failed with exit code 1",
            "✅ Environment setup complete!"
        ]
    );
}

#[tokio::test]
async fn terminal_tap_streams_lines_in_order() {
    let base = TempDir::new().unwrap();
    let (tap, mut tapped) = mpsc::unbounded_channel();
    let mut lab = LabController::boot(config_in(&base), TerminalLog::with_tap(tap))
        .await
        .unwrap();

    lab.run_command("printf 'a\\nb\\n'").await;

    let mut seen = Vec::new();
    while let Ok(line) = tapped.try_recv() {
        seen.push(line);
    }
    assert_eq!(
        seen,
        vec![
            "devops@lab:~/microservice$ printf 'a\\nb\\n'".to_string(),
            "a".to_string(),
            "b".to_string()
        ]
    );
}

#[tokio::test]
async fn sandbox_directory_is_removed_with_the_lab() {
    let base = TempDir::new().unwrap();
    let lab = LabController::boot(config_in(&base), TerminalLog::new())
        .await
        .unwrap();
    let root = lab.sandbox().root().to_path_buf();

    drop(lab);

    assert!(!root.exists());
}
