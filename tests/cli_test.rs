use std::process::Command;
use tempfile::TempDir;

#[test]
fn test_json_logs_are_written_to_stderr() {
    // 在空目錄執行，避免讀到工作目錄的 metanetx-post.toml
    let temp_dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_metanetx-post"))
        .current_dir(temp_dir.path())
        .env_remove("RUST_LOG")
        .args(["--json-logs", "--database-url", "sqlite::memory:", "init-db"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let line = stderr
        .lines()
        .find(|line| line.contains("Schema ready"))
        .expect("init-db log line on stderr");
    let event: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(event["level"], "INFO");
}

#[test]
fn test_invalid_database_url_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_metanetx-post"))
        .current_dir(temp_dir.path())
        .args(["--database-url", "mysql://localhost/mnx", "init-db"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
