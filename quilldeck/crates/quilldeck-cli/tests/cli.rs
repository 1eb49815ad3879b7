use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        std::fs::write(dir.path().join("config.toml"), "[log]\nfilter = \"warn\"\n")
            .expect("failed to write config");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to invoke quilldeck binary")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_quilldeck"));
        command
            .arg("--config")
            .arg(self.path("config.toml"))
            .arg("--db")
            .arg(self.path("data").join("quilldeck.db"))
            .args(args)
            .env_remove("LLM_API_KEY")
            .env_remove("LLM_BASE_URL")
            .env_remove("LLM_MODEL")
            .env_remove("DB_PATH");
        command
    }

    fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "quilldeck {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
            panic!(
                "unexpected stdout ({e}): {}",
                String::from_utf8_lossy(&output.stdout)
            )
        })
    }
}

fn write_file(path: &Path, contents: &str) {
    std::fs::write(path, contents).expect("failed to write input file");
}

#[test]
fn upload_summarize_and_show() {
    let ws = Workspace::new();
    let user = "7f1d9d44-3c1e-4a55-9a0e-5b8f1f6f2a10";
    let file = ws.path("hello.txt");
    write_file(&file, "Hello world. This is quilldeck. It summarizes text.");

    let document = ws.run_json(&["upload", "--user", user, "--file", file.to_str().unwrap()]);
    assert_eq!(document["title"], "hello.txt");
    assert_eq!(document["type"], "txt");
    assert_eq!(document["size"], 51);
    assert!(document.get("processed_at").is_none());
    let id = document["id"].as_str().unwrap().to_string();

    let summary = ws.run_json(&["summarize", &id, "--length", "short"]);
    assert_eq!(summary["content"], "Hello world. This is quilldeck.");
    assert_eq!(summary["length"], "short");

    let shown = ws.run_json(&["show", &id]);
    assert!(shown["processed_at"].is_string());

    let history = ws.run_json(&["summaries", &id]);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let listed = ws.run_json(&["list", "--user", user]);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], id.as_str());
}

#[test]
fn unsupported_extension_is_rejected() {
    let ws = Workspace::new();
    let file = ws.path("report.pdf");
    write_file(&file, "not really a pdf");

    let output = ws.run(&[
        "upload",
        "--user",
        "7f1d9d44-3c1e-4a55-9a0e-5b8f1f6f2a10",
        "--file",
        file.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn unknown_document_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["show", "00000000-0000-4000-8000-000000000001"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NOT_FOUND"), "unexpected stderr: {stderr}");
}

#[test]
fn migrate_creates_database() {
    let ws = Workspace::new();
    let output = ws.run(&["migrate"]);

    assert!(
        output.status.success(),
        "migrate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(ws.path("data").join("quilldeck.db").exists());
}

#[test]
fn debug_filter_logs_cli_events_to_stderr() {
    let ws = Workspace::new();
    let output = ws
        .command(&["migrate"])
        .env("RUST_LOG", "debug")
        .output()
        .expect("failed to invoke quilldeck binary");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("opening database"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("running command"), "unexpected stderr: {stderr}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("schema version 1"), "unexpected stdout: {stdout}");
}
