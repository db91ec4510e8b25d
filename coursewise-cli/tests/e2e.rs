//! End-to-end tests for the coursewise binary
//!
//! These run the built binary against an isolated config and a small catalog
//! and are gated behind the `integration` feature flag. Run with:
//!
//! ```sh
//! cargo test -p coursewise-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const CATALOG: &str = "\
,course_title,course_organization,course_Certificate_type,course_rating,course_difficulty
0,Python for Everybody,University of Michigan,SPECIALIZATION,4.8,Beginner
1,Machine Learning,Stanford University,COURSE,4.9,Mixed
2,Financial Markets,Yale University,COURSE,4.8,Beginner
";

/// Config, data and project directories under one temp dir, with an offline
/// embedder and an unreachable model server
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(dir.path().join("courses.csv"), CATALOG).unwrap();
        std::fs::write(
            project.join("config.toml"),
            format!(
                r#"
[catalog]
path = "{}"

[models]
ollama_host = "http://127.0.0.1:1"
embedder = "hashing"

[engine]
timeout_ms = 500
"#,
                dir.path().join("courses.csv").display()
            ),
        )
        .unwrap();
        Self { dir }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_coursewise"));
        cmd.args(args)
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env("COURSEWISE_PROJECT_CONFIG_DIR", self.dir.path().join("project"))
            .env_remove("OLLAMA_HOST")
            .env_remove("YOUTUBE_API_KEY");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to run coursewise")
    }
}

#[test]
fn coursewise_help_works() {
    let output = Sandbox::new().run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Personalized course recommendations"));
    assert!(stdout.contains("recommend"));
    assert!(stdout.contains("serve"));
}

#[test]
fn coursewise_config_show_merges_project_config() {
    let output = Sandbox::new().run(&["config", "show"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[server]"));
    assert!(stdout.contains("port = 7433"));
    assert!(stdout.contains("embedder = \"hashing\""));
    assert!(stdout.contains("timeout_ms = 500"));
}

#[test]
fn coursewise_config_path_shows_paths() {
    let output = Sandbox::new().run(&["config", "path"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("User config:"));
    assert!(stdout.contains("Project config:"));
}

#[test]
fn coursewise_catalog_info_counts_courses() {
    let output = Sandbox::new().run(&["catalog", "info"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 courses"));
    assert!(stdout.contains("SPECIALIZATION"));
}

#[test]
fn coursewise_feedback_rejects_out_of_range_rating() {
    let output = Sandbox::new().run(&["feedback", "u1", "0", "9"]);

    assert!(!output.status.success());
}

#[test]
fn coursewise_user_lifecycle() {
    let sandbox = Sandbox::new();

    let created = sandbox.run(&["user", "create", "u1", "--name", "Ada", "I", "like", "data"]);
    assert!(
        created.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&created.stderr)
    );

    let duplicate = sandbox.run(&["user", "create", "u1", "--name", "Ada"]);
    assert!(!duplicate.status.success());

    let recommended = sandbox.run(&["recommend", "u1", "machine", "learning", "--json"]);
    assert!(recommended.status.success());
    let body: serde_json::Value = serde_json::from_slice(&recommended.stdout).unwrap();
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["total_found"], 3);
}

/// With EOF on stdin, chat exits cleanly
#[test]
fn coursewise_chat_exits_on_eof() {
    let mut child = Sandbox::new()
        .command(&["chat", "--user", "w1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn coursewise chat");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"hello\n")
        .unwrap();

    let output = child
        .wait_with_output()
        .expect("Failed to wait for process");

    assert!(
        output.status.success(),
        "Expected success, got: {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please type `start` to begin onboarding."));
}
