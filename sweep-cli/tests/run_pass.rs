use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Uppercases each file; files containing `SYNTAX` fail black-style.
const UPCASE_SCRIPT: &str = r#"
rc=0
for f in "$@"; do
  if grep -q SYNTAX "$f"; then
    echo "error: cannot format $f: Cannot parse: 1:0: SYNTAX" >&2
    rc=123
    continue
  fi
  tr 'a-z' 'A-Z' < "$f" > "$f.tmp" && mv "$f.tmp" "$f"
done
exit $rc
"#;

struct Fixture {
    repo: TempDir,
    tools: TempDir,
}

impl Fixture {
    /// Repository where `a.py` is oldest, then `b.py`, then `c.py`.
    fn new() -> Self {
        let repo = TempDir::new().expect("repo");
        let tools = TempDir::new().expect("tools");
        git(repo.path(), &["init", "-q"]);
        git(repo.path(), &["config", "user.email", "sweep@example.com"]);
        git(repo.path(), &["config", "user.name", "sweep"]);
        git(repo.path(), &["config", "commit.gpgsign", "false"]);
        commit(repo.path(), &[("a.py", "a\n"), ("b.py", "b\n"), ("c.py", "c\n")]);
        commit(repo.path(), &[("b.py", "b = 1\n")]);
        commit(repo.path(), &[("c.py", "c = 1\n")]);
        fs::write(tools.path().join("fmt.sh"), UPCASE_SCRIPT).expect("script");
        Self { repo, tools }
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.tools.path().join(name);
        fs::write(&path, body).expect("script");
        path
    }

    fn output_file(&self) -> PathBuf {
        self.tools.path().join("outputs.txt")
    }

    fn read(&self, path: &str) -> String {
        fs::read_to_string(self.repo.path().join(path)).expect("read")
    }

    fn sweep(&self, subcommand: &str) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sweep"));
        cmd.env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg(subcommand)
            .arg("--repo")
            .arg(self.repo.path());
        cmd
    }

    /// `sweep run` using the uppercasing script as the formatter.
    fn run_with_script(&self) -> Command {
        let mut cmd = self.sweep("run");
        cmd.args(["--formatter", "sh", "--formatter-arg"])
            .arg(self.tools.path().join("fmt.sh"))
            .arg("--output-file")
            .arg(self.output_file());
        cmd
    }
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn commit(dir: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        fs::write(dir.join(path), content).expect("write");
    }
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", "change"]);
}

// ---------------------------------------------------------------------------
// sweep run
// ---------------------------------------------------------------------------

#[test]
fn run_formats_least_recently_modified_batch() {
    let fx = Fixture::new();
    fx.run_with_script().args(["-n", "2"]).assert().success();

    assert_eq!(fx.read("a.py"), "A\n");
    assert_eq!(fx.read("b.py"), "B = 1\n");
    assert_eq!(fx.read("c.py"), "c = 1\n", "newest file must not be touched");
    assert_eq!(
        fs::read_to_string(fx.output_file()).expect("outputs"),
        "numberOfModifiedFiles=2\nmodifiedFileNames=a.py b.py\ncomplete=false\nstatus=success\n"
    );
}

#[test]
fn run_json_reports_failures_without_failing() {
    let fx = Fixture::new();
    commit(fx.repo.path(), &[("b.py", "SYNTAX (\n")]);

    let output = fx
        .run_with_script()
        .args(["-n", "10", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["status"], "success");
    assert_eq!(json["complete"], true);
    assert_eq!(json["numberOfModifiedFiles"], 2);
    assert_eq!(json["modifiedFiles"], serde_json::json!(["a.py", "c.py"]));
    assert_eq!(json["failedFiles"]["b.py"], "Cannot parse: 1:0: SYNTAX");
}

#[test]
fn ignore_patterns_exclude_matching_files() {
    let fx = Fixture::new();
    commit(fx.repo.path(), &[("a_test.py", "t\n")]);

    fx.run_with_script()
        .args(["-n", "10", "--ignore", "*test*, re:^c\\.py$"])
        .assert()
        .success();

    assert_eq!(fx.read("a_test.py"), "t\n");
    assert_eq!(fx.read("c.py"), "c = 1\n");
    assert_eq!(
        fs::read_to_string(fx.output_file()).expect("outputs"),
        "numberOfModifiedFiles=2\nmodifiedFileNames=a.py b.py\ncomplete=true\nstatus=success\n"
    );
}

#[test]
fn zero_batch_size_succeeds_without_formatting() {
    let fx = Fixture::new();
    fx.run_with_script().args(["-n", "0"]).assert().success();

    assert_eq!(fx.read("a.py"), "a\n");
    assert_eq!(
        fs::read_to_string(fx.output_file()).expect("outputs"),
        "numberOfModifiedFiles=0\nmodifiedFileNames=\ncomplete=false\nstatus=success\n"
    );
}

#[test]
fn rerun_after_convergence_modifies_nothing() {
    let fx = Fixture::new();
    fx.run_with_script().args(["-n", "10"]).assert().success();
    git(fx.repo.path(), &["commit", "-q", "-am", "format"]);
    fs::remove_file(fx.output_file()).expect("rm outputs");

    fx.run_with_script()
        .args(["-n", "10"])
        .assert()
        .success()
        .stdout(contains("0 modified"));
    assert!(fs::read_to_string(fx.output_file())
        .expect("outputs")
        .starts_with("numberOfModifiedFiles=0\n"));
}

#[test]
fn negative_batch_size_is_fatal() {
    let fx = Fixture::new();
    fx.run_with_script()
        .args(["-n", "-1"])
        .assert()
        .failure()
        .stderr(contains("must be >= 0"));
    assert_eq!(fs::read_to_string(fx.output_file()).expect("outputs"), "status=fatal\n");
    assert_eq!(fx.read("a.py"), "a\n");
}

#[test]
fn malformed_ignore_pattern_is_fatal() {
    let fx = Fixture::new();
    fx.run_with_script()
        .args(["--ignore", "re:(unclosed"])
        .assert()
        .failure()
        .stderr(contains("invalid ignore pattern"));
    assert_eq!(fs::read_to_string(fx.output_file()).expect("outputs"), "status=fatal\n");
}

#[test]
fn missing_formatter_binary_is_fatal() {
    let fx = Fixture::new();
    fx.sweep("run")
        .args(["--formatter", "sweep-no-such-formatter-binary", "--output-file"])
        .arg(fx.output_file())
        .assert()
        .failure()
        .stderr(contains("failed to spawn formatter"));
    assert_eq!(fs::read_to_string(fx.output_file()).expect("outputs"), "status=fatal\n");
}

#[test]
fn hung_formatter_is_fatal() {
    let fx = Fixture::new();
    let hang = fx.script("hang.sh", "sleep 30\necho done\n");
    let started = Instant::now();
    fx.sweep("run")
        .args(["--formatter", "sh", "--timeout-secs", "1", "--formatter-arg"])
        .arg(hang)
        .arg("--output-file")
        .arg(fx.output_file())
        .assert()
        .failure()
        .stderr(contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(10), "took {:?}", started.elapsed());
    assert_eq!(fs::read_to_string(fx.output_file()).expect("outputs"), "status=fatal\n");
}

#[test]
fn config_file_supplies_defaults() {
    let fx = Fixture::new();
    let script = fx.tools.path().join("fmt.sh");
    fs::write(
        fx.repo.path().join(".sweep.yaml"),
        format!(
            "number_of_files: 1\nignore_files: \"*.yaml\"\nformatter:\n  command: sh\n  args: [\"{}\"]\n",
            script.display()
        ),
    )
    .expect("config");

    fx.sweep("run")
        .arg("--output-file")
        .arg(fx.output_file())
        .assert()
        .success();
    assert!(fs::read_to_string(fx.output_file())
        .expect("outputs")
        .contains("modifiedFileNames=a.py\n"));
}

#[test]
fn malformed_config_file_is_fatal() {
    let fx = Fixture::new();
    fs::write(fx.repo.path().join(".sweep.yaml"), "number_of_files: [oops\n").expect("config");
    fx.run_with_script()
        .assert()
        .failure()
        .stderr(contains("invalid config file"));
    assert_eq!(fs::read_to_string(fx.output_file()).expect("outputs"), "status=fatal\n");
}

#[test]
fn renders_commit_message_and_pr_body() {
    let fx = Fixture::new();
    let message = fx.tools.path().join("commit.txt");
    let body = fx.tools.path().join("body.md");
    fx.run_with_script()
        .args(["-n", "1", "--commit-message"])
        .arg(&message)
        .arg("--pr-body")
        .arg(&body)
        .assert()
        .success();

    let message = fs::read_to_string(message).expect("commit message");
    assert!(message.starts_with("Format 1 least recently modified file\n"));
    assert!(message.contains("- a.py"));
    let body = fs::read_to_string(body).expect("pr body");
    assert!(body.contains("More files remain"));
}

// ---------------------------------------------------------------------------
// sweep plan / sweep history
// ---------------------------------------------------------------------------

#[test]
fn plan_selects_without_touching_files() {
    let fx = Fixture::new();
    let output = fx.sweep("plan").args(["-n", "2", "--json"]).output().expect("plan");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let files = json["selection"]["files"].as_array().expect("files");
    let paths: Vec<_> = files.iter().map(|f| f["path"].as_str().unwrap()).collect();
    assert_eq!(paths, ["a.py", "b.py"]);
    assert_eq!(json["selection"]["complete"], false);
    assert_eq!(fx.read("a.py"), "a\n");
}

#[test]
fn history_lists_oldest_first() {
    let fx = Fixture::new();
    fx.sweep("history")
        .assert()
        .success()
        .stdout(contains("3 tracked files"))
        .stdout(contains("a.py"));

    let output = fx.sweep("history").args(["--json", "--limit", "2"]).output().expect("history");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["tracked"], 3);
    assert_eq!(json["files"][0]["path"], "a.py");
    assert_eq!(json["files"][0]["recency"], 0);
    assert_eq!(json["files"][1]["path"], "b.py");
    assert_eq!(json["files"].as_array().map(Vec::len), Some(2));
}
