#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn validate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("appdome-validate-cli").expect("binary should be built");
    cmd.env_remove("APPDOME_API_TOKEN")
        .env_remove("VALIDATE_APP_PATH");
    cmd
}

fn app_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"apk-bytes").expect("write app");
    path
}

/// Directory with a stand-in `git` whose "clone" installs a fake engine.
///
/// The fake engine prints its arguments and the client header, fails with
/// 9 when the `--app` file is not visible from its own working directory,
/// writes `{}` to the `--output` path, then prints the verdict in
/// `FAKE_VERDICT` (default: the signed-correctly marker) and exits with
/// `FAKE_EXIT` (default 0). With `FAKE_SLEEP` set it only sleeps.
#[cfg(unix)]
fn fake_toolchain() -> TempDir {
    use std::os::unix::fs::PermissionsExt;

    let bin = tempfile::tempdir().expect("create bin dir");
    let engine = bin.path().join("validate.sh");
    fs::write(
        &engine,
        "#!/bin/sh\n\
         [ -n \"$FAKE_SLEEP\" ] && exec sleep \"$FAKE_SLEEP\"\n\
         echo \"args: $*\"\n\
         echo \"header: $APPDOME_CLIENT_HEADER\"\n\
         [ -f \"$4\" ] || { echo \"no such file $4\"; exit 9; }\n\
         [ -n \"$6\" ] && echo '{}' > \"$6\"\n\
         echo \"${FAKE_VERDICT:-This app is signed correctly}\"\n\
         exit \"${FAKE_EXIT:-0}\"\n",
    )
    .unwrap();
    let git = bin.path().join("git");
    fs::write(
        &git,
        "#!/bin/sh\n\
         [ -n \"$FAKE_CLONE_FAIL\" ] && exit 128\n\
         dest=\"$4\"\n\
         mkdir -p \"$dest/appdome_api_bash\"\n\
         cp \"$(dirname \"$0\")/validate.sh\" \"$dest/appdome_api_bash/validate.sh\"\n",
    )
    .unwrap();
    for script in [&engine, &git] {
        fs::set_permissions(script, fs::Permissions::from_mode(0o755)).unwrap();
    }
    bin
}

#[cfg(unix)]
fn with_fake_path(cmd: &mut Command, bin: &TempDir) {
    let path = std::env::var("PATH").unwrap_or_default();
    cmd.env("PATH", format!("{}:{path}", bin.path().display()));
}

#[test]
fn help_flag_prints_usage() {
    validate_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Appdome Validate-2secure"));
}

#[test]
fn version_flag_prints_version() {
    validate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("appdome-validate"));
}

#[test]
fn invalid_format_flag_fails() {
    validate_cmd()
        .args(["--check", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn check_mode_accepts_good_config() {
    let output = validate_cmd()
        .args(["--check", "--token", "abc123", "--app", "/a/b/app.apk"])
        .output()
        .expect("command should run");

    assert_eq!(output.status.code(), Some(0));
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(parsed["token"]["status"], "ok");
    assert_eq!(parsed["app_path"]["status"], "ok");
    assert_eq!(parsed["output_location"]["status"], "warning");
    assert_eq!(
        parsed["output_location"]["message"],
        "Output path for JSON file was not provided. and it will be saved to /a/b/results.json"
    );
}

#[test]
fn check_mode_reports_field_errors() {
    validate_cmd()
        .args([
            "--check",
            "--format",
            "text",
            "--token",
            "abc 123",
            "--app",
            "/a/b/app.exe",
            "--output",
            "/out/report.txt",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "token: error - White spaces are not allowed in Token.",
        ))
        .stdout(predicate::str::contains("app: error - Application - File extension"))
        .stdout(predicate::str::contains("output: error"));
}

#[test]
fn check_mode_reads_token_from_environment() {
    validate_cmd()
        .env("APPDOME_API_TOKEN", "abc123")
        .args(["--check", "--format", "text", "--output", "/out/"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("token: ok"))
        .stdout(predicate::str::contains(
            "Output JSON result file will be saved to /out/results.json",
        ));
}

#[test]
fn invalid_config_fails_before_touching_the_network() {
    let ws = tempfile::tempdir().unwrap();
    let output = validate_cmd()
        .args(["--token", "abc123", "--app", "/tmp/app.exe", "--workspace-dir"])
        .arg(ws.path())
        .output()
        .expect("command should run");

    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["classification"]["outcome"], "FAILURE");
    assert!(
        parsed["error"]
            .as_str()
            .unwrap()
            .contains("File extension is not allowed")
    );
    assert_eq!(fs::read_dir(ws.path()).unwrap().count(), 0);
}

#[test]
fn missing_token_fails() {
    let ws = tempfile::tempdir().unwrap();
    validate_cmd()
        .args(["--app", "/tmp/app.apk", "--workspace-dir"])
        .arg(ws.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Token is required"));
}

#[cfg(unix)]
#[test]
fn end_to_end_success_with_fake_engine() {
    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    let app = app_file(apps.path(), "app.apk");

    let mut cmd = validate_cmd();
    with_fake_path(&mut cmd, &bin);
    let output = cmd
        .args(["--token", "abc123", "--workspace-dir"])
        .arg(ws.path())
        .arg("--app")
        .arg(&app)
        .output()
        .expect("command should run");

    assert_eq!(output.status.code(), Some(0));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["classification"]["outcome"], "SUCCESS");
    assert_eq!(parsed["tool"]["name"], "appdome-validate-cli");
    assert_eq!(parsed["artifacts"][0]["hash"]["algorithm"], "sha256");

    let expected_output = apps.path().join("results.json");
    let argv: Vec<&str> = parsed["invocation"]["argv"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(
        &argv[1..],
        &[
            "--api_key",
            "****",
            "--app",
            app.to_str().unwrap(),
            "--output",
            expected_output.to_str().unwrap(),
        ]
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("header: Jenkins/1.2"));
    assert!(stderr.contains("Launching Appdome Validator"));
    assert!(stderr.contains("Deleting temporary files."));
    assert_eq!(fs::read_dir(ws.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn unstable_verdict_exits_2() {
    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    let app = app_file(apps.path(), "app.ipa");

    let mut cmd = validate_cmd();
    with_fake_path(&mut cmd, &bin);
    cmd.env("FAKE_VERDICT", "This app is not built by Appdome")
        .args(["--token", "abc123", "--format", "text", "--workspace-dir"])
        .arg(ws.path())
        .arg("--app")
        .arg(&app)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Outcome: UNSTABLE"));
}

#[cfg(unix)]
#[test]
fn engine_exit_code_fails_run() {
    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    let app = app_file(apps.path(), "app.aab");

    let mut cmd = validate_cmd();
    with_fake_path(&mut cmd, &bin);
    cmd.env("FAKE_EXIT", "3")
        .args(["--token", "abc123", "--format", "text", "--workspace-dir"])
        .arg(ws.path())
        .arg("--app")
        .arg(&app)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("exitcode 3"));
}

#[cfg(unix)]
#[test]
fn clone_failure_fails_and_cleans_up() {
    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    let app = app_file(apps.path(), "app.apk");

    let mut cmd = validate_cmd();
    with_fake_path(&mut cmd, &bin);
    cmd.env("FAKE_CLONE_FAIL", "1")
        .args(["--token", "abc123", "--workspace-dir"])
        .arg(ws.path())
        .arg("--app")
        .arg(&app)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Couldn't Update Appdome engine"));
    assert_eq!(fs::read_dir(ws.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn summary_flag_writes_to_file_and_uses_env_app_path() {
    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    let app = app_file(apps.path(), "app.apk");
    let out_dir = format!("{}/reports/", apps.path().display());
    let summary = apps.path().join("summary.json");

    let mut cmd = validate_cmd();
    with_fake_path(&mut cmd, &bin);
    cmd.env("VALIDATE_APP_PATH", &app)
        .args(["--token", "abc123", "--output", &out_dir, "--workspace-dir"])
        .arg(ws.path())
        .arg("--summary")
        .arg(&summary)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());

    assert!(apps.path().join("reports").is_dir());
    let contents = fs::read_to_string(&summary).expect("read summary");
    let parsed: serde_json::Value = serde_json::from_str(&contents).expect("summary is JSON");
    assert_eq!(parsed["classification"]["outcome"], "SUCCESS");
    assert_eq!(
        parsed["invocation"]["output_path"],
        apps.path().join("reports").join("results.json").to_str().unwrap()
    );
}

#[cfg(unix)]
#[test]
fn relative_app_path_is_resolved_from_the_callers_directory() {
    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    app_file(apps.path(), "app.apk");

    let mut cmd = validate_cmd();
    with_fake_path(&mut cmd, &bin);
    cmd.current_dir(apps.path())
        .args(["--token", "abc123", "--app", "app.apk", "--workspace-dir"])
        .arg(ws.path())
        .assert()
        .code(0)
        .stderr(predicate::str::contains("no such file").not());

    assert!(apps.path().join("results.json").is_file());
    assert_eq!(fs::read_dir(ws.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[test]
fn interrupt_cleans_up_the_workspace() {
    use assert_cmd::cargo::CommandCargoExt;
    use std::process::{Command as StdCommand, Stdio};
    use std::thread;
    use std::time::{Duration, Instant};

    let bin = fake_toolchain();
    let ws = tempfile::tempdir().unwrap();
    let apps = tempfile::tempdir().unwrap();
    let app = app_file(apps.path(), "app.apk");
    let path = std::env::var("PATH").unwrap_or_default();

    let child = StdCommand::cargo_bin("appdome-validate-cli")
        .unwrap()
        .env_remove("VALIDATE_APP_PATH")
        .env("PATH", format!("{}:{path}", bin.path().display()))
        .env("FAKE_SLEEP", "30")
        .args(["--token", "abc123", "--workspace-dir"])
        .arg(ws.path())
        .arg("--app")
        .arg(&app)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Wait for the engine checkout, so the run is past handler setup.
    let started = Instant::now();
    let engine_ready = || {
        fs::read_dir(ws.path())
            .unwrap()
            .flatten()
            .any(|entry| entry.path().join("appdome-api-bash").is_dir())
    };
    while !engine_ready() {
        assert!(started.elapsed() < Duration::from_secs(20), "engine never started");
        thread::sleep(Duration::from_millis(50));
    }
    thread::sleep(Duration::from_millis(300));

    let status = StdCommand::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["error"], "validation run was interrupted");
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(fs::read_dir(ws.path()).unwrap().count(), 0);
}
