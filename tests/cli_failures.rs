use assert_cmd::Command;

#[test]
fn config_load_failure_still_reaches_stderr() {
    // This path fails before logging is set up; the error must not be
    // swallowed with a bare exit 1.
    let output = Command::cargo_bin("formcheck")
        .unwrap()
        .args(["--config", "/nonexistent/formcheck.toml", "activities"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("reading config"), "stderr: {stderr}");
}
