use assert_cmd::Command;

#[test]
fn help_lists_flags() {
    let output = Command::cargo_bin("typespeed")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--no-auth"));
    assert!(stdout.contains("--log-level"));
}

#[test]
fn refuses_to_run_without_a_tty() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("typespeed")
        .unwrap()
        .args(["--config"])
        .arg(dir.path().join("config.json"))
        .write_stdin("")
        .assert()
        .failure();
}
