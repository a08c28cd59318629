use assert_cmd::Command;

#[test]
fn help_lists_the_mode_flag() -> Result<(), Box<dyn std::error::Error>> {
    let assert = Command::cargo_bin("reflex")?.arg("--help").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;

    assert!(stdout.contains("--mode"));
    assert!(stdout.contains("--hits-only"));
    assert!(stdout.contains("--export"));
    Ok(())
}

#[test]
fn refuses_to_run_without_a_tty() -> Result<(), Box<dyn std::error::Error>> {
    let assert = Command::cargo_bin("reflex")?
        .args(["-m", "reaction"])
        .write_stdin("")
        .assert()
        .failure();
    let stderr = String::from_utf8(assert.get_output().stderr.clone())?;

    assert!(stderr.contains("stdin must be a tty"));
    Ok(())
}

#[test]
fn rejects_unknown_mode() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("reflex")?
        .args(["--mode", "marathon"])
        .write_stdin("")
        .assert()
        .failure();
    Ok(())
}
