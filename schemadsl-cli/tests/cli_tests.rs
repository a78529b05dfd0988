//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn schemadsl_cli() -> Command {
    Command::cargo_bin("schemadsl-cli").expect("binary builds")
}

/// Write a small two-page JSON design to a temp file.
fn json_fixture(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("design.json");
    fs::write(
        &path,
        r#"{
          "components": [
            {
              "designator": "U1",
              "description": "ARM MCU",
              "sheet": "Main.SchDoc",
              "parameters": {"Comment": "STM32F407"},
              "pins": [
                {"name": "1", "net": "3V3"},
                {"name": "2", "net": "GND"},
                {"name": "3", "net": "UART_TX"},
                {"name": "4", "net": "UART_RX"},
                {"name": "5", "net": "GND"}
              ]
            },
            {
              "designator": "J1",
              "sheet": "IO.SchDoc",
              "parameters": {"Comment": "CONN_2"},
              "pins": [
                {"name": "1", "net": "UART_TX"},
                {"name": "2", "net": "GND"}
              ]
            }
          ],
          "nets": ["3V3", "GND", "UART_TX", "UART_RX"]
        }"#,
    )
    .unwrap();
    path
}

#[test]
fn test_cli_help() {
    let mut cmd = schemadsl_cli();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("schematic"));
}

#[test]
fn test_cli_version() {
    let mut cmd = schemadsl_cli();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_index_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let json = json_fixture(&dir);

    let mut cmd = schemadsl_cli();
    cmd.arg("index").arg("--json").arg(&json);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# SCHEMATIC INDEX"))
        .stdout(predicate::str::contains("Main.SchDoc"));
}

#[test]
fn test_cli_page() {
    let dir = tempfile::tempdir().unwrap();
    let json = json_fixture(&dir);

    let mut cmd = schemadsl_cli();
    cmd.arg("page").arg("Main.SchDoc").arg("--json").arg(&json);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# PAGE: Main.SchDoc"))
        .stdout(predicate::str::contains("COMP U1 (STM32F407)"));
}

#[test]
fn test_cli_pages() {
    let dir = tempfile::tempdir().unwrap();
    let json = json_fixture(&dir);

    let mut cmd = schemadsl_cli();
    cmd.arg("pages").arg("--json").arg(&json);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("IO.SchDoc"))
        .stdout(predicate::str::contains("Main.SchDoc"));
}

#[test]
fn test_cli_context() {
    let dir = tempfile::tempdir().unwrap();
    let json = json_fixture(&dir);

    let mut cmd = schemadsl_cli();
    cmd.arg("context").arg("U1").arg("--json").arg(&json);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# CONTEXT: U1"))
        .stdout(predicate::str::contains("J1 CONN (CONN_2)"));
}

#[test]
fn test_cli_stats_json() {
    let dir = tempfile::tempdir().unwrap();
    let json = json_fixture(&dir);

    let mut cmd = schemadsl_cli();
    cmd.arg("stats").arg("--format").arg("json").arg("--json").arg(&json);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"components\": 2"));
}

#[test]
fn test_cli_missing_design_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = schemadsl_cli();
    cmd.arg("index").arg("--dir").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no design files"));
}

#[test]
fn test_cli_project_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("main.kicad_sch"),
        r#"(kicad_sch
          (symbol (lib_id "Device:R") (at 0 0 0)
            (property "Reference" "R1") (property "Value" "10k")))"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("board.kicad_pcb"),
        r#"(kicad_pcb (net 1 "GND")
          (footprint "R_0603" (property "Reference" "R1")
            (pad "1" smd (net 1 "GND")) (pad "2" smd)))"#,
    )
    .unwrap();

    let mut cmd = schemadsl_cli();
    cmd.arg("page").arg("main").arg("--dir").arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("# PAGE: main"))
        .stdout(predicate::str::contains("R1.1"));
}
