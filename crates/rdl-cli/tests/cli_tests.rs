use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn rdl() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rdl"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_check_reports_counts() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("api.rdl");
    fs::write(&file, "name api;\ntype Id String;\nresource Id GET \"/id\" {}\n").unwrap();

    let output = rdl().arg("check").arg(&file).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "ok: api (1 types, 1 resources)");
}

#[test]
fn test_check_failure_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.rdl");
    fs::write(&file, "name api;\nbogus;\n").unwrap();

    let output = rdl().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error(bad.rdl:2): Unrecognized keyword in schema: 'bogus'"));
}

#[test]
fn test_pedantic_flag() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("old.rdl");
    fs::write(&file, "service api;\n").unwrap();

    assert!(rdl().arg("check").arg(&file).output().unwrap().status.success());
    let output = rdl().args(["--pedantic", "check"]).arg(&file).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_json_to_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("api.rdl");
    let out = dir.path().join("api.json");
    fs::write(&file, "name api;\ntype Count Int32 (min=0);\n").unwrap();

    let status = rdl()
        .arg("json")
        .arg(&file)
        .arg("-o")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["name"], "api");
    assert_eq!(json["types"][0]["kind"], "Number");
    assert_eq!(json["types"][0]["min"], 0);
}
