use std::fs;
use std::process::{Command, Output};

fn rick(args: &[&str]) -> std::io::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_rick"))
        .args(args)
        .env_remove("RICK_DEEP")
        .env_remove("RICK_LOAD_LAMBDA")
        .output()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[test]
fn get_prints_scalars_and_fails_on_missing_key() -> Result<(), Box<dyn std::error::Error>> {
    let doc = "service:\n  name: billing\n  port: 0\n";

    let found = rick(&[doc, "get", "NAME"])?;
    assert!(found.status.success());
    assert_eq!(stdout(&found), "billing");

    let falsy = rick(&[doc, "get", "port"])?;
    assert_eq!(stdout(&falsy), "0");

    let missing = rick(&[doc, "get", "absent"])?;
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("Key not found: absent"));
    Ok(())
}

#[test]
fn has_and_keys() -> Result<(), Box<dyn std::error::Error>> {
    let doc = r#"{"a": {"b": 1}, "c": 2}"#;
    assert_eq!(stdout(&rick(&[doc, "has", "b"])?), "false");
    assert_eq!(stdout(&rick(&[doc, "has", "b", "--deep"])?), "true");
    assert_eq!(stdout(&rick(&[doc, "keys"])?), "a\nc");
    Ok(())
}

#[test]
fn dump_refuses_existing_file_without_force() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.json");
    let target = path.to_str().ok_or("non-utf8 path")?;
    fs::write(&path, "keep me")?;

    let refused = rick(&["a: 1", "dump", "--format", "json", "--output", target])?;
    assert!(!refused.status.success());
    assert!(String::from_utf8_lossy(&refused.stderr).contains("File already exists"));
    assert_eq!(fs::read_to_string(&path)?, "keep me");

    let forced = rick(&["a: 1", "dump", "--format", "json", "--output", target, "--force"])?;
    assert!(forced.status.success());
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(json, serde_json::json!({"a": 1}));
    Ok(())
}

#[test]
fn dump_to_stdout_resolves_placeholders() -> Result<(), Box<dyn std::error::Error>> {
    let doc = "x:\n  type: env\n  load: PICKLE_RICK_CLI_UNSET\n  default: fallback\n";
    let output = Command::new(env!("CARGO_BIN_EXE_rick"))
        .args([doc, "--resolve", "dump", "--format", "json"])
        .env_remove("PICKLE_RICK_CLI_UNSET")
        .output()?;
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(json, serde_json::json!({"x": "fallback"}));
    Ok(())
}
