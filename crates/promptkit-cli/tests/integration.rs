#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn promptkit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("promptkit").unwrap();
    cmd.current_dir(dir.path())
        .env("PROMPTKIT_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::create_dir_all(dir.path().join(".promptkit")).unwrap();
    std::fs::write(dir.path().join(".promptkit/config.yaml"), yaml).unwrap();
}

// ---------------------------------------------------------------------------
// promptkit optimize
// ---------------------------------------------------------------------------

#[test]
fn optimize_argument_adds_success_criteria() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["optimize", "Build a login page"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build a login page"))
        .stdout(predicate::str::contains("## Success Criteria"))
        .stdout(predicate::str::contains("success-criteria-enforcer"))
        .stdout(predicate::str::contains("overall"));
}

#[test]
fn optimize_reads_stdin() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .arg("optimize")
        .write_stdin("Build a login page\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("## Success Criteria"));
}

#[test]
fn optimize_reads_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("prompt.md");
    std::fs::write(&file, "Build a login page\n").unwrap();
    promptkit(&dir)
        .args(["optimize", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Success Criteria"));
}

#[test]
fn optimize_json_reports_intent_and_improvements() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args(["optimize", "Build a login page", "--json"]));
    let result = &v["result"];
    assert_eq!(result["intent"]["primary_intent"], "code-generation");
    assert_eq!(result["mode"], "fast");
    assert_eq!(result["original"], "Build a login page");
    assert!(result["enhanced"]
        .as_str()
        .unwrap()
        .contains("Success Criteria"));
    let ids: Vec<&str> = result["improvements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["pattern_id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"success-criteria-enforcer"));
    assert!(v["recommend_deep_mode"].is_boolean());
}

#[test]
fn optimize_deep_groups_topics() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args([
            "optimize",
            "--mode",
            "deep",
            "Create UI components. Add database schema. Write API routes.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Topics Covered"))
        .stdout(predicate::str::contains("topic-coherence-analyzer"));
}

#[test]
fn optimize_uses_default_mode_from_config() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "optimizer:\n  default_mode: deep\n");
    let v = json_output(promptkit(&dir).args(["optimize", "Build a login page", "-j"]));
    assert_eq!(v["result"]["mode"], "deep");
    assert_eq!(v["recommend_deep_mode"], false);
}

#[test]
fn optimize_skips_disabled_patterns() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "patterns:\n  disabled: [success-criteria-enforcer]\n");
    let v = json_output(promptkit(&dir).args(["optimize", "Build a login page", "-j"]));
    assert!(!v["result"]["enhanced"]
        .as_str()
        .unwrap()
        .contains("Success Criteria"));
}

#[test]
fn optimize_rejects_empty_prompt() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .arg("optimize")
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt is empty"));
}

#[test]
fn optimize_rejects_unknown_mode() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["optimize", "--mode", "turbo", "Build a login page"])
        .assert()
        .failure();
}

#[test]
fn optimize_missing_file_fails_with_context() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["optimize", "--file", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read prompt file"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "optimizer: [");
    promptkit(&dir)
        .args(["optimize", "Build a login page"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

// ---------------------------------------------------------------------------
// promptkit analyze / assess
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_has_intent_fields() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args(["analyze", "Build a login page", "--json"]));
    assert_eq!(v["primary_intent"], "code-generation");
    let confidence = v["confidence"].as_u64().unwrap();
    assert!(confidence <= 100);
    assert!(v["characteristics"]["has_code_context"].is_boolean());
    assert!(v["suggested_mode"].is_string());
}

#[test]
fn analyze_prints_labels() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["analyze", "Build a login page"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Intent:"))
        .stdout(predicate::str::contains("code-generation"));
}

#[test]
fn assess_with_explicit_intent() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args([
        "assess",
        "Write unit tests for the parser",
        "--intent",
        "testing",
        "--json",
    ]));
    assert_eq!(v["intent"], "testing");
    for dim in [
        "clarity",
        "efficiency",
        "structure",
        "completeness",
        "actionability",
        "overall",
    ] {
        let score = v["quality"][dim].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score), "{dim} = {score}");
    }
}

#[test]
fn assess_rejects_unknown_intent() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["assess", "Build it", "--intent", "poetry"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// promptkit patterns
// ---------------------------------------------------------------------------

#[test]
fn patterns_list_shows_whole_registry() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args(["patterns", "list", "--json"]));
    let list = v.as_array().unwrap();
    assert_eq!(list.len(), 19);
    assert_eq!(list[0]["id"], "conciseness-filter");
}

#[test]
fn patterns_list_filters_in_run_order() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args([
        "patterns",
        "list",
        "--mode",
        "fast",
        "--intent",
        "code-generation",
        "--json",
    ]));
    let list = v.as_array().unwrap();
    let ids: Vec<&str> = list.iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert!(!ids.contains(&"alternative-approaches"));
    assert!(!ids.contains(&"topic-coherence-analyzer"));
    assert_eq!(ids.first(), Some(&"conciseness-filter"));
    assert_eq!(ids.last(), Some(&"success-criteria-enforcer"));

    let priorities: Vec<u64> = list
        .iter()
        .map(|p| p["priority"].as_u64().unwrap())
        .collect();
    assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn patterns_list_table_respects_disabled() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "patterns:\n  disabled: [alternative-approaches]\n");
    promptkit(&dir)
        .args(["patterns", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scope-definer"))
        .stdout(predicate::str::contains("alternative-approaches").not());
}

#[test]
fn patterns_show_and_unknown_id() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["patterns", "show", "prd-structure-enforcer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PRD Structure Enforcer"))
        .stdout(predicate::str::contains("output-generation"));

    promptkit(&dir)
        .args(["patterns", "show", "no-such-pattern"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pattern not found"));
}

// ---------------------------------------------------------------------------
// promptkit prd check
// ---------------------------------------------------------------------------

#[test]
fn prd_check_reports_missing_sections() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("prd.md");
    std::fs::write(&file, "# Habit tracker\nThe problem is a pain point for busy people.\n")
        .unwrap();
    promptkit(&dir)
        .args(["prd", "check", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Completeness:"))
        .stdout(predicate::str::contains("## PRD Completeness"))
        .stdout(predicate::str::contains("Timeline & Milestones"));
}

#[test]
fn prd_check_json() {
    let dir = TempDir::new().unwrap();
    let v = json_output(
        promptkit(&dir)
            .args(["prd", "check", "--json"])
            .write_stdin("Write a PRD for a habit tracking app"),
    );
    assert_eq!(v["result"]["phase"], "output-generation");
    assert_eq!(v["result"]["intent"], "prd-generation");
    assert_eq!(v["completeness"]["sections"].as_array().unwrap().len(), 8);
    assert!(v["completeness"]["percent"].as_f64().unwrap() < 100.0);
}

// ---------------------------------------------------------------------------
// promptkit config
// ---------------------------------------------------------------------------

#[test]
fn config_init_writes_defaults_once() {
    let dir = TempDir::new().unwrap();
    promptkit(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));
    let path = dir.path().join(".promptkit/config.yaml");
    assert!(path.exists());

    std::fs::write(&path, "optimizer:\n  default_mode: deep\n").unwrap();
    promptkit(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("left unchanged"));
    assert!(std::fs::read_to_string(&path).unwrap().contains("deep"));
}

#[test]
fn config_show_without_file_prints_defaults() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args(["config", "show", "--json"]));
    assert_eq!(v["version"], 1);
    assert_eq!(v["optimizer"]["default_mode"], "fast");
    assert!(v["patterns"]["disabled"].as_array().unwrap().is_empty());
}

#[test]
fn config_validate_warns_on_unknown_pattern() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "patterns:\n  disabled: [no-such-pattern]\n");
    promptkit(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[warning]"))
        .stdout(predicate::str::contains("no-such-pattern"));
}

#[test]
fn config_validate_fails_when_everything_disabled() {
    let dir = TempDir::new().unwrap();
    let v = json_output(promptkit(&dir).args(["patterns", "list", "--json"]));
    let ids: Vec<String> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    write_config(&dir, &format!("patterns:\n  disabled: [{}]\n", ids.join(", ")));

    promptkit(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}
