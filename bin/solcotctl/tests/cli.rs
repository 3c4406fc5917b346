//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Administrative CLI for quoting and catalog maintenance."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../configs/catalog.example.toml")
}

/// Runs in an empty directory so no default config file is picked up.
fn solcotctl(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("solcotctl").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("SOLCOT_CONFIG")
        .arg("--catalog")
        .arg(catalog_path());
    cmd
}

#[test]
fn quote_prints_json_summary() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir)
        .args([
            "quote",
            "--consumption",
            "300",
            "--department",
            "la_paz",
            "--sector",
            "residential",
            "--phase",
            "p1",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["result"]["panels_needed"], 4);
    assert_eq!(summary["input"]["department"], "la_paz");
    assert_eq!(summary["catalog_version"], "2026.10-bo");
    assert!(summary["result"]["technical_details"]["battery_info"].is_null());
}

#[test]
fn quote_text_output_and_export() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("out");
    let output = solcotctl(&dir)
        .args(["quote", "--consumption", "450", "--department", "santa_cruz"])
        .args(["--battery", "--export"])
        .arg(&export)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("Santa Cruz"));
    assert!(text.contains("Battery:"));
    assert!(text.contains("iva"));
    assert!(text.contains("BOB/month"));
    assert!(export.join("quote.json").is_file());
    assert!(export.join("cost_breakdown.json").is_file());
}

#[test]
fn quote_without_department_fails() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir)
        .args(["quote", "--consumption", "300"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--department"));
}

#[test]
fn config_defaults_fill_missing_flags() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("solcot.toml");
    fs::write(
        &config,
        format!(
            "[catalog]\npath = {:?}\n\n[logging]\ndirectory = {:?}\nformat = \"pretty\"\n\n[defaults]\ndepartment = \"potosi\"\nsector = \"commercial\"\n",
            catalog_path().display().to_string(),
            dir.path().join("logs").display().to_string(),
        ),
    )
    .unwrap();

    let output = Command::cargo_bin("solcotctl")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("SOLCOT_CONFIG")
        .arg("--config")
        .arg(&config)
        .args(["quote", "--consumption", "800", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["input"]["department"], "potosi");
    assert_eq!(summary["input"]["sector"], "commercial");
    assert!(dir.path().join("logs").is_dir());
}

#[test]
fn no_battery_overrides_config_default() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("solcot.toml");
    fs::write(
        &config,
        format!(
            "[catalog]\npath = {:?}\n\n[logging]\ndirectory = {:?}\n\n[defaults]\ndepartment = \"la_paz\"\ninclude_battery = true\n",
            catalog_path().display().to_string(),
            dir.path().join("logs").display().to_string(),
        ),
    )
    .unwrap();
    let quote = |extra: &[&str]| -> serde_json::Value {
        let output = Command::cargo_bin("solcotctl")
            .unwrap()
            .current_dir(dir.path())
            .env_remove("SOLCOT_CONFIG")
            .arg("--config")
            .arg(&config)
            .args(["quote", "--consumption", "300", "--format", "json"])
            .args(extra)
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        serde_json::from_slice(&output.stdout).unwrap()
    };

    let defaulted = quote(&[]);
    assert_eq!(defaulted["input"]["include_battery"], true);
    assert!(defaulted["result"]["technical_details"]["battery_info"].is_object());

    let opted_out = quote(&["--no-battery"]);
    assert_eq!(opted_out["input"]["include_battery"], false);
    assert!(opted_out["result"]["technical_details"]["battery_info"].is_null());
}

#[test]
fn battery_flags_conflict() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir)
        .args(["quote", "--consumption", "300", "--department", "la_paz"])
        .args(["--battery", "--no-battery"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn unmatched_phase_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir)
        .args(["quote", "--consumption", "50000", "--department", "oruro", "--phase", "P1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("inverter"));
}

#[test]
fn batch_emits_one_line_per_input() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("inputs.jsonl");
    fs::write(
        &inputs,
        concat!(
            r#"{"monthly_consumption_kwh": 300, "department": "la_paz", "sector": "residential", "phase": "P1"}"#,
            "\n",
            r#"{"monthly_consumption_kwh": 2500, "department": "beni", "sector": "industrial", "phase": "P3", "include_battery": true}"#,
            "\n"
        ),
    )
    .unwrap();

    let output = solcotctl(&dir)
        .arg("batch")
        .arg("--inputs")
        .arg(&inputs)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["index"], 1);
    assert!(lines[1]["quote"]["result"]["technical_details"]["battery_info"].is_object());
}

#[test]
fn batch_reports_rejected_inputs() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("inputs.jsonl");
    fs::write(
        &inputs,
        r#"{"monthly_consumption_kwh": -1, "department": "pando", "sector": "public", "phase": "P1"}"#,
    )
    .unwrap();

    let output = solcotctl(&dir)
        .arg("batch")
        .arg("--inputs")
        .arg(&inputs)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["error"]["kind"], "validation");
}

#[test]
fn catalog_hash_and_validate() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir).args(["catalog", "hash"]).output().unwrap();
    assert!(output.status.success());
    let hash = String::from_utf8(output.stdout).unwrap();
    assert_eq!(hash.trim().len(), 64);
    assert!(hash.trim().chars().all(|c| c.is_ascii_hexdigit()));

    let output = solcotctl(&dir).args(["catalog", "validate"]).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("catalog OK"));
}

#[test]
fn catalog_show_json_includes_metadata() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir)
        .args(["catalog", "show", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["metadata"]["sha256"].as_str().unwrap().len(), 64);
    assert_eq!(document["catalog"]["exchange_rate"], 6.96);
}

#[test]
fn broken_catalog_is_rejected() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.yaml");
    fs::write(&broken, "panels: []\n").unwrap();
    let output = Command::cargo_bin("solcotctl")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("SOLCOT_CONFIG")
        .args(["--catalog"])
        .arg(&broken)
        .args(["catalog", "validate"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn catalog_show_text_lists_products() {
    let dir = TempDir::new().unwrap();
    let output = solcotctl(&dir).args(["catalog", "show"]).output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("[primary]"));
    assert!(text.contains("Inverters P3:"));
    assert!(text.contains("utilidad"));
    assert!(text.contains("6.96 BOB/USD"));
}
