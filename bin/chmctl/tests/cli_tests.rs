//! ---
//! chm_section: "31-cli"
//! chm_subsection: "tests"
//! chm_type: "test"
//! chm_scope: "code"
//! chm_description: "End-to-end runs of the chmctl binary against a temporary configuration."
//! chm_version: "v0.1.0"
//! chm_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

const ABSENT_KEY: &str = "CHMCTL_TEST_ABSENT_KEY";

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let config = format!(
        r#"chillers = ["CH-1", "CH-2"]

[simulation]
days = 1
random_seed = 7

[model]
api_key_env = "{ABSENT_KEY}"
secrets_path = '{}'

[logging]
directory = '{}'
"#,
        root.join("secrets.toml").display(),
        root.join("logs").display()
    );
    let path = root.join("chm.toml");
    fs::write(&path, config).unwrap();
    (dir, path)
}

fn chmctl(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chmctl").unwrap();
    cmd.env_remove("CHM_CONFIG")
        .env_remove(ABSENT_KEY)
        .arg("--config")
        .arg(config);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "chmctl failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn version_flag_prints_package_version() {
    let out = stdout_of(Command::cargo_bin("chmctl").unwrap().arg("-V"));
    assert_eq!(out.trim(), format!("chmctl {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn views_lists_every_dashboard() {
    let (_dir, config) = workspace();
    let out = stdout_of(chmctl(&config).arg("views"));
    for title in [
        "Power Consumption",
        "Anomaly Detection",
        "Predictive Maintenance",
        "Design Power",
    ] {
        assert!(out.contains(title), "missing {title}");
    }
}

#[test]
fn maintenance_as_json_covers_each_chiller() {
    let (_dir, config) = workspace();
    let out = stdout_of(chmctl(&config).args(["--format", "json", "maintenance"]));
    let records: serde_json::Value = serde_json::from_str(&out).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    for (record, chiller) in records.iter().zip(["CH-1", "CH-2"]) {
        assert_eq!(record["chiller"], chiller);
        let due = record["due_days"].as_u64().unwrap();
        assert!((5..=180).contains(&due));
    }
}

#[test]
fn simulate_writes_csv_file() {
    let (dir, config) = workspace();
    let output = dir.path().join("telemetry.csv");
    stdout_of(chmctl(&config).arg("simulate").arg("--output").arg(&output));
    let contents = fs::read_to_string(&output).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("time,chiller,ambient,it_load,chw_in,power_predicted,power_actual,anomaly_score")
    );
    assert_eq!(lines.count(), 2 * 96);
}

#[test]
fn fleet_view_explains_offline_on_first_chiller() {
    let (_dir, config) = workspace();
    let out = stdout_of(chmctl(&config).args([
        "explain",
        "--view",
        "anomaly-detection",
        "--chiller",
        "CH-2",
    ]));
    assert!(out.starts_with(&format!(
        "Using offline explanation (remote model unavailable: {ABSENT_KEY} not configured)"
    )));
    assert!(out.contains("**Offline explanation for chiller CH-1**"));
    assert!(out.contains("**User question:** What exactly triggers a high anomaly score"));
    assert!(out.contains("High anomaly scores occur when"));
}

#[test]
fn explain_over_recorded_dataset() {
    let (dir, config) = workspace();
    let recorded = dir.path().join("recorded.csv");
    fs::write(
        &recorded,
        "time,chiller,ambient\n2024-06-01 00:00:00,CH-9,31.0\n2024-06-01 00:15:00,CH-9,33.0\n",
    )
    .unwrap();
    let out = stdout_of(
        chmctl(&config)
            .args(["--format", "json", "explain", "--query", "Ambient impact", "--chiller", "CH-9"])
            .arg("--dataset")
            .arg(&recorded),
    );
    let explanation: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(explanation["source"]["kind"], "offline");
    let text = explanation["text"].as_str().unwrap();
    assert!(text.contains("mean ambient temperature for CH-9 is around 32.0 °C."));
    assert!(!text.contains("IT load is"));
}

#[test]
fn explain_requires_a_question() {
    let (_dir, config) = workspace();
    chmctl(&config).arg("explain").assert().failure();
    chmctl(&config)
        .args(["explain", "--view", "design-power", "--preset", "9"])
        .assert()
        .failure();
}
