use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "tauleap-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

const CONVERSION_NETWORK: &str = r#"
{
    "meta": { "name": "conversion" },
    "species": [ { "name": "A", "initial": 500 }, { "name": "B", "initial": 0 } ],
    "parameters": [ { "name": "k", "value": 0.2 } ],
    "reactions": [
        {
            "name": "convert",
            "reactants": [ { "species": "A" } ],
            "products": [ { "species": "B" } ],
            "rate": "k"
        }
    ],
    "grid": { "end": 10.0, "points": 11 }
}
"#;

#[test]
fn simulate_writes_trajectories_json() {
    let dir = unique_temp_dir("simulate-out");
    let network = write_file(&dir, "network.json", CONVERSION_NETWORK);
    let out_json = dir.join("trajectories.json");

    let output = Command::new(env!("CARGO_BIN_EXE_simulate"))
        .args([
            "--network",
            network.to_str().unwrap(),
            "--out",
            out_json.to_str().unwrap(),
            "--trajectories",
            "3",
            "--seed",
            "17",
        ])
        .output()
        .expect("run simulate");
    assert!(
        output.status.success(),
        "simulate failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout
            .lines()
            .filter(|line| line.starts_with("trajectory "))
            .count(),
        3
    );
    assert!(stdout.contains("mean final:"));

    let raw = fs::read_to_string(&out_json).expect("read trajectories.json");
    let v: Value = serde_json::from_str(&raw).expect("parse trajectories.json");
    let arr = v.as_array().expect("trajectories.json must be a JSON array");
    assert_eq!(arr.len(), 3);
    for (idx, record) in arr.iter().enumerate() {
        assert_eq!(record["index"], idx);
        assert_eq!(record["status"], "completed");
        assert_eq!(record["species"], serde_json::json!(["A", "B"]));
        let states = record["states"].as_array().expect("states");
        assert_eq!(states.len(), 11);
        for state in states {
            let a = state[0].as_u64().expect("A");
            let b = state[1].as_u64().expect("B");
            assert_eq!(a + b, 500);
        }
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn simulate_is_reproducible_for_a_seed() {
    let dir = unique_temp_dir("simulate-seed");
    let network = write_file(&dir, "network.json", CONVERSION_NETWORK);

    let run = |name: &str| {
        let out = dir.join(name);
        let output = Command::new(env!("CARGO_BIN_EXE_simulate"))
            .args([
                "--network",
                network.to_str().unwrap(),
                "--out",
                out.to_str().unwrap(),
                "--seed",
                "5",
            ])
            .output()
            .expect("run simulate");
        assert!(output.status.success());
        fs::read_to_string(&out).expect("read output")
    };
    assert_eq!(run("a.json"), run("b.json"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn simulate_rejects_invalid_network() {
    let dir = unique_temp_dir("simulate-invalid");
    let network = write_file(
        &dir,
        "network.json",
        r#"
{
    "species": [ { "name": "A", "initial": 1 } ],
    "parameters": [ { "name": "k", "value": 1.0 } ],
    "reactions": [ { "name": "r", "reactants": [ { "species": "Z" } ], "rate": "k" } ]
}
        "#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_simulate"))
        .args(["--network", network.to_str().unwrap()])
        .output()
        .expect("run simulate");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("undeclared species 'Z'"),
        "unexpected stderr: {stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}
