use assert_cmd::Command;
use serde_json::Value;

fn querybench() -> Command {
    let mut cmd = Command::cargo_bin("querybench").unwrap();
    cmd.env_remove("QUERYBENCH_DATABASE_URL")
        .env_remove("DATABASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn lists_postgres_catalog_without_a_database() {
    let out = querybench()
        .args(["catalog", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let listing: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(listing["catalog"], "postgres");
    let ops = listing["operations"].as_array().unwrap();
    assert_eq!(ops.len(), 12);
    assert_eq!(ops[0], "list_customers");
}

#[test]
fn lists_synthetic_catalog_as_text() {
    let out = querybench()
        .args(["catalog", "--catalog", "synthetic"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("synthetic (4 operations)"));
    assert!(text.contains("  count_rows"));
}

#[test]
fn worker_answers_requests_line_by_line() {
    let input = concat!(
        r#"{"index":3,"operation":"count_rows"}"#,
        "\n\n",
        r#"{"index":7,"operation":"no_such_query"}"#,
        "\n",
    );
    let out = querybench()
        .args(["worker", "--catalog", "synthetic"])
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let outcomes: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["query_index"], 3);
    assert_eq!(outcomes[0]["succeeded"], true);
    assert_eq!(outcomes[1]["query_index"], 7);
    assert_eq!(outcomes[1]["succeeded"], false);
    assert_eq!(outcomes[1]["error_message"], "unknown operation: no_such_query");
}

#[test]
fn worker_rejects_malformed_requests() {
    querybench()
        .args(["worker", "--catalog", "synthetic"])
        .write_stdin("not json\n")
        .assert()
        .failure()
        .code(4);
}

#[test]
fn migrate_without_database_url_fails() {
    querybench().arg("migrate").assert().failure().code(4);
}

#[test]
fn doctor_warns_without_database_url() {
    let out = querybench()
        .args(["doctor", "--format", "json"])
        .assert()
        .get_output()
        .stdout
        .clone();
    let result: Value = serde_json::from_slice(&out).unwrap();
    let checks = result["checks"].as_array().unwrap();
    assert_eq!(checks[0]["name"], "database");
    assert_eq!(checks[0]["status"], "warning");
    assert!(checks.iter().any(|c| c["name"] == "workers"));
}

#[test]
fn help_describes_every_public_subcommand() {
    let out = querybench().arg("--help").assert().success().get_output().stdout.clone();
    let help = String::from_utf8(out).unwrap();
    assert!(help.contains("Check database, schema, worker executable and resource sampling"));
    assert!(help.contains("Sweep the configuration grid"));
}
