use serde::Serialize;

use querybench_exec::executor::resources::ResourceSample;
use querybench_store::PgSource;

use crate::exit_codes;
use crate::output::{print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
struct Check {
    name: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl Check {
    fn new(name: &str, status: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize)]
struct DoctorResult {
    checks: Vec<Check>,
    all_passed: bool,
}

pub async fn doctor_cmd(store: StoreArgs, output: OutputArgs) -> i32 {
    let mut checks = check_database(&store).await;
    checks.push(check_worker_executable());
    checks.push(check_resource_sampling());

    // Warnings do not fail the run.
    let all_passed = checks.iter().all(|c| c.status != "error");
    let result = DoctorResult { checks, all_passed };

    if output.format == OutputFormat::Text && !output.quiet {
        println!("Environment checks:");
        for c in &result.checks {
            let icon = match c.status.as_str() {
                "ok" => "✓",
                "warning" => "!",
                _ => "✗",
            };
            print!("  {} {}: {}", icon, c.name, c.status);
            if let Some(msg) = &c.message {
                print!(" - {msg}");
            }
            println!();
        }
        if result.all_passed {
            println!("\nAll checks passed.");
        } else {
            println!("\nSome checks failed.");
        }
    } else {
        print_result(output.format, output.quiet, &result);
    }

    if all_passed {
        exit_codes::SUCCESS
    } else {
        exit_codes::RUNTIME_ERROR
    }
}

async fn check_database(store: &StoreArgs) -> Vec<Check> {
    let Some(url) = store.database_url() else {
        return vec![Check::new(
            "database",
            "warning",
            "no database URL configured; only --catalog synthetic is usable",
        )];
    };

    let source = match PgSource::connect(&url, 1).await {
        Ok(s) => s,
        Err(e) => {
            return vec![Check::new(
                "database",
                "error",
                format!("connection to {} failed: {e}", redact_url_password(&url)),
            )]
        }
    };

    let mut checks = vec![Check::new(
        "database",
        "ok",
        format!("connected to {}", redact_url_password(&url)),
    )];
    checks.push(match source.missing_tables().await {
        Ok(missing) if missing.is_empty() => Check::new("schema", "ok", "insurance tables present"),
        Ok(missing) => Check::new(
            "schema",
            "error",
            format!("missing tables: {} (run `querybench migrate`)", missing.join(", ")),
        ),
        Err(e) => Check::new("schema", "error", format!("schema lookup failed: {e}")),
    });
    source.close().await;
    checks
}

fn check_worker_executable() -> Check {
    match std::env::current_exe() {
        Ok(path) => Check::new("workers", "ok", format!("multiprocess workers run {}", path.display())),
        Err(e) => Check::new(
            "workers",
            "error",
            format!("cannot locate own executable, multiprocess mode unavailable: {e}"),
        ),
    }
}

fn check_resource_sampling() -> Check {
    let sample = ResourceSample::capture();
    if sample.is_available() {
        Check::new("resources", "ok", "cpu and memory sampling available")
    } else {
        Check::new(
            "resources",
            "warning",
            "/proc not readable; cpu and memory metrics will report 0",
        )
    }
}
