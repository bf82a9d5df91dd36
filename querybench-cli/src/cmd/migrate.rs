use serde::Serialize;

use querybench_store::{run_migrations, PgSource};

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
struct MigrateResult {
    success: bool,
    message: String,
}

pub async fn migrate_cmd(store: StoreArgs, output: OutputArgs) -> i32 {
    let database_url = match store.database_url() {
        Some(v) => v,
        None => {
            print_error(
                output.format,
                output.quiet,
                "missing database url (use --store or set QUERYBENCH_DATABASE_URL / DATABASE_URL)",
            );
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let source = match PgSource::connect(&database_url, store.max_connections).await {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("failed to connect to postgres: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let code = match run_migrations(source.pool()).await {
        Ok(()) => {
            let result = MigrateResult {
                success: true,
                message: "migrations applied".to_string(),
            };
            if output.format == OutputFormat::Text && !output.quiet {
                println!("ok: migrations applied");
            } else {
                print_result(output.format, output.quiet, &result);
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            print_error(output.format, output.quiet, &format!("migration failed: {e}"));
            exit_codes::RUNTIME_ERROR
        }
    };
    source.close().await;
    code
}
