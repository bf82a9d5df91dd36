use serde::Serialize;

use querybench_exec::synthetic::synthetic_catalog;
use querybench_store::insurance_catalog;

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::{CatalogArgs, CatalogKind, OutputArgs};

#[derive(Serialize)]
struct CatalogListing {
    catalog: &'static str,
    operations: Vec<String>,
}

pub async fn catalog_cmd(catalog: CatalogArgs, output: OutputArgs) -> i32 {
    let names: Result<Vec<String>, _> = match catalog.catalog {
        CatalogKind::Postgres => {
            insurance_catalog().map(|c| c.names().map(str::to_string).collect())
        }
        CatalogKind::Synthetic => {
            synthetic_catalog().map(|c| c.names().map(str::to_string).collect())
        }
    };
    let operations = match names {
        Ok(n) => n,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("invalid catalog: {e}"));
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let listing = CatalogListing {
        catalog: catalog.catalog.as_str(),
        operations,
    };
    if output.format == OutputFormat::Text && !output.quiet {
        println!("{} ({} operations)", listing.catalog, listing.operations.len());
        for name in &listing.operations {
            println!("  {name}");
        }
    } else {
        print_result(output.format, output.quiet, &listing);
    }
    exit_codes::SUCCESS
}
