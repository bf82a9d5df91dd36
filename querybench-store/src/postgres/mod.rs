mod migrate;
mod queries;
mod source;

pub use migrate::run_migrations;
pub use queries::{insurance_catalog, InsuranceQuery};
pub use source::PgSource;
