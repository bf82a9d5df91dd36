#![forbid(unsafe_code)]

pub mod error;
pub mod postgres;

pub use crate::error::StoreError;
pub use crate::postgres::{insurance_catalog, run_migrations, InsuranceQuery, PgSource};
