pub mod bench;
pub mod catalog;
pub mod config;
pub mod doctor;
pub mod migrate;
pub mod worker;
