pub mod artifacts;
pub mod chain;
pub mod config;
pub mod configurator;
pub mod constants;
pub mod deployment;
pub mod errors;
pub mod inspect;
pub mod ledger;
pub mod network;
pub mod plan;
pub mod protocol;
pub mod runner;
