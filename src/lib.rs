pub mod config;
pub mod error;
pub mod executors;
pub mod form;
pub mod loader;
pub mod model;
pub mod routes;
pub mod runtime;
pub mod session;
