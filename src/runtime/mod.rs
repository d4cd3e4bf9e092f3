pub mod command;
pub mod engine;
pub mod navigator;
pub mod storage;
pub mod redis_storage;
