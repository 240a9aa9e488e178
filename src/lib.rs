pub mod codec;
pub mod commands;
pub mod config;
pub mod reading;
pub mod storage;
