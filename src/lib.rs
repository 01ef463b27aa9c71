pub mod application;
pub mod catalog;
pub mod commands;
pub mod environment;
pub mod error;
pub mod http;
pub mod package;
pub mod runtime;
