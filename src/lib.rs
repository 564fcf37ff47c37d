//! Library exports for sessiongate, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod interceptors;
pub mod models;
pub mod navigation;
pub mod routes;
pub mod session;
pub mod startup;
pub mod state;
pub mod storage;
pub mod utils;
