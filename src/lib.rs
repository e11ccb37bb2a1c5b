mod error;

pub use error::{AppError, Result};

pub mod config;
pub mod conversion_service;
pub mod models;
pub mod payments;
pub mod routes;
pub mod storage;
