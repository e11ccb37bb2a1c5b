use std::env;

use crate::{AppError, Result};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_PAYMONGO_URL: &str = "https://api.paymongo.com/v1";

/// Runtime configuration, read from the process environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub paymongo_secret_key: String,
    pub paymongo_base_url: String,
    pub webhook_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = require("DATABASE_URL")?;
        let paymongo_secret_key = require("PAYMONGO_SECRET_KEY")?;
        let webhook_secret = require("PAYMONGO_WEBHOOK_SECRET")?;
        let paymongo_base_url =
            env::var("PAYMONGO_BASE_URL").unwrap_or_else(|_| DEFAULT_PAYMONGO_URL.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("invalid PORT value: {raw}")))?,
            Err(_) => {
                tracing::info!("PORT not set, using default {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };
        Ok(Self {
            database_url,
            port,
            paymongo_secret_key,
            paymongo_base_url,
            webhook_secret,
        })
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).map_err(|_| AppError::Config(format!("{key} not set")))
}
