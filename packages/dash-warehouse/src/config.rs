//! Warehouse connection settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use dash_core::DashError;

/// Prefix of the environment variables read by [`WarehouseConfig::from_env`].
pub const ENV_PREFIX: &str = "DASH_WAREHOUSE_";

const DEFAULT_PORT: u16 = 5432;
const DEFAULT_SCHEMA: &str = "public";

/// Connection bundle for one warehouse.
///
/// The password never appears in `Debug` output or serialized form.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Host name or account identifier
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Compute warehouse, for backends that have one
    #[serde(default)]
    pub warehouse: String,
    pub database: String,
    pub schema: String,
}

impl WarehouseConfig {
    /// Reads `DASH_WAREHOUSE_{HOST,PORT,USER,PASSWORD,WAREHOUSE,DATABASE,SCHEMA}`.
    ///
    /// `ACCOUNT` is accepted in place of `HOST`. Port defaults to 5432 and
    /// schema to `public`; every other value except `WAREHOUSE` is required.
    pub fn from_env() -> Result<Self, DashError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`WarehouseConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(&format!("{ENV_PREFIX}{key}")).filter(|v| !v.trim().is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                DashError::ConfigError(format!("{ENV_PREFIX}{key} is not set"))
            })
        };

        let host = match get("HOST").or_else(|| get("ACCOUNT")) {
            Some(host) => host,
            None => require("HOST")?,
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                DashError::ConfigError(format!("{ENV_PREFIX}PORT is not a valid port: {raw}"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host,
            port,
            user: require("USER")?,
            password: require("PASSWORD")?,
            warehouse: get("WAREHOUSE").unwrap_or_default(),
            database: require("DATABASE")?,
            schema: get("SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        })
    }
}

impl fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .finish()
    }
}
