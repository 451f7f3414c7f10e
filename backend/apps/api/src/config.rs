//! Server configuration from the environment

use std::time::Duration;

use anyhow::{Context, bail};
use audit::{AnchorConfig, AuditConfig};
use auth::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose;
use platform::cookie::SessionCookie;
use platform::env::{self, Environment};

const DEFAULT_PORT: u16 = 31113;
const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

pub struct ServerConfig {
    pub environment: Environment,
    pub database_url: String,
    pub port: u16,
    pub frontend_origins: Vec<String>,
    /// Shared key of internal callers (`x-api-key`)
    pub service_api_key: Option<String>,
    pub sweep_interval: Duration,
    pub auth: AuthConfig,
    pub audit: AuditConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let mut frontend_origins = env::var_list("FRONTEND_ORIGINS");
        if frontend_origins.is_empty() {
            frontend_origins = DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect();
        }

        let service_api_key = env::var("AUDIT_SERVICE_API_KEY");
        if service_api_key.is_none() && environment.is_production() {
            tracing::warn!("AUDIT_SERVICE_API_KEY is unset; internal endpoints will answer 503");
        }

        Ok(Self {
            environment,
            database_url,
            port: env::var_or("PORT", DEFAULT_PORT),
            frontend_origins,
            service_api_key,
            sweep_interval: Duration::from_secs(env::var_or("SWEEP_INTERVAL_SECS", 300u64).max(10)),
            auth: auth_config(environment)?,
            audit: AuditConfig {
                anchor: AnchorConfig::from_parts(
                    env::var("AUDIT_CONTRACT_ADDRESS"),
                    env::var("BLOCKCHAIN_RPC_URL"),
                    env::var("ANCHOR_FROM_ADDRESS"),
                ),
                ..AuditConfig::default()
            },
        })
    }
}

fn auth_config(environment: Environment) -> anyhow::Result<AuthConfig> {
    let base = match env::var("SESSION_SECRET") {
        Some(encoded) => AuthConfig {
            session_secret: decode_secret(&encoded)?,
            ..AuthConfig::default()
        },
        None if environment.is_production() => bail!("SESSION_SECRET must be set in production"),
        None => {
            tracing::warn!("SESSION_SECRET is unset; sessions will not survive a restart");
            AuthConfig::with_random_secret()
        }
    };

    let mut config = AuthConfig {
        environment,
        session_cookie: SessionCookie::for_environment(environment),
        password_pepper: env::var("PASSWORD_PEPPER").map(String::into_bytes),
        ..base
    };
    if let Some(url) = env::var("APP_BASE_URL") {
        config.app_base_url = url;
    }
    Ok(config)
}

/// Base64 encoded, exactly 32 bytes
fn decode_secret(encoded: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .context("SESSION_SECRET is not valid base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", b.len()))
}
