use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub public_origin: String,
    /// Username promoted to superadmin at startup, if set.
    pub superadmin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("BIZCARD_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("BIZCARD_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let db_path = var("BIZCARD_DB_PATH").unwrap_or_else(|| "bizcard.db".into()).into();
        let host = var("BIZCARD_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("BIZCARD_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("BIZCARD_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let public_origin = var("BIZCARD_PUBLIC_ORIGIN")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let superadmin = var("BIZCARD_SUPERADMIN").filter(|s| !s.trim().is_empty());

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            public_origin,
            superadmin,
        })
    }
}
