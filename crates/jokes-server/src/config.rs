use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub session_secret: String,
    pub db_path: PathBuf,
    pub public_dir: PathBuf,
    pub addr: SocketAddr,
    pub secure_cookies: bool,
    pub seed: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let session_secret = lookup("JOKES_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!(
                "JOKES_SESSION_SECRET is unset or still a placeholder. Try: {}",
                jokes_crypto::keys::generate_secret()
            );
        }

        let host = lookup("JOKES_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("JOKES_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("JOKES_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("JOKES_HOST must be an IP address")?;

        Ok(Self {
            session_secret,
            db_path: lookup("JOKES_DB_PATH").unwrap_or_else(|| "jokes.db".into()).into(),
            public_dir: lookup("JOKES_PUBLIC_DIR").unwrap_or_else(|| "public".into()).into(),
            addr,
            secure_cookies: flag(lookup("JOKES_SECURE_COOKIES"), true),
            seed: flag(lookup("JOKES_SEED"), false),
        })
    }
}

fn flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some("1") | Some("true") | Some("yes") => true,
        Some("0") | Some("false") | Some("no") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("JOKES_SESSION_SECRET", "s3cr3t")]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("jokes.db"));
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert!(config.secure_cookies);
        assert!(!config.seed);
    }

    #[test]
    fn missing_or_placeholder_secret_is_rejected() {
        assert!(config(&[]).is_err());
        assert!(config(&[("JOKES_SESSION_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("JOKES_SESSION_SECRET", "s3cr3t"),
            ("JOKES_HOST", "127.0.0.1"),
            ("JOKES_PORT", "8080"),
            ("JOKES_SECURE_COOKIES", "false"),
            ("JOKES_SEED", "1"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse().unwrap());
        assert!(!config.secure_cookies);
        assert!(config.seed);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(config(&[("JOKES_SESSION_SECRET", "s3cr3t"), ("JOKES_PORT", "http")]).is_err());
    }
}
