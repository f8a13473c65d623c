use std::str::FromStr;

use anyhow::{bail, Context};
use serde::Deserialize;

/// Longest token lifetime `JWT_EXPIRES_DAYS` may ask for.
pub const MAX_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// Custom S3 endpoint (MinIO, LocalStack). `None` talks to AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProvider {
    Ses,
    Log,
}

impl FromStr for EmailProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("ses") {
            Ok(EmailProvider::Ses)
        } else if s.eq_ignore_ascii_case("log") {
            Ok(EmailProvider::Log)
        } else {
            bail!("unknown EMAIL_PROVIDER {s:?}, expected `ses` or `log`")
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub from: String,
    pub region: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub email: EmailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "jobboard".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "jobboard-users".into()),
            ttl_days: parse_ttl_days(std::env::var("JWT_EXPIRES_DAYS").ok().as_deref())?,
        };
        let storage = StorageConfig {
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "jobboard-uploads".into()),
            endpoint: std::env::var("S3_ENDPOINT").ok(),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            access_key: std::env::var("S3_ACCESS_KEY").ok(),
            secret_key: std::env::var("S3_SECRET_KEY").ok(),
        };
        let email = EmailConfig {
            provider: match std::env::var("EMAIL_PROVIDER") {
                Ok(v) => v.parse::<EmailProvider>()?,
                Err(_) => EmailProvider::Log,
            },
            from: std::env::var("EMAIL_FROM").unwrap_or_else(|_| "noreply@jobboard.local".into()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint: std::env::var("AWS_ENDPOINT_URL").ok(),
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
            email,
        })
    }
}

/// Token lifetime in days: 7 when unset, otherwise `1..=MAX_TTL_DAYS`.
fn parse_ttl_days(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(7);
    };
    let days: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("JWT_EXPIRES_DAYS {raw:?} is not a number"))?;
    if !(1..=MAX_TTL_DAYS).contains(&days) {
        bail!("JWT_EXPIRES_DAYS must be between 1 and {MAX_TTL_DAYS}, got {days}");
    }
    Ok(days)
}
