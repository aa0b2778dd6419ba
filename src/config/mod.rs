use std::env;

use anyhow::anyhow;

/// Top-level configuration for the gateway.
///
/// Loaded once at process start and handed to the services explicitly;
/// nothing in the engine reads environment variables after construction.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub jwt: JwtConfig,
    pub redis: RedisConfig,
    pub license: LicenseConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Symmetric HS256 signing secret.
    pub secret_key: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct LicenseConfig {
    /// TTL for the cached per-organization license verdict in the fast store.
    pub check_interval_minutes: i64,
}

/// Seed values consumed by the bootstrap collaborator when it creates the
/// first administrator account. Not used by the engine itself.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_email: String,
    pub admin_password: String,
}

const DEV_SECRET: &str = "dev-secret-change-this-in-production";

impl GatewayConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str.parse().map_err(|e: String| anyhow!(e))?;

        let is_prod = environment == Environment::Prod;

        let config = GatewayConfig {
            environment,
            service_name: get_env("SERVICE_NAME", Some("auth-gateway"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            jwt: JwtConfig {
                secret_key: get_env("JWT_SECRET_KEY", Some(DEV_SECRET), is_prod)?,
                access_token_expiry_minutes: parse_env(
                    "JWT_ACCESS_TOKEN_EXPIRY_MINUTES",
                    Some("480"),
                    is_prod,
                )?,
                refresh_token_expiry_days: parse_env(
                    "JWT_REFRESH_TOKEN_EXPIRY_DAYS",
                    Some("7"),
                    is_prod,
                )?,
            },
            redis: RedisConfig {
                url: get_env("REDIS_URL", Some("redis://localhost:6379/0"), is_prod)?,
            },
            license: LicenseConfig {
                check_interval_minutes: parse_env(
                    "LICENSE_CHECK_INTERVAL_MINUTES",
                    Some("30"),
                    is_prod,
                )?,
            },
            bootstrap: BootstrapConfig {
                admin_email: get_env("ADMIN_EMAIL", Some("admin@example.com"), is_prod)?,
                admin_password: get_env("ADMIN_PASSWORD", Some("admin123"), is_prod)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt.access_token_expiry_minutes <= 0 {
            return Err(anyhow!("JWT_ACCESS_TOKEN_EXPIRY_MINUTES must be positive"));
        }

        if self.jwt.refresh_token_expiry_days <= 0 {
            return Err(anyhow!("JWT_REFRESH_TOKEN_EXPIRY_DAYS must be positive"));
        }

        if self.license.check_interval_minutes <= 0 {
            return Err(anyhow!("LICENSE_CHECK_INTERVAL_MINUTES must be positive"));
        }

        if self.environment == Environment::Prod {
            if self.jwt.secret_key == DEV_SECRET {
                return Err(anyhow!(
                    "JWT_SECRET_KEY must be set to a non-default value in production"
                ));
            }
            if self.jwt.secret_key.len() < 32 {
                return Err(anyhow!(
                    "JWT_SECRET_KEY must be at least 32 bytes in production"
                ));
            }
            if self.bootstrap.admin_password == "admin123" {
                return Err(anyhow!(
                    "ADMIN_PASSWORD must be set to a non-default value in production"
                ));
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, anyhow::Error> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(anyhow!("{} is required in production but not set", key))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(anyhow!("{} is required but not set", key))
            }
        }
    }
}

fn parse_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<i64, anyhow::Error> {
    get_env(key, default, is_prod)?
        .parse()
        .map_err(|e: std::num::ParseIntError| anyhow!("{}: {}", key, e))
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
