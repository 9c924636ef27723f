use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Todo の保存先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    /// 開発・テスト用のプロセス内ストア
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub dynamodb_table: String,
    pub environment: String,
    pub aws_region: String,
    /// DynamoDB Local などのエンドポイント上書き
    pub dynamodb_endpoint: Option<String>,
    pub store_backend: StoreBackend,
    pub bind_addr: SocketAddr,
    pub session_secret: String,
    /// 更新対象の所有者を確認するかどうか（既定は確認しない）
    pub enforce_ownership: bool,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("TODO_STORE").as_deref() {
            None | Some("dynamodb") => StoreBackend::DynamoDb,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "TODO_STORE",
                    value: other.to_string(),
                })
            }
        };

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let host: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            key: "HOST",
            value: host.clone(),
        })?;
        let port = match lookup("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 3000,
        };

        let enforce_ownership = match lookup("TODO_ENFORCE_OWNERSHIP") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                key: "TODO_ENFORCE_OWNERSHIP",
                value: raw.clone(),
            })?,
            None => false,
        };

        let session_secret = lookup("SESSION_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("SESSION_SECRET"))?;

        Ok(Config {
            dynamodb_table: lookup("DYNAMODB_TABLE").unwrap_or_else(|| "todox-dev".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT"),
            store_backend,
            bind_addr: SocketAddr::new(host, port),
            session_secret,
            enforce_ownership,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN"),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("dynamodb_table", &self.dynamodb_table)
            .field("environment", &self.environment)
            .field("aws_region", &self.aws_region)
            .field("dynamodb_endpoint", &self.dynamodb_endpoint)
            .field("store_backend", &self.store_backend)
            .field("bind_addr", &self.bind_addr)
            .field("session_secret", &"<redacted>")
            .field("enforce_ownership", &self.enforce_ownership)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .finish()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_only_need_session_secret() {
        let config = Config::from_lookup(lookup_from(&[("SESSION_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.dynamodb_table, "todox-dev");
        assert_eq!(config.environment, "dev");
        assert_eq!(config.aws_region, "ap-northeast-1");
        assert_eq!(config.dynamodb_endpoint, None);
        assert_eq!(config.store_backend, StoreBackend::DynamoDb);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert!(!config.enforce_ownership);
        assert_eq!(config.cors_allowed_origin, None);
    }

    #[test]
    fn test_missing_session_secret_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("SESSION_SECRET"));
    }

    #[test]
    fn test_overrides_are_read() {
        let config = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "s3cret"),
            ("DYNAMODB_TABLE", "todos"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
            ("TODO_STORE", "memory"),
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("TODO_ENFORCE_OWNERSHIP", "true"),
            ("CORS_ALLOWED_ORIGIN", "http://localhost:3001"),
        ]))
        .unwrap();

        assert_eq!(config.dynamodb_table, "todos");
        assert_eq!(config.dynamodb_endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(config.enforce_ownership);
        assert_eq!(
            config.cors_allowed_origin.as_deref(),
            Some("http://localhost:3001")
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_port = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "s3cret"),
            ("PORT", "http"),
        ]));
        assert_eq!(
            bad_port.unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "http".to_string()
            }
        );

        let bad_store = Config::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "s3cret"),
            ("TODO_STORE", "mongodb"),
        ]));
        assert!(matches!(
            bad_store.unwrap_err(),
            ConfigError::Invalid { key: "TODO_STORE", .. }
        ));
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let config = Config::from_lookup(lookup_from(&[("SESSION_SECRET", "s3cret")])).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("s3cret"));
    }
}
