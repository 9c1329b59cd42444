use crate::error::ConfigError;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 실행 설정 (환경 변수)
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 없으면 메모리 저장소로 실행
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub reconcile_interval: Duration,
    pub database_reset: bool,
    pub database_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 임의의 조회 함수로 설정 구성
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let interval_secs = match lookup("RECONCILE_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "RECONCILE_INTERVAL_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_RECONCILE_INTERVAL_SECS,
        };

        let database_reset = match lookup("DATABASE_RESET") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "DATABASE_RESET",
                        value: raw,
                    })
                }
            },
            None => false,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "DATABASE_MAX_CONNECTIONS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            bind_addr,
            reconcile_interval: Duration::from_secs(interval_secs),
            database_reset,
            database_max_connections,
        })
    }
}
