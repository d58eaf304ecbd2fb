//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 텔레메트리 피드 설정
    pub feed: FeedConfig,
    /// 대시보드 파생 뷰 설정
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 텔레메트리 피드 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket 기본 URL (ws:// 또는 wss://)
    pub ws_url: String,
    /// 접속 토큰 (쿼리 파라미터로 전달)
    pub token: SecretString,
    /// 하트비트 간격 (초)
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
    /// 재연결 대기 시간 (초)
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

fn default_ping_interval() -> u64 {
    30
}
fn default_reconnect_delay() -> u64 {
    5
}

impl FeedConfig {
    /// URL과 토큰만으로 피드 설정을 생성합니다. 나머지는 기본값.
    pub fn new(ws_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            token: token.into().into(),
            ping_interval_secs: default_ping_interval(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

/// 대시보드 파생 뷰 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// 프록시별 히스토리 링 버퍼 용량
    #[serde(default = "default_proxy_history")]
    pub proxy_history_len: usize,
    /// 전역 합계 히스토리 링 버퍼 용량
    #[serde(default = "default_global_history")]
    pub global_history_len: usize,
    /// 상위 랭킹 크기
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_proxy_history() -> usize {
    20
}
fn default_global_history() -> usize {
    30
}
fn default_top_n() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            proxy_history_len: default_proxy_history(),
            global_history_len: default_global_history(),
            top_n: default_top_n(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드 (예: RELAY__FEED__WS_URL)
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_feed_config_defaults() {
        let toml = r#"
            ws_url = "wss://feed.example.com/live"
            token = "secret-token"
        "#;
        let config: FeedConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.ping_interval_secs, 30);
        assert_eq!(config.reconnect_delay_secs, 5);
        assert_eq!(config.token.expose_secret(), "secret-token");
    }

    #[test]
    fn test_dashboard_config_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.proxy_history_len, 20);
        assert_eq!(config.global_history_len, 30);
        assert_eq!(config.top_n, 5);
    }
}
