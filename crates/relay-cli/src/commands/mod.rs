//! CLI 하위 명령.

pub mod check;
pub mod watch;

use anyhow::Context;
use relay_core::{AppConfig, FeedConfig};

/// 설정을 로드하고 CLI 인자로 오버라이드합니다.
///
/// URL과 토큰이 모두 주어지면 설정 파일 없이도 동작합니다.
pub fn load_config(
    path: &str,
    url: Option<String>,
    token: Option<String>,
) -> anyhow::Result<AppConfig> {
    if let (Some(url), Some(token)) = (&url, &token) {
        return Ok(AppConfig {
            feed: FeedConfig::new(url.clone(), token.clone()),
            dashboard: Default::default(),
            logging: Default::default(),
        });
    }

    let mut config = AppConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path))?;

    if let Some(url) = url {
        config.feed.ws_url = url;
    }
    if let Some(token) = token {
        config.feed.token = token.into();
    }

    Ok(config)
}
