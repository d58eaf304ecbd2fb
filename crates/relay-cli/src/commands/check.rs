//! `relay check` - 설정 파일 검증.

use anyhow::Context;

use relay_core::AppConfig;

/// 설정 파일을 로드해 해석된 값을 출력합니다. 토큰은 출력하지 않습니다.
pub fn run_check(path: &str) -> anyhow::Result<()> {
    let config = AppConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path))?;

    println!("config ok: {}", path);
    println!("  feed.ws_url              = {}", config.feed.ws_url);
    println!("  feed.token               = [REDACTED]");
    println!("  feed.ping_interval_secs  = {}", config.feed.ping_interval_secs);
    println!("  feed.reconnect_delay_secs = {}", config.feed.reconnect_delay_secs);
    println!("  dashboard.proxy_history_len  = {}", config.dashboard.proxy_history_len);
    println!("  dashboard.global_history_len = {}", config.dashboard.global_history_len);
    println!("  dashboard.top_n              = {}", config.dashboard.top_n);
    println!("  logging.level  = {}", config.logging.level);
    println!("  logging.format = {}", config.logging.format);

    Ok(())
}
