//! `relay watch` - 라이브 피드 관찰.

use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info};

use relay_core::{init_logging, AppConfig, LogConfig, LogFormat};
use relay_stream::{attach, shared_aggregator, SharedAggregator};
use relay_transport::TransportClient;

/// 피드에 연결하고 파생 뷰 요약을 주기적으로 로그로 출력합니다.
///
/// Ctrl-C가 들어오면 연결을 명시적으로 종료하고 반환합니다.
pub async fn run_watch(config: AppConfig, refresh_secs: u64) -> anyhow::Result<()> {
    let format: LogFormat = config.logging.format.parse().unwrap_or_default();
    if let Err(e) = init_logging(LogConfig::new(&config.logging.level).with_format(format)) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let client = TransportClient::new(config.feed.clone());
    let aggregator = shared_aggregator(config.dashboard.clone());
    let _sub = attach(&client, aggregator.clone());

    client.connect();
    info!(url = %config.feed.ws_url, "Watching feed");

    let mut tick = interval(Duration::from_secs(refresh_secs.max(1)));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = tick.tick() => {
                log_summary(&aggregator);
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    error!("Signal listener failed: {}", e);
                }
                info!("Shutting down");
                client.disconnect();
                break;
            }
        }
    }

    Ok(())
}

/// 현재 파생 뷰 요약을 한 번 출력합니다.
fn log_summary(aggregator: &SharedAggregator) {
    let agg = match aggregator.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("StreamAggregator RwLock poisoned (read), recovering");
            poisoned.into_inner()
        }
    };

    if !agg.is_connected() {
        info!("Waiting for first snapshot");
        return;
    }

    let totals = agg.totals();
    info!(
        proxies = totals.proxy_count,
        online = totals.online_count,
        in_rate = totals.in_rate,
        out_rate = totals.out_rate,
        groups = agg.owner_groups().len(),
        "Traffic summary"
    );

    for entry in agg.top_proxies() {
        info!(
            proxy_id = entry.proxy_id,
            name = %entry.proxy_name,
            combined_rate = entry.combined_rate,
            "Top proxy"
        );
    }
}
