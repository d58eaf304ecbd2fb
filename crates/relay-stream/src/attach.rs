//! 전송 계층과 어그리게이터를 잇는 글루.

use std::sync::{Arc, RwLock};

use tracing::{error, warn};

use relay_core::{DashboardConfig, InboundMessage};
use relay_transport::{Subscription, TransportClient};

use crate::aggregator::{SharedAggregator, StreamAggregator};

/// 공유 어그리게이터를 생성합니다.
pub fn shared_aggregator(config: DashboardConfig) -> SharedAggregator {
    Arc::new(RwLock::new(StreamAggregator::new(config)))
}

/// 어그리게이터를 클라이언트의 `traffic_update` 메시지에 구독시킵니다.
///
/// 반환된 [`Subscription`]을 drop하면 구독이 해제됩니다. 페이로드
/// 역직렬화에 실패한 업데이트는 경고 로그만 남기고 버립니다 -
/// 전송 계층의 일시 장애와 동일하게 취급하며 소비자에게 에러로
/// 드러나지 않습니다.
pub fn attach(client: &TransportClient, aggregator: SharedAggregator) -> Subscription {
    client.on_message("traffic_update", move |payload| {
        let update = match serde_json::from_value::<InboundMessage>(payload.clone()) {
            Ok(update) => update,
            Err(e) => {
                warn!("Dropping undecodable traffic update: {}", e);
                return;
            }
        };

        if let InboundMessage::TrafficUpdate { data } = update {
            let mut guard = match aggregator.write() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    error!("StreamAggregator RwLock poisoned (write), recovering");
                    poisoned.into_inner()
                }
            };
            guard.ingest(&data);
        }
    })
}
