//! 피드 → 전송 → 어그리게이터 파이프라인 통합 테스트.

use std::time::Duration;

use futures::SinkExt;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use relay_core::{DashboardConfig, FeedConfig, TrafficSample};
use relay_stream::{attach, shared_aggregator, StreamAggregator};
use relay_transport::TransportClient;

fn sample(proxy_id: u64, client_id: u64, in_rate: f64, out_rate: f64) -> TrafficSample {
    TrafficSample {
        proxy_id,
        proxy_name: format!("proxy-{}", proxy_id),
        client_id,
        client_name: Some(format!("owner-{}", client_id)),
        bytes_in_rate: in_rate,
        bytes_out_rate: out_rate,
        total_bytes_in: 0,
        total_bytes_out: 0,
        online: true,
    }
}

#[tokio::test]
async fn test_feed_to_views_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let first = serde_json::json!({
            "type": "traffic_update",
            "data": [
                { "proxy_id": 1, "proxy_name": "web", "client_id": 10,
                  "client_name": "acme", "bytes_in_rate": 10.0,
                  "bytes_out_rate": 5.0, "total_bytes_in": 100,
                  "total_bytes_out": 50, "online": true },
                { "proxy_id": 2, "proxy_name": "ssh", "client_id": 10,
                  "client_name": "acme", "bytes_in_rate": 1.0,
                  "bytes_out_rate": 1.0, "total_bytes_in": 10,
                  "total_bytes_out": 10, "online": true }
            ]
        });
        let second = serde_json::json!({
            "type": "traffic_update",
            "data": [
                { "proxy_id": 1, "proxy_name": "web", "client_id": 10,
                  "client_name": "acme", "bytes_in_rate": 10.0,
                  "bytes_out_rate": 5.0, "total_bytes_in": 200,
                  "total_bytes_out": 100, "online": true }
            ]
        });

        ws.send(Message::Text(first.to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        ws.send(Message::Text(second.to_string())).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let config = FeedConfig {
        ws_url: format!("ws://{}/live", addr),
        token: "test-token".to_string().into(),
        ping_interval_secs: 30,
        reconnect_delay_secs: 5,
    };
    let client = TransportClient::new(config);
    let aggregator = shared_aggregator(DashboardConfig::default());
    let _sub = attach(&client, aggregator.clone());

    assert!(!aggregator.read().unwrap().is_connected());

    client.connect();
    tokio::time::sleep(Duration::from_millis(500)).await;

    let agg = aggregator.read().unwrap();
    assert!(agg.is_connected());

    // 두 번째 스냅샷이 뷰를 교체
    assert_eq!(agg.totals().in_rate, 10.0);
    assert_eq!(agg.totals().proxy_count, 1);
    assert_eq!(agg.owner_groups().len(), 1);
    assert_eq!(agg.owner_groups()[0].label, "acme");

    // 사라진 2번 프록시의 히스토리는 유지
    assert_eq!(agg.history(2).len(), 1);
    assert_eq!(agg.history(1).len(), 2);
    drop(agg);

    client.disconnect();
}

#[test]
fn test_group_sums_match_member_sums() {
    let mut agg = StreamAggregator::new(DashboardConfig::default());
    let snapshot = vec![
        sample(1, 10, 10.0, 4.0),
        sample(2, 20, 3.0, 3.0),
        sample(3, 10, 2.0, 1.0),
        sample(4, 20, 7.0, 0.5),
    ];
    agg.ingest(&snapshot);

    for group in agg.owner_groups() {
        let in_sum: f64 = snapshot
            .iter()
            .filter(|s| s.client_id == group.client_id)
            .map(|s| s.bytes_in_rate)
            .sum();
        let out_sum: f64 = snapshot
            .iter()
            .filter(|s| s.client_id == group.client_id)
            .map(|s| s.bytes_out_rate)
            .sum();
        assert_eq!(group.in_rate, in_sum);
        assert_eq!(group.out_rate, out_sum);

        let members: Vec<u64> = snapshot
            .iter()
            .filter(|s| s.client_id == group.client_id)
            .map(|s| s.proxy_id)
            .collect();
        assert_eq!(group.members, members);
    }
}

#[test]
fn test_top_n_is_min_of_five_and_len() {
    let mut agg = StreamAggregator::new(DashboardConfig::default());

    for len in [0usize, 3, 5, 9] {
        let snapshot: Vec<TrafficSample> = (0..len as u64)
            .map(|i| sample(i, 1, i as f64, 0.0))
            .collect();
        agg.ingest(&snapshot);
        assert_eq!(agg.top_proxies().len(), len.min(5));
        for pair in agg.top_proxies().windows(2) {
            assert!(pair[0].combined_rate >= pair[1].combined_rate);
        }
    }
}

mod ring_bounds {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// 임의의 ingest 시퀀스에서도 링 버퍼 길이는 용량을 넘지 않는다.
        #[test]
        fn prop_history_never_exceeds_capacity(
            snapshots in proptest::collection::vec(
                proptest::collection::vec((0u64..8, 0.0f64..1e6), 0..6),
                0..64,
            )
        ) {
            let mut agg = StreamAggregator::new(DashboardConfig::default());

            for snapshot in &snapshots {
                let batch: Vec<TrafficSample> = snapshot
                    .iter()
                    .map(|&(id, rate)| sample(id, 1, rate, rate))
                    .collect();
                agg.ingest(&batch);

                prop_assert!(agg.global_history().len() <= 30);
                for id in 0u64..8 {
                    prop_assert!(agg.history(id).len() <= 20);
                }
            }
        }
    }
}
