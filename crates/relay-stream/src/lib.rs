//! # Relay Stream
//!
//! 텔레메트리 피드의 스냅샷을 소비해 대시보드 파생 뷰를 유지합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - [`StreamAggregator`] - 스냅샷 ingest와 파생 뷰 상태
//! - 파생 뷰 빌더 (합계, 소유 클라이언트별 그룹, 상위 랭킹)
//! - [`attach`] - TransportClient의 `traffic_update` 구독 글루
//!
//! 각 ingest는 이전 스냅샷을 통째로 교체하며, 모든 파생 뷰를 하나의
//! 동기 패스에서 다시 계산합니다. 소비자는 부분적으로 갱신된 뷰를
//! 관측할 수 없습니다.

pub mod aggregator;
pub mod attach;
pub mod views;

pub use aggregator::{SharedAggregator, StreamAggregator};
pub use attach::{attach, shared_aggregator};
