//! 파생 뷰 타입.
//!
//! 스냅샷 하나를 소비 위젯이 읽기 좋은 형태로 가공한 결과 타입입니다.
//! 모든 뷰는 최신 ingest에서 다시 계산되며, 이전 값은 통째로 교체됩니다.

use serde::Serialize;

/// 히스토리 한 점.
///
/// 프록시별 링 버퍼와 전역 합계 링 버퍼에 공통으로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    /// 표시 라벨 (HH:MM:SS 벽시계)
    pub label: String,
    /// 수신 속도 (bytes/s)
    pub in_rate: f64,
    /// 송신 속도 (bytes/s)
    pub out_rate: f64,
}

/// 전역 합계.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    /// 전체 수신 속도 합 (bytes/s)
    pub in_rate: f64,
    /// 전체 송신 속도 합 (bytes/s)
    pub out_rate: f64,
    /// 누적 수신 바이트 합
    pub total_in: u64,
    /// 누적 송신 바이트 합
    pub total_out: u64,
    /// 스냅샷의 프록시 수
    pub proxy_count: usize,
    /// 온라인 프록시 수
    pub online_count: usize,
}

/// 소유 클라이언트별 그룹.
///
/// 현재 스냅샷만을 대상으로 집계됩니다. 그룹 순서는 스냅샷에서
/// 해당 클라이언트가 처음 관측된 순서와 같습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerGroup {
    /// 클라이언트 ID
    pub client_id: u64,
    /// 표시 이름 (처음 관측된 샘플에서 결정)
    pub label: String,
    /// 그룹 수신 속도 합 (bytes/s)
    pub in_rate: f64,
    /// 그룹 송신 속도 합 (bytes/s)
    pub out_rate: f64,
    /// 소속 프록시 ID 목록 (스냅샷 순서)
    pub members: Vec<u64>,
    /// 온라인 프록시 수
    pub online_count: usize,
}

/// 상위 랭킹 한 항목.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    /// 프록시 ID
    pub proxy_id: u64,
    /// 프록시 이름
    pub proxy_name: String,
    /// 수신+송신 합산 속도 (bytes/s)
    pub combined_rate: f64,
}
