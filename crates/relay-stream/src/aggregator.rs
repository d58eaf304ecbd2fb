//! 스트림 어그리게이터.
//!
//! 전체 스냅샷 업데이트를 ingest하여 유계의 일관된 파생 뷰를
//! 유지합니다. 각 ingest는 하나의 동기 패스로 수행되며, 중간에
//! 양보 지점이 없어 소비자가 부분 갱신 상태를 관측할 수 없습니다.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use relay_core::{DashboardConfig, HistoryPoint, OwnerGroup, TopEntry, Totals, TrafficSample};

use crate::views;

/// 스냅샷을 소비해 파생 뷰를 유지하는 어그리게이터.
///
/// 스냅샷은 diff가 아니라 전체 교체입니다. 합계/그룹/상위 랭킹은
/// 최신 스냅샷만 반영하고, 히스토리 링 버퍼만 스냅샷을 가로질러
/// 유지됩니다.
pub struct StreamAggregator {
    config: DashboardConfig,
    totals: Totals,
    groups: Vec<OwnerGroup>,
    top: Vec<TopEntry>,
    proxy_history: HashMap<u64, VecDeque<HistoryPoint>>,
    global_history: VecDeque<HistoryPoint>,
    connected: bool,
}

impl StreamAggregator {
    /// 새 어그리게이터를 생성합니다.
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            totals: Totals::default(),
            groups: Vec::new(),
            top: Vec::new(),
            proxy_history: HashMap::new(),
            global_history: VecDeque::new(),
            connected: false,
        }
    }

    /// 스냅샷 하나를 ingest합니다.
    ///
    /// 합계, 그룹, 상위 랭킹을 처음부터 다시 계산하고, 스냅샷에
    /// 등장한 각 프록시의 히스토리와 전역 히스토리에 한 점씩
    /// 추가합니다. 가장 오래된 점부터 밀려납니다.
    pub fn ingest(&mut self, snapshot: &[TrafficSample]) {
        self.ingest_at(snapshot, Utc::now());
    }

    /// 라벨 시각을 지정해 ingest합니다.
    pub fn ingest_at(&mut self, snapshot: &[TrafficSample], at: DateTime<Utc>) {
        let label = at.format("%H:%M:%S").to_string();

        self.totals = views::compute_totals(snapshot);
        self.groups = views::group_by_owner(snapshot);
        self.top = views::top_n(snapshot, self.config.top_n);

        for sample in snapshot {
            let ring = self.proxy_history.entry(sample.proxy_id).or_default();
            push_bounded(
                ring,
                HistoryPoint {
                    label: label.clone(),
                    in_rate: sample.bytes_in_rate,
                    out_rate: sample.bytes_out_rate,
                },
                self.config.proxy_history_len,
            );
        }

        push_bounded(
            &mut self.global_history,
            HistoryPoint {
                label,
                in_rate: self.totals.in_rate,
                out_rate: self.totals.out_rate,
            },
            self.config.global_history_len,
        );

        self.connected = true;

        debug!(
            proxies = snapshot.len(),
            groups = self.groups.len(),
            in_rate = self.totals.in_rate,
            out_rate = self.totals.out_rate,
            "Snapshot ingested"
        );
    }

    /// 프록시 하나의 히스토리를 오래된 순으로 반환합니다.
    ///
    /// 한 번도 관측되지 않은 프록시면 빈 시퀀스를 반환합니다. 최신
    /// 스냅샷에서 사라진 프록시의 히스토리도 그대로 유지됩니다 -
    /// 프록시 교체가 잦으면 맵이 무한히 자랄 수 있지만 의도된
    /// 동작입니다.
    pub fn history(&self, proxy_id: u64) -> Vec<HistoryPoint> {
        self.proxy_history
            .get(&proxy_id)
            .map(|ring| ring.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 전역 합계 히스토리를 오래된 순으로 반환합니다.
    pub fn global_history(&self) -> Vec<HistoryPoint> {
        self.global_history.iter().cloned().collect()
    }

    /// 최신 스냅샷의 전역 합계.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// 소유 클라이언트별 그룹 (스냅샷 내 처음 관측 순서).
    pub fn owner_groups(&self) -> &[OwnerGroup] {
        &self.groups
    }

    /// 합산 속도 기준 상위 프록시.
    pub fn top_proxies(&self) -> &[TopEntry] {
        &self.top
    }

    /// 첫 스냅샷 ingest 이후에만 true.
    ///
    /// 소비자에게 노출되는 유일한 연결 신호입니다. 전송 계층의
    /// 일시적 재연결은 따로 드러나지 않습니다.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// 링 버퍼에 한 점을 추가합니다. 용량 초과 시 가장 오래된 점 제거.
fn push_bounded(ring: &mut VecDeque<HistoryPoint>, point: HistoryPoint, capacity: usize) {
    if capacity == 0 {
        return;
    }
    if ring.len() >= capacity {
        ring.pop_front();
    }
    ring.push_back(point);
}

/// 공유 가능한 어그리게이터 타입.
///
/// ingest는 쓰기 잠금을 잡은 채 전체 패스를 수행하므로, 읽기 쪽은
/// 항상 완결된 뷰만 관측합니다.
pub type SharedAggregator = Arc<RwLock<StreamAggregator>>;
