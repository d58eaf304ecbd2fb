//! 파생 뷰 빌더.
//!
//! 스냅샷 하나를 입력으로 받아 각 뷰를 처음부터 다시 계산합니다.
//! 이전 뷰 상태에 의존하지 않습니다.

use std::cmp::Ordering;
use std::collections::HashMap;

use relay_core::{OwnerGroup, TopEntry, Totals, TrafficSample};

/// 전역 합계를 계산합니다.
pub fn compute_totals(snapshot: &[TrafficSample]) -> Totals {
    let mut totals = Totals {
        proxy_count: snapshot.len(),
        ..Totals::default()
    };
    for sample in snapshot {
        totals.in_rate += sample.bytes_in_rate;
        totals.out_rate += sample.bytes_out_rate;
        totals.total_in += sample.total_bytes_in;
        totals.total_out += sample.total_bytes_out;
        if sample.online {
            totals.online_count += 1;
        }
    }
    totals
}

/// 소유 클라이언트별 그룹을 계산합니다.
///
/// 단일 패스입니다. 클라이언트가 처음 관측된 샘플이 그룹의 표시
/// 이름과 출력 순서를 결정하고, 이후 샘플은 합계에 누적됩니다.
pub fn group_by_owner(snapshot: &[TrafficSample]) -> Vec<OwnerGroup> {
    let mut groups: Vec<OwnerGroup> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for sample in snapshot {
        let slot = *index.entry(sample.client_id).or_insert_with(|| {
            groups.push(OwnerGroup {
                client_id: sample.client_id,
                label: sample.client_label(),
                in_rate: 0.0,
                out_rate: 0.0,
                members: Vec::new(),
                online_count: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.in_rate += sample.bytes_in_rate;
        group.out_rate += sample.bytes_out_rate;
        group.members.push(sample.proxy_id);
        if sample.online {
            group.online_count += 1;
        }
    }

    groups
}

/// 합산 속도 기준 상위 `n`개 프록시를 계산합니다.
///
/// 안정 정렬이므로 동률은 스냅샷 순서를 유지합니다. 스냅샷이 `n`개
/// 미만이면 전체를 반환합니다.
pub fn top_n(snapshot: &[TrafficSample], n: usize) -> Vec<TopEntry> {
    let mut entries: Vec<TopEntry> = snapshot
        .iter()
        .map(|sample| TopEntry {
            proxy_id: sample.proxy_id,
            proxy_name: sample.proxy_name.clone(),
            combined_rate: sample.combined_rate(),
        })
        .collect();

    entries.sort_by(|a, b| {
        b.combined_rate
            .partial_cmp(&a.combined_rate)
            .unwrap_or(Ordering::Equal)
    });
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_totals_sum_over_snapshot() {
        let snapshot = vec![
            sample(1, 1, 10.0, 5.0),
            sample(2, 1, 1.0, 1.0),
            sample(3, 2, 4.0, 2.0),
        ];
        let totals = compute_totals(&snapshot);
        assert_eq!(totals.in_rate, 15.0);
        assert_eq!(totals.out_rate, 8.0);
        assert_eq!(totals.proxy_count, 3);
        assert_eq!(totals.online_count, 3);
    }

    #[test]
    fn test_totals_online_count() {
        let mut offline = sample(1, 1, 0.0, 0.0);
        offline.online = false;
        let totals = compute_totals(&[offline, sample(2, 1, 1.0, 1.0)]);
        assert_eq!(totals.online_count, 1);
    }

    #[test]
    fn test_group_sums_and_first_seen_order() {
        let snapshot = vec![
            sample(1, 2, 10.0, 5.0),
            sample(2, 1, 1.0, 1.0),
            sample(3, 2, 4.0, 2.0),
        ];
        let groups = group_by_owner(&snapshot);

        // 처음 관측된 순서: 클라이언트 2, 클라이언트 1
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].client_id, 2);
        assert_eq!(groups[0].in_rate, 14.0);
        assert_eq!(groups[0].out_rate, 7.0);
        assert_eq!(groups[0].members, vec![1, 3]);
        assert_eq!(groups[1].client_id, 1);
        assert_eq!(groups[1].members, vec![2]);
    }

    #[test]
    fn test_group_label_from_first_sample() {
        let mut first = sample(1, 9, 1.0, 1.0);
        first.client_name = Some("primary".to_string());
        let mut second = sample(2, 9, 1.0, 1.0);
        second.client_name = Some("renamed".to_string());

        let groups = group_by_owner(&[first, second]);
        assert_eq!(groups[0].label, "primary");
    }

    #[test]
    fn test_top_n_sorted_and_truncated() {
        let snapshot: Vec<TrafficSample> = (0..8)
            .map(|i| sample(i, 1, i as f64, 0.0))
            .collect();
        let top = top_n(&snapshot, 5);

        assert_eq!(top.len(), 5);
        for pair in top.windows(2) {
            assert!(pair[0].combined_rate >= pair[1].combined_rate);
        }
        assert_eq!(top[0].proxy_id, 7);
    }

    #[test]
    fn test_top_n_smaller_snapshot_returns_all() {
        let snapshot = vec![sample(1, 1, 1.0, 0.0), sample(2, 1, 2.0, 0.0)];
        assert_eq!(top_n(&snapshot, 5).len(), 2);
    }

    #[test]
    fn test_top_n_ties_keep_snapshot_order() {
        let snapshot = vec![
            sample(10, 1, 3.0, 0.0),
            sample(11, 1, 3.0, 0.0),
            sample(12, 1, 3.0, 0.0),
        ];
        let top = top_n(&snapshot, 5);
        let ids: Vec<u64> = top.iter().map(|e| e.proxy_id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }
}
