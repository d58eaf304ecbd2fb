//! # Relay Core
//!
//! 프록시 트래픽 대시보드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 대시보드 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 트래픽 텔레메트리 샘플 및 스냅샷 메시지
//! - 파생 뷰 타입 (합계, 소유 클라이언트별 그룹, 상위 랭킹, 히스토리)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use logging::*;
