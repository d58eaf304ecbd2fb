//! # Relay Transport
//!
//! 텔레메트리 피드와의 듀플렉스 연결을 관리합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 연결 수립/해제 및 상태 머신
//! - 고정 간격 하트비트와 고정 지연 재연결
//! - 수신 JSON 프레임의 타입 기반 팬아웃
//!
//! 텔레메트리 의미론은 알지 못합니다. 프레임을 파싱해 `type` 필드로
//! 구독자에게 전달할 뿐이며, 해석은 상위 계층(relay-stream)의 몫입니다.

pub mod client;
pub mod error;
pub mod registry;

pub use client::{ConnectionState, TransportClient};
pub use error::TransportError;
pub use registry::{HandlerRegistry, SharedRegistry, Subscription};
