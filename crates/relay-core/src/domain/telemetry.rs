//! 트래픽 텔레메트리 와이어 타입.
//!
//! 이 모듈은 피드 서버와 교환되는 메시지 타입을 정의합니다:
//! - `TrafficSample` - 프록시 하나의 트래픽 측정값
//! - `InboundMessage` - 서버에서 수신하는 타입 구분 메시지
//! - `OutboundMessage` - 서버로 전송하는 메시지 (하트비트)

use serde::{Deserialize, Serialize};

/// 프록시 하나의 트래픽 측정값.
///
/// 식별 키는 `proxy_id`입니다. 하나의 스냅샷 안에서만 유효하며,
/// 다음 스냅샷이 도착하면 전체가 교체됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSample {
    /// 프록시 ID
    pub proxy_id: u64,
    /// 프록시 이름
    pub proxy_name: String,
    /// 소유 클라이언트 ID
    pub client_id: u64,
    /// 소유 클라이언트 이름
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// 수신 속도 (bytes/s)
    pub bytes_in_rate: f64,
    /// 송신 속도 (bytes/s)
    pub bytes_out_rate: f64,
    /// 누적 수신 바이트
    pub total_bytes_in: u64,
    /// 누적 송신 바이트
    pub total_bytes_out: u64,
    /// 온라인 여부
    pub online: bool,
}

impl TrafficSample {
    /// 수신+송신 합산 속도를 반환합니다.
    pub fn combined_rate(&self) -> f64 {
        self.bytes_in_rate + self.bytes_out_rate
    }

    /// 소유 클라이언트 표시 이름을 반환합니다.
    ///
    /// 이름이 없으면 `client {id}` 형식으로 대체합니다.
    pub fn client_label(&self) -> String {
        self.client_name
            .clone()
            .unwrap_or_else(|| format!("client {}", self.client_id))
    }
}

/// 서버에서 수신하는 메시지.
///
/// 모든 프레임은 `type` 필드로 구분되는 JSON 객체입니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// 전체 스냅샷 트래픽 업데이트
    TrafficUpdate {
        /// 현재 라이브 프록시 전체의 측정값
        data: Vec<TrafficSample>,
    },
    /// 하트비트 응답
    Pong,
}

impl InboundMessage {
    /// JSON 문자열에서 파싱합니다.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 서버로 전송하는 메시지.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// 연결 유지 하트비트
    Ping,
}

impl OutboundMessage {
    /// JSON 문자열로 직렬화합니다.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
