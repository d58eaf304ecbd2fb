//! 전송 계층 에러 타입.

use thiserror::Error;

/// 전송 계층 에러.
///
/// 연결 유실과 소켓 에러는 호출자에게 전파되지 않고 재연결 경로로
/// 흡수됩니다. 이 타입은 로그와 내부 분류에 사용됩니다.
#[derive(Debug, Error)]
pub enum TransportError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// WebSocket 프로토콜 에러
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl TransportError {
    /// 재연결로 복구 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Network(_) | TransportError::WebSocket(_)
        )
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Parse(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::Io(e) => TransportError::Network(e.to_string()),
            other => TransportError::WebSocket(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(TransportError::Network("refused".into()).is_retryable());
        assert!(TransportError::WebSocket("bad frame".into()).is_retryable());
        assert!(!TransportError::Parse("bad json".into()).is_retryable());
    }

    #[test]
    fn test_parse_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(TransportError::from(err), TransportError::Parse(_)));
    }
}
