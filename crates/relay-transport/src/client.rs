//! 텔레메트리 피드 WebSocket 클라이언트.
//!
//! 피드 서버와의 듀플렉스 연결 하나를 소유하고 다음을 담당합니다:
//!
//! - 연결 수립/해제와 상태 머신
//! - 연결 중 고정 간격 `{"type":"ping"}` 하트비트
//! - 예기치 않은 종료 시 고정 지연 재연결 (백오프/횟수 제한 없음)
//! - 수신 JSON 프레임의 `type` 태그 기반 팬아웃
//!
//! # 상태 머신
//!
//! ```text
//! Idle ──connect()──> Connecting ──open──> Open
//!                         ↑                  │
//!                         └──[지연 대기]──── 비정상 종료
//!
//! 모든 상태 ──disconnect()──> Closed (다음 connect()까지 종료 상태)
//! ```
//!
//! 타이머(하트비트 간격, 재연결 대기)는 모두 드라이버 태스크의 단일
//! 루프가 소유하므로 상태를 벗어나 살아남을 수 없습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use relay_transport::TransportClient;
//!
//! let client = TransportClient::new(feed_config);
//! let _sub = client.on_message("traffic_update", |payload| {
//!     println!("update: {payload}");
//! });
//! client.connect();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use secrecy::ExposeSecret;
use tokio::time::{interval, sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use relay_core::{FeedConfig, OutboundMessage};

use crate::error::TransportError;
use crate::registry::{HandlerRegistry, MessageHandler, SharedRegistry, Subscription};

/// 연결 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// 아직 연결을 시도한 적 없음
    #[default]
    Idle,
    /// 연결 수립 중 (재연결 대기 포함)
    Connecting,
    /// 연결됨
    Open,
    /// 명시적 종료 진행 중
    Closing,
    /// 명시적으로 종료됨
    Closed,
}

/// 세션 하나가 끝난 이유.
enum SessionEnd {
    /// 비정상 종료 - 재연결 대상
    Lost,
    /// disconnect() 호출로 종료 - 재연결하지 않음
    Cancelled,
}

/// 피드 WebSocket 클라이언트.
///
/// 모든 메서드는 `&self`를 받으며 내부적으로 드라이버 태스크와 상태를
/// 공유합니다. 단일 소유자가 호출하는 것을 전제로 합니다.
pub struct TransportClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: FeedConfig,
    state: RwLock<ConnectionState>,
    registry: SharedRegistry,
    cancel: RwLock<CancellationToken>,
    /// 세션 세대. connect()/disconnect()마다 증가하며, 드라이버의
    /// 상태 기록은 자기 세대가 최신일 때만 반영됩니다.
    generation: AtomicU64,
}

impl TransportClient {
    /// 새 클라이언트를 생성합니다. 연결은 [`connect`](Self::connect)
    /// 호출 전까지 시작되지 않습니다.
    pub fn new(config: FeedConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                config,
                state: RwLock::new(ConnectionState::Idle),
                registry: Arc::new(RwLock::new(HandlerRegistry::new())),
                cancel: RwLock::new(CancellationToken::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// 현재 연결 상태.
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// 연결이 열려 있는지 확인.
    pub fn is_open(&self) -> bool {
        self.inner.state() == ConnectionState::Open
    }

    /// `type` 태그가 일치하는 수신 프레임의 핸들러를 등록합니다.
    ///
    /// 같은 태그의 핸들러는 등록 순서대로 호출됩니다. 반환된
    /// [`Subscription`]이 drop되면 핸들러가 제거됩니다.
    pub fn on_message<F>(&self, tag: &str, handler: F) -> Subscription
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        let boxed: MessageHandler = Box::new(handler);
        let id = self.inner.registry_write().insert(tag, boxed);
        debug!(tag, id, "Handler registered");
        Subscription::new(id, &self.inner.registry)
    }

    /// 연결을 시작합니다.
    ///
    /// 멱등 호출입니다 - 상태가 Connecting 또는 Open이면 아무 일도
    /// 하지 않습니다. Idle/Closed에서 호출하면 명시적 종료 표시를
    /// 지우고 드라이버 태스크를 새로 띄웁니다.
    pub fn connect(&self) {
        let state = self.inner.state();
        if matches!(state, ConnectionState::Connecting | ConnectionState::Open) {
            debug!(state = ?state, "connect() ignored - already active");
            return;
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.set_state(ConnectionState::Connecting);

        let cancel = CancellationToken::new();
        *self.inner.cancel_write() = cancel.clone();

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            ClientInner::drive(inner, cancel, generation).await;
        });
    }

    /// 연결을 명시적으로 종료합니다.
    ///
    /// 어떤 상태에서 호출해도 안전하며, 반환 시점에 상태는 이미
    /// Closed입니다. 기존 드라이버의 상태 기록은 세대 비교로 무시되어
    /// 바로 이어지는 connect()를 덮어쓰지 못합니다. 등록된 구독은
    /// 유지됩니다 - 해제는 각 [`Subscription`] 핸들 소유자의 몫입니다.
    pub fn disconnect(&self) {
        info!("Feed disconnect requested");
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel_write().cancel();
        self.inner.set_state(ConnectionState::Closed);
    }
}

impl ClientInner {
    fn state(&self) -> ConnectionState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: ConnectionState) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard != next {
            debug!(from = ?*guard, to = ?next, "Connection state changed");
            *guard = next;
        }
    }

    /// 해당 세대가 아직 최신일 때만 상태를 기록합니다.
    ///
    /// 세대 비교는 상태 잠금을 잡은 채 수행되어, 오래된 드라이버가
    /// disconnect()나 새 connect() 이후의 상태를 덮어쓸 수 없습니다.
    fn set_state_for(&self, generation: u64, next: ConnectionState) {
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, to = ?next, "Stale session state change ignored");
            return;
        }
        if *guard != next {
            debug!(from = ?*guard, to = ?next, "Connection state changed");
            *guard = next;
        }
    }

    fn registry_write(&self) -> std::sync::RwLockWriteGuard<'_, HandlerRegistry> {
        match self.registry.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("HandlerRegistry RwLock poisoned (write), recovering");
                poisoned.into_inner()
            }
        }
    }

    fn cancel_write(&self) -> std::sync::RwLockWriteGuard<'_, CancellationToken> {
        match self.cancel.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// 접속 URL을 구성합니다. 토큰은 쿼리 파라미터로 전달됩니다.
    ///
    /// 경로 없는 host-only URL은 `/` 경로를 보충하고, 쿼리가 이미
    /// 있으면 `&`로 이어 붙입니다. 쿼리는 있는데 경로가 없는 URL은
    /// 핸드셰이크 요청 라인이 깨지므로 여기서 정규화합니다.
    fn stream_url(&self) -> String {
        let raw = &self.config.ws_url;
        let (base, query) = match raw.split_once('?') {
            Some((base, query)) => (base.to_string(), Some(query)),
            None => (raw.clone(), None),
        };
        let base = match base.split_once("://") {
            Some((scheme, rest)) if !rest.contains('/') => format!("{}://{}/", scheme, rest),
            _ => base,
        };
        match query {
            Some(query) => format!(
                "{}?{}&token={}",
                base,
                query,
                self.config.token.expose_secret()
            ),
            None => format!("{}?token={}", base, self.config.token.expose_secret()),
        }
    }

    /// 드라이버 루프.
    ///
    /// 세션이 비정상 종료되면 고정 지연 후 다시 연결을 시도합니다.
    /// 재시도 횟수 제한은 없으며, disconnect()만이 루프를 끝냅니다.
    async fn drive(inner: Arc<ClientInner>, cancel: CancellationToken, generation: u64) {
        loop {
            match Self::session(&inner, &cancel, generation).await {
                SessionEnd::Cancelled => break,
                SessionEnd::Lost => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    inner.set_state_for(generation, ConnectionState::Connecting);
                    let delay = inner.config.reconnect_delay_secs;
                    warn!(delay_secs = delay, "Feed lost, reconnecting after delay");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = sleep(Duration::from_secs(delay)) => {}
                    }
                }
            }
        }
        inner.set_state_for(generation, ConnectionState::Closed);
        info!("Feed driver stopped");
    }

    /// 세션 하나: 연결 수립부터 종료까지.
    async fn session(
        inner: &Arc<ClientInner>,
        cancel: &CancellationToken,
        generation: u64,
    ) -> SessionEnd {
        let url = inner.stream_url();
        info!("Connecting to feed: {}", inner.config.ws_url);

        let ws = tokio::select! {
            _ = cancel.cancelled() => return SessionEnd::Cancelled,
            result = connect_async(url.as_str()) => match result {
                Ok((ws, _)) => ws,
                Err(e) => {
                    error!("Feed connect failed: {}", TransportError::from(e));
                    return SessionEnd::Lost;
                }
            }
        };

        inner.set_state_for(generation, ConnectionState::Open);
        info!("Feed connected");

        let (mut write, mut read) = ws.split();

        let mut ping = interval(Duration::from_secs(inner.config.ping_interval_secs));
        // 첫 하트비트는 한 간격이 지난 뒤에 보낸다
        ping.reset();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    inner.set_state_for(generation, ConnectionState::Closing);
                    let _ = write.send(Message::Close(None)).await;
                    return SessionEnd::Cancelled;
                }
                _ = ping.tick() => {
                    let frame = match OutboundMessage::Ping.to_json() {
                        Ok(frame) => frame,
                        Err(e) => {
                            error!("Heartbeat serialization failed: {}", e);
                            continue;
                        }
                    };
                    debug!("Sending heartbeat");
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        error!("Heartbeat send failed: {}", e);
                        return SessionEnd::Lost;
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            inner.dispatch_frame(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            let _ = write.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            warn!("Feed closed by server");
                            return SessionEnd::Lost;
                        }
                        Some(Err(e)) => {
                            // 소켓 에러는 일반 종료와 동일하게 취급
                            error!("Feed receive error: {}", TransportError::from(e));
                            return SessionEnd::Lost;
                        }
                        None => {
                            warn!("Feed stream ended");
                            return SessionEnd::Lost;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// 수신 프레임 하나를 파싱하고 팬아웃합니다.
    ///
    /// 파싱 실패와 `type` 태그 없는 프레임은 조용히 버립니다. 한
    /// 프레임의 핸들러 호출이 모두 끝난 뒤에야 다음 프레임을 읽습니다.
    fn dispatch_frame(&self, text: &str) {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                debug!("Dropping unparsable frame: {}", TransportError::from(e));
                return;
            }
        };

        let Some(tag) = value.get("type").and_then(|t| t.as_str()) else {
            debug!("Dropping frame without type tag");
            return;
        };

        let registry = match self.registry.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("HandlerRegistry RwLock poisoned (read), recovering");
                poisoned.into_inner()
            }
        };
        let invoked = registry.dispatch(tag, &value);
        debug!(tag, invoked, "Frame dispatched");
    }
}
