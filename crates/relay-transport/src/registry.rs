//! 메시지 타입별 핸들러 레지스트리.
//!
//! 수신 프레임의 `type` 태그를 키로 핸들러를 등록하고, 같은 태그의
//! 핸들러는 등록 순서대로 호출합니다. 등록 결과로 호출자가 소유하는
//! [`Subscription`] 핸들을 돌려주며, 핸들이 drop되면 핸들러가
//! 제거됩니다. 레지스트리가 연결 해제 시 암묵적으로 비워지는 일은
//! 없습니다.

use std::sync::{Arc, RwLock, Weak};

use tracing::{debug, error};

/// 수신 프레임 핸들러.
///
/// 프레임 디스패치 루프 안에서 동기적으로 호출됩니다. 핸들러 안에서
/// 같은 레지스트리에 대한 등록/해제를 호출하면 안 됩니다 (쓰기 잠금과
/// 교착).
pub type MessageHandler = Box<dyn Fn(&serde_json::Value) + Send + Sync>;

struct HandlerEntry {
    id: u64,
    tag: String,
    handler: MessageHandler,
}

/// 핸들러 레지스트리.
///
/// 항목은 등록 순서를 유지하는 단일 리스트로 보관됩니다. 태그 수와
/// 핸들러 수가 작다는 전제라서 디스패치는 선형 탐색으로 충분합니다.
#[derive(Default)]
pub struct HandlerRegistry {
    entries: Vec<HandlerEntry>,
    next_id: u64,
}

impl HandlerRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 핸들러를 등록하고 식별자를 반환합니다.
    pub fn insert(&mut self, tag: impl Into<String>, handler: MessageHandler) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(HandlerEntry {
            id,
            tag: tag.into(),
            handler,
        });
        id
    }

    /// 식별자로 핸들러를 제거합니다.
    pub fn remove(&mut self, id: u64) {
        self.entries.retain(|e| e.id != id);
    }

    /// 태그에 등록된 모든 핸들러를 등록 순서대로 호출합니다.
    ///
    /// 호출된 핸들러 수를 반환합니다.
    pub fn dispatch(&self, tag: &str, payload: &serde_json::Value) -> usize {
        let mut invoked = 0;
        for entry in self.entries.iter().filter(|e| e.tag == tag) {
            (entry.handler)(payload);
            invoked += 1;
        }
        invoked
    }

    /// 등록된 핸들러 수.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 레지스트리가 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 공유 가능한 레지스트리 타입.
pub type SharedRegistry = Arc<RwLock<HandlerRegistry>>;

/// 호출자가 소유하는 구독 핸들.
///
/// drop되면 대응하는 핸들러가 레지스트리에서 제거됩니다.
#[must_use = "dropping the subscription unregisters the handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<RwLock<HandlerRegistry>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: &SharedRegistry) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// 구독을 명시적으로 해제합니다.
    pub fn release(self) {
        // Drop이 제거를 수행
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut guard = match registry.write() {
                Ok(guard) => guard,
                Err(poisoned) => {
                    error!("HandlerRegistry RwLock poisoned (write), recovering");
                    poisoned.into_inner()
                }
            };
            guard.remove(self.id);
            debug!(id = self.id, "Subscription released");
        }
    }
}
