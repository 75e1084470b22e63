//! Event Bus - 이벤트 브로드캐스트 시스템
//!
//! 호스트 이벤트의 비동기 발행/구독을 제공합니다.
//! 리스너는 발행 순서대로 하나씩 await 되므로 `publish`가 끝나면 처리도 끝난 상태입니다.

use super::types::{AosEvent, EventCategory};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

// ============================================================================
// EventListener Trait
// ============================================================================

/// 이벤트 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// 이벤트 리스너 trait
#[async_trait]
pub trait EventListener: Send + Sync {
    /// 리스너 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 관심 있는 이벤트 카테고리 (None이면 모든 이벤트)
    fn categories(&self) -> Option<Vec<EventCategory>> {
        None
    }

    /// 이벤트 처리
    async fn on_event(&self, event: &AosEvent);
}

// ============================================================================
// EventBus
// ============================================================================

/// 이벤트 버스
///
/// ```ignore
/// let bus = EventBus::new();
/// let id = bus.subscribe(listener).await;
/// bus.publish(task::completed("T1", &usage)).await;
/// bus.unsubscribe(id).await;
/// ```
pub struct EventBus {
    listeners: RwLock<HashMap<ListenerId, Arc<dyn EventListener>>>,
    listener_counter: AtomicU64,
    event_count: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
            listener_counter: AtomicU64::new(0),
            event_count: AtomicU64::new(0),
        }
    }

    /// 리스너 등록
    pub async fn subscribe(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.listener_counter.fetch_add(1, Ordering::SeqCst));

        debug!(
            listener_name = listener.name(),
            listener_id = %id,
            "Registering event listener"
        );

        self.listeners.write().await.insert(id, listener);
        id
    }

    /// 리스너 해제
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().await;
        let removed = listeners.remove(&id).is_some();

        if removed {
            debug!(listener_id = %id, "Unregistered event listener");
        }

        removed
    }

    /// 이벤트 발행
    pub async fn publish(&self, event: AosEvent) {
        let event_count = self.event_count.fetch_add(1, Ordering::SeqCst);
        trace!(
            event_id = %event.id,
            event_type = %event.event_type,
            category = ?event.category,
            "Publishing event #{}", event_count + 1
        );

        // 리스너 목록을 복제한 뒤 락을 풀고 전달 (리스너 안에서 subscribe 가능)
        let targets: Vec<Arc<dyn EventListener>> = {
            let listeners = self.listeners.read().await;
            listeners
                .values()
                .filter(|listener| match listener.categories() {
                    Some(cats) => cats.contains(&event.category),
                    None => true,
                })
                .cloned()
                .collect()
        };

        for listener in targets {
            trace!(
                listener_name = listener.name(),
                event_type = %event.event_type,
                "Delivering event to listener"
            );
            listener.on_event(&event).await;
        }
    }

    /// 등록된 리스너 수
    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// 총 발행된 이벤트 수
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 테스트
// ============================================================================
