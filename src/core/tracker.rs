use crate::domain::model::Envelope;
use crate::utils::error::{Result, GENERIC_ERROR_MESSAGE};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// 單一非同步請求的狀態快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AsyncState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> AsyncState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

struct Slot<T> {
    state: AsyncState<T>,
    token: u64,
}

/// 包裝一次一個的非同步操作，對外提供 載入中/資料/錯誤 三種狀態。
///
/// 每次 `execute` 都會取得新的 request token；結果回來時若 token 已過期
/// （之後又有新的請求或呼叫過 `reset`），結果只回傳給呼叫者，不會寫入可見狀態。
/// 複製出的 tracker 共用同一個狀態槽。
pub struct RequestTracker<T> {
    slot: Arc<Mutex<Slot<T>>>,
    label: &'static str,
}

impl<T> Clone for RequestTracker<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            label: self.label,
        }
    }
}

impl<T> Default for RequestTracker<T> {
    fn default() -> Self {
        Self::new("request")
    }
}

impl<T> std::fmt::Debug for RequestTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = lock_slot(&self.slot);
        f.debug_struct("RequestTracker")
            .field("label", &self.label)
            .field("token", &slot.token)
            .finish()
    }
}

impl<T> RequestTracker<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                state: AsyncState::Idle,
                token: 0,
            })),
            label,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_loading(&self) -> bool {
        lock_slot(&self.slot).state.is_loading()
    }

    pub fn has_data(&self) -> bool {
        lock_slot(&self.slot).state.data().is_some()
    }

    pub fn error(&self) -> Option<String> {
        lock_slot(&self.slot).state.error().map(str::to_string)
    }

    pub fn current_token(&self) -> u64 {
        lock_slot(&self.slot).token
    }

    /// 在鎖內讀取狀態，避免複製整份資料
    pub fn with_state<R>(&self, f: impl FnOnce(&AsyncState<T>) -> R) -> R {
        f(&lock_slot(&self.slot).state)
    }

    /// 回到初始狀態；進行中的請求結果將被丟棄
    pub fn reset(&self) {
        let mut slot = lock_slot(&self.slot);
        slot.token += 1;
        slot.state = AsyncState::Idle;
        tracing::debug!("[{}] reset (token {})", self.label, slot.token);
    }

    fn begin(&self) -> u64 {
        let mut slot = lock_slot(&self.slot);
        slot.token += 1;
        slot.state = AsyncState::Loading;
        tracing::debug!("[{}] loading (token {})", self.label, slot.token);
        slot.token
    }
}

impl<T: Clone> RequestTracker<T> {
    pub fn snapshot(&self) -> AsyncState<T> {
        lock_slot(&self.slot).state.clone()
    }

    pub fn data(&self) -> Option<T> {
        lock_slot(&self.slot).state.data().cloned()
    }

    /// 執行操作並追蹤狀態：先進入 Loading，完成後寫入 Loaded 或 Failed。
    /// 成功時回傳整個 envelope，失敗時把錯誤原樣回拋給呼叫者。
    pub async fn execute<F, Fut>(&self, operation: F) -> Result<Envelope<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Envelope<T>>>,
    {
        let token = self.begin();
        let outcome = operation().await;
        settle(&self.slot, self.label, token, &outcome);
        outcome
    }

    /// 在背景 task 執行操作。task 只持有狀態槽的弱參考：
    /// 若所有 tracker 都已釋放，結果不會寫回任何狀態，並回傳 `None`。
    pub fn spawn<F, Fut>(&self, operation: F) -> JoinHandle<Option<Result<Envelope<T>>>>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Envelope<T>>> + Send + 'static,
    {
        let token = self.begin();
        let slot = Arc::downgrade(&self.slot);
        let label = self.label;

        tokio::spawn(async move {
            let outcome = operation().await;
            let Some(slot) = slot.upgrade() else {
                tracing::debug!("[{}] owner released before completion, result dropped", label);
                return None;
            };
            settle(&slot, label, token, &outcome);
            Some(outcome)
        })
    }
}

fn lock_slot<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    // 狀態只是單純的值，poison 後仍可安全使用
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn settle<T: Clone>(
    slot: &Mutex<Slot<T>>,
    label: &'static str,
    token: u64,
    outcome: &Result<Envelope<T>>,
) -> bool {
    let mut slot = lock_slot(slot);
    if slot.token != token {
        tracing::debug!(
            "[{}] discarding stale result (token {}, current {})",
            label,
            token,
            slot.token
        );
        return false;
    }

    slot.state = match outcome {
        Ok(envelope) => {
            tracing::debug!("[{}] loaded (token {})", label, token);
            AsyncState::Loaded(envelope.payload.clone())
        }
        Err(e) => {
            let message = failure_message(e);
            tracing::warn!("[{}] failed: {}", label, message);
            AsyncState::Failed(message)
        }
    };
    true
}

/// 錯誤描述為空時改用通用訊息
pub fn failure_message(error: &impl std::fmt::Display) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}
