use chrono::{DateTime, Duration, Utc};

/// 預設自動關閉時間（毫秒）
pub const DEFAULT_AUTO_CLOSE_MS: i64 = 5000;

/// 操作成功後短暫顯示的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub raised_at: DateTime<Utc>,
    pub auto_close: Option<Duration>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Utc::now(),
            auto_close: Some(Duration::milliseconds(DEFAULT_AUTO_CLOSE_MS)),
        }
    }

    pub fn with_auto_close(mut self, duration: Duration) -> Self {
        self.auto_close = Some(duration);
        self
    }

    /// 不自動關閉，需使用者手動關閉
    pub fn sticky(mut self) -> Self {
        self.auto_close = None;
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.auto_close.map(|duration| self.raised_at + duration)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_close_after_default_duration() {
        let notice = Notification::success("Department created successfully!");
        let raised = notice.raised_at;

        assert!(!notice.is_expired_at(raised + Duration::milliseconds(4999)));
        assert!(notice.is_expired_at(raised + Duration::milliseconds(5000)));
    }

    #[test]
    fn test_sticky_never_expires() {
        let notice = Notification::success("saved").sticky();
        assert!(!notice.is_expired_at(notice.raised_at + Duration::days(1)));
        assert_eq!(notice.to_string(), "saved");
    }
}
