use crate::core::notification::{Notification, DEFAULT_AUTO_CLOSE_MS};
use crate::core::tracker::{AsyncState, RequestTracker};
use crate::core::wizard::{FieldErrors, DESCRIPTION_REQUIRED, NAME_REQUIRED};
use crate::domain::model::{Department, DepartmentUpdate, Field, MAX_DESCRIPTION_CHARS};
use crate::domain::ports::DepartmentService;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::clamp_chars;
use chrono::Duration;

pub const DEFAULT_UPDATED_MESSAGE: &str = "Department updated successfully!";
pub const DEFAULT_DELETED_MESSAGE: &str = "Department deleted successfully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailsView {
    Loading,
    Failed { message: String },
    /// 沒有錯誤但也沒有資料
    Missing,
    Ready(Department),
}

/// 單一部門的檢視、編輯與刪除畫面。每個動作各自擁有一個 tracker。
pub struct DepartmentDetails<S: DepartmentService> {
    service: S,
    department_id: String,
    department: RequestTracker<Department>,
    update: RequestTracker<Department>,
    delete: RequestTracker<()>,
    editing: Option<DepartmentUpdate>,
    errors: FieldErrors,
    confirm_delete: bool,
    auto_close: Option<Duration>,
}

impl<S: DepartmentService> DepartmentDetails<S> {
    pub fn new(service: S, department_id: impl Into<String>) -> Self {
        Self {
            service,
            department_id: department_id.into(),
            department: RequestTracker::new("department"),
            update: RequestTracker::new("update_department"),
            delete: RequestTracker::new("delete_department"),
            editing: None,
            errors: FieldErrors::default(),
            confirm_delete: false,
            auto_close: Some(Duration::milliseconds(DEFAULT_AUTO_CLOSE_MS)),
        }
    }

    /// 更新與刪除成功通知的自動關閉時間；`None` 表示不自動關閉
    pub fn with_notification_auto_close(mut self, auto_close: Option<Duration>) -> Self {
        self.auto_close = auto_close;
        self
    }

    pub fn department_id(&self) -> &str {
        &self.department_id
    }

    pub async fn load(&self) -> Result<Department> {
        let service = &self.service;
        let id = self.department_id.as_str();
        let envelope = self
            .department
            .execute(|| service.get_department(id))
            .await?;
        Ok(envelope.payload)
    }

    pub fn view(&self) -> DetailsView {
        self.department.with_state(|state| match state {
            AsyncState::Loading => DetailsView::Loading,
            AsyncState::Failed(message) => DetailsView::Failed {
                message: message.clone(),
            },
            AsyncState::Loaded(department) => DetailsView::Ready(department.clone()),
            AsyncState::Idle => DetailsView::Missing,
        })
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_form(&self) -> Option<&DepartmentUpdate> {
        self.editing.as_ref()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// 以目前載入的部門資料開啟編輯表單；尚未載入時不做任何事
    pub fn begin_edit(&mut self) -> bool {
        let Some(department) = self.department.data() else {
            return false;
        };
        self.editing = Some(DepartmentUpdate {
            name: department.name,
            description: department.description,
        });
        self.errors = FieldErrors::default();
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.errors = FieldErrors::default();
    }

    pub fn change_field(&mut self, field: Field, value: &str) {
        let Some(form) = self.editing.as_mut() else {
            tracing::warn!("Ignoring {} change outside edit mode", field.as_str());
            return;
        };
        match field {
            Field::Name => form.name = value.to_string(),
            Field::Description => form.description = clamp_chars(value, MAX_DESCRIPTION_CHARS),
        }
        self.errors.clear_field(field);
    }

    fn validate_form(&mut self, form: &DepartmentUpdate) -> Result<()> {
        let mut errors = FieldErrors::default();
        if form.name.trim().is_empty() {
            errors.name = Some(NAME_REQUIRED.to_string());
        }
        if form.description.trim().is_empty() {
            errors.description = Some(DESCRIPTION_REQUIRED.to_string());
        }

        let outcome = match errors.to_error() {
            Some(error) => Err(error),
            None => Ok(()),
        };
        self.errors = errors;
        outcome
    }

    /// 驗證並送出編輯；成功後離開編輯模式並重新載入部門
    pub async fn save(&mut self) -> Result<Notification> {
        let form = self
            .editing
            .clone()
            .ok_or_else(|| AdminError::validation("form", "Department is not being edited"))?;
        self.validate_form(&form)?;

        let service = &self.service;
        let id = self.department_id.as_str();
        let envelope = match self
            .update
            .execute(|| service.update_department(id, form))
            .await
        {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("❌ Failed to update department {}: {}", id, e);
                return Err(e);
            }
        };
        tracing::info!("✅ Department {} updated", id);

        self.editing = None;
        if let Err(e) = self.load().await {
            // 更新已成功，重新載入失敗只反映在畫面狀態
            tracing::warn!("⚠️  Reload after update failed: {}", e);
        }

        Ok(self.notify(
            envelope
                .message
                .unwrap_or_else(|| DEFAULT_UPDATED_MESSAGE.to_string()),
        ))
    }

    pub fn update_error(&self) -> Option<String> {
        self.update.error()
    }

    pub fn is_saving(&self) -> bool {
        self.update.is_loading()
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        if self.delete.is_loading() {
            return;
        }
        self.confirm_delete = false;
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirm_delete
    }

    pub fn delete_error(&self) -> Option<String> {
        self.delete.error()
    }

    /// 刪除部門。失敗時關閉確認對話框並回傳錯誤，部門集合不變。
    pub async fn confirm_delete(&mut self) -> Result<Notification> {
        let service = &self.service;
        let id = self.department_id.as_str();
        match self
            .delete
            .execute(|| service.delete_department(id))
            .await
        {
            Ok(envelope) => {
                tracing::info!("🗑️  Department {} deleted", id);
                self.confirm_delete = false;
                Ok(self.notify(
                    envelope
                        .message
                        .unwrap_or_else(|| DEFAULT_DELETED_MESSAGE.to_string()),
                ))
            }
            Err(e) => {
                tracing::warn!("❌ Failed to delete department {}: {}", id, e);
                self.confirm_delete = false;
                Err(e)
            }
        }
    }

    fn notify(&self, message: String) -> Notification {
        let mut notice = Notification::success(message);
        notice.auto_close = self.auto_close;
        notice
    }
}
