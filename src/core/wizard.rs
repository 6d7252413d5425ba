//! 建立部門的三步驟精靈：名稱與描述 → 加入角色 → 確認。
//!
//! 步驟只能前後移動；往前走需要通過目前步驟的驗證，往回走不驗證。
//! 第一次進入「加入角色」時會透過 tracker 載入角色目錄，之後在精靈存活期間重複使用。

use crate::core::notification::{Notification, DEFAULT_AUTO_CLOSE_MS};
use crate::core::role_filter::{available_roles, department_options, RoleFilter};
use crate::core::tracker::{AsyncState, RequestTracker};
use crate::domain::model::{
    CreateDepartmentDraft, Department, Field, Role, MAX_DESCRIPTION_CHARS,
};
use crate::domain::ports::DepartmentService;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::clamp_chars;
use chrono::Duration;

pub const NAME_REQUIRED: &str = "Department name is required";
pub const DESCRIPTION_REQUIRED: &str = "Department description is required";
pub const ROLES_REQUIRED: &str = "At least one role must be selected";
pub const DEFAULT_CREATED_MESSAGE: &str = "Department created successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    NameDescription,
    AddRoles,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::NameDescription,
        WizardStep::AddRoles,
        WizardStep::Confirmation,
    ];

    pub fn ordinal(self) -> u8 {
        match self {
            WizardStep::NameDescription => 1,
            WizardStep::AddRoles => 2,
            WizardStep::Confirmation => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::NameDescription => "Name & Description",
            WizardStep::AddRoles => "Add Roles",
            WizardStep::Confirmation => "Confirmation",
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            WizardStep::NameDescription => Some(WizardStep::AddRoles),
            WizardStep::AddRoles => Some(WizardStep::Confirmation),
            WizardStep::Confirmation => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            WizardStep::NameDescription => None,
            WizardStep::AddRoles => Some(WizardStep::NameDescription),
            WizardStep::Confirmation => Some(WizardStep::AddRoles),
        }
    }

    /// 各步驟的驗證規則
    pub fn validate(self, draft: &CreateDepartmentDraft) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        match self {
            WizardStep::NameDescription => {
                if draft.name.trim().is_empty() {
                    errors.name = Some(NAME_REQUIRED.to_string());
                }
                if draft.description.trim().is_empty() {
                    errors.description = Some(DESCRIPTION_REQUIRED.to_string());
                }
            }
            WizardStep::AddRoles => {
                if draft.selected_roles.is_empty() {
                    errors.roles = Some(ROLES_REQUIRED.to_string());
                }
            }
            // 確認步驟目前沒有額外必填欄位
            WizardStep::Confirmation => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 轉移函式：驗證通過後回傳下一步；最後一步則停在原地
    pub fn advance(self, draft: &CreateDepartmentDraft) -> std::result::Result<Self, FieldErrors> {
        self.validate(draft)?;
        Ok(self.next().unwrap_or(self))
    }
}

/// 表單欄位層級的錯誤訊息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub description: Option<String>,
    pub roles: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.roles.is_none()
    }

    pub fn clear_field(&mut self, field: Field) {
        match field {
            Field::Name => self.name = None,
            Field::Description => self.description = None,
        }
    }

    /// 轉成第一個欄位錯誤，供需要 `Result` 的呼叫端使用
    pub fn to_error(&self) -> Option<AdminError> {
        [
            ("name", &self.name),
            ("description", &self.description),
            ("roles", &self.roles),
        ]
        .into_iter()
        .find_map(|(field, message)| {
            message
                .as_ref()
                .map(|message| AdminError::validation(field, message.clone()))
        })
    }
}

/// `next` 的結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Advanced(WizardStep),
    Stayed(WizardStep),
    Blocked(FieldErrors),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardPhase {
    Open,
    Completed(Department),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepProgress {
    pub ordinal: u8,
    pub title: &'static str,
    pub completed: bool,
    pub current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Cancel,
    Back,
    Next,
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardControls {
    pub secondary: WizardAction,
    pub primary: WizardAction,
    pub primary_disabled: bool,
    pub primary_busy: bool,
}

/// 角色選擇步驟的畫面狀態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolesView {
    Loading,
    Failed {
        message: String,
    },
    Ready {
        available: Vec<Role>,
        selected: Vec<Role>,
        departments: Vec<String>,
    },
}

pub struct CreateDepartmentWizard<S: DepartmentService> {
    service: S,
    step: WizardStep,
    draft: CreateDepartmentDraft,
    errors: FieldErrors,
    roles: RequestTracker<Vec<Role>>,
    submission: RequestTracker<Department>,
    phase: WizardPhase,
    auto_close: Option<Duration>,
}

impl<S: DepartmentService> CreateDepartmentWizard<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            step: WizardStep::NameDescription,
            draft: CreateDepartmentDraft::default(),
            errors: FieldErrors::default(),
            roles: RequestTracker::new("roles"),
            submission: RequestTracker::new("create_department"),
            phase: WizardPhase::Open,
            auto_close: Some(Duration::milliseconds(DEFAULT_AUTO_CLOSE_MS)),
        }
    }

    /// 設定成功通知的自動關閉時間；`None` 表示不自動關閉
    pub fn with_notification_auto_close(mut self, auto_close: Option<Duration>) -> Self {
        self.auto_close = auto_close;
        self
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &CreateDepartmentDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn phase(&self) -> &WizardPhase {
        &self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == WizardPhase::Open
    }

    pub fn created_department(&self) -> Option<&Department> {
        match &self.phase {
            WizardPhase::Completed(department) => Some(department),
            _ => None,
        }
    }

    pub fn roles_tracker(&self) -> &RequestTracker<Vec<Role>> {
        &self.roles
    }

    pub fn submission_error(&self) -> Option<String> {
        self.submission.error()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission.is_loading()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(AdminError::WizardClosed)
        }
    }

    pub async fn next(&mut self) -> Result<Transition> {
        self.ensure_open()?;

        let from = self.step;
        match from.advance(&self.draft) {
            Err(errors) => {
                tracing::debug!("Step {} blocked by validation: {:?}", from.ordinal(), errors);
                self.errors = errors.clone();
                Ok(Transition::Blocked(errors))
            }
            Ok(to) if to == from => {
                self.errors = FieldErrors::default();
                Ok(Transition::Stayed(from))
            }
            Ok(to) => {
                self.errors = FieldErrors::default();
                self.step = to;
                tracing::info!("➡️  Wizard moved to step {} ({})", to.ordinal(), to.title());

                if to == WizardStep::AddRoles {
                    self.load_roles_if_needed().await;
                }
                Ok(Transition::Advanced(to))
            }
        }
    }

    pub fn back(&mut self) -> WizardStep {
        if !self.is_open() {
            tracing::warn!("Ignoring back on a closed wizard");
            return self.step;
        }
        if let Some(previous) = self.step.previous() {
            self.step = previous;
            tracing::info!(
                "⬅️  Wizard moved back to step {} ({})",
                previous.ordinal(),
                previous.title()
            );
        }
        self.step
    }

    pub fn change_field(&mut self, field: Field, value: &str) {
        if !self.is_open() {
            tracing::warn!("Ignoring {} change on a closed wizard", field.as_str());
            return;
        }
        match field {
            Field::Name => self.draft.name = value.to_string(),
            Field::Description => {
                self.draft.description = clamp_chars(value, MAX_DESCRIPTION_CHARS)
            }
        }
        self.errors.clear_field(field);
    }

    pub fn add_role(&mut self, role: Role) -> bool {
        if !self.is_open() {
            tracing::warn!("Ignoring role {} on a closed wizard", role.id);
            return false;
        }
        let inserted = self.draft.add_role(role);
        if inserted {
            self.errors.roles = None;
        }
        inserted
    }

    pub fn remove_role(&mut self, role_id: &str) -> bool {
        if !self.is_open() {
            tracing::warn!("Ignoring role removal {} on a closed wizard", role_id);
            return false;
        }
        self.draft.remove_role(role_id)
    }

    async fn load_roles_if_needed(&mut self) {
        if self.roles.has_data() || self.roles.is_loading() {
            return;
        }
        // 載入失敗不阻擋步驟切換，錯誤由 roles_view 顯示並可重試
        if let Err(e) = self.fetch_roles().await {
            tracing::warn!("⚠️  Failed to load role catalog: {}", e);
        }
    }

    async fn fetch_roles(&self) -> Result<()> {
        let service = &self.service;
        let envelope = self.roles.execute(|| service.list_roles()).await?;
        tracing::debug!("Loaded {} roles", envelope.payload.len());
        Ok(())
    }

    /// 重新載入角色目錄
    pub async fn retry_roles(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.fetch_roles().await
    }

    /// 在確認步驟送出草稿。失敗時停留在確認步驟並保留草稿，可再次呼叫重試。
    pub async fn finish(&mut self) -> Result<Notification> {
        self.ensure_open()?;

        if self.step != WizardStep::Confirmation {
            return Err(AdminError::InvalidStep {
                expected: WizardStep::Confirmation.ordinal(),
                actual: self.step.ordinal(),
            });
        }
        if let Err(errors) = self.step.validate(&self.draft) {
            let error = errors
                .to_error()
                .unwrap_or_else(|| AdminError::validation("confirmation", "Invalid draft"));
            self.errors = errors;
            return Err(error);
        }

        let draft = self.draft.clone();
        let service = &self.service;
        tracing::info!(
            "📤 Submitting department '{}' with {} role(s)",
            draft.name,
            draft.selected_roles.len()
        );

        match self
            .submission
            .execute(|| service.create_department(draft))
            .await
        {
            Ok(envelope) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| DEFAULT_CREATED_MESSAGE.to_string());
                tracing::info!("✅ Department '{}' created", envelope.payload.id);

                self.draft = CreateDepartmentDraft::default();
                self.phase = WizardPhase::Completed(envelope.payload);

                let mut notice = Notification::success(message);
                notice.auto_close = self.auto_close;
                Ok(notice)
            }
            Err(e) => {
                tracing::warn!("❌ Department creation failed: {}", e);
                Err(e)
            }
        }
    }

    /// 關閉精靈並丟棄草稿，不呼叫資料服務
    pub fn cancel(&mut self) {
        if !self.is_open() {
            return;
        }
        self.draft = CreateDepartmentDraft::default();
        self.errors = FieldErrors::default();
        self.roles.reset();
        self.submission.reset();
        self.phase = WizardPhase::Cancelled;
        tracing::info!("🚫 Wizard cancelled");
    }

    pub fn heading(&self) -> &'static str {
        if self.step == WizardStep::Confirmation {
            "Create a Team"
        } else {
            "Create Department"
        }
    }

    pub fn progress(&self) -> Vec<StepProgress> {
        let current = self.step.ordinal();
        WizardStep::ALL
            .iter()
            .map(|step| StepProgress {
                ordinal: step.ordinal(),
                title: step.title(),
                completed: *step != WizardStep::Confirmation && current > step.ordinal(),
                current: current == step.ordinal(),
            })
            .collect()
    }

    pub fn controls(&self) -> WizardControls {
        let (secondary, primary) = match self.step {
            WizardStep::NameDescription => (WizardAction::Cancel, WizardAction::Next),
            WizardStep::AddRoles => (WizardAction::Back, WizardAction::Next),
            WizardStep::Confirmation => (WizardAction::Back, WizardAction::Finish),
        };
        WizardControls {
            secondary,
            primary,
            primary_disabled: self.step == WizardStep::AddRoles && self.roles.is_loading(),
            primary_busy: self.submission.is_loading(),
        }
    }

    pub fn roles_view(&self, filter: &RoleFilter) -> RolesView {
        self.roles.with_state(|state| match state {
            AsyncState::Idle | AsyncState::Loading => RolesView::Loading,
            AsyncState::Failed(message) => RolesView::Failed {
                message: message.clone(),
            },
            AsyncState::Loaded(catalog) => RolesView::Ready {
                available: available_roles(catalog, &self.draft.selected_roles, filter),
                selected: self.draft.selected_roles.clone(),
                departments: department_options(catalog),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryDepartmentService, Operation};
    use std::sync::Arc;

    fn draft(name: &str, description: &str) -> CreateDepartmentDraft {
        CreateDepartmentDraft {
            name: name.to_string(),
            description: description.to_string(),
            selected_roles: Vec::new(),
        }
    }

    #[test]
    fn test_step_one_requires_trimmed_name_and_description() {
        let step = WizardStep::NameDescription;
        assert_eq!(step.advance(&draft("Ops", "desc")), Ok(WizardStep::AddRoles));

        let errors = step.advance(&draft("   ", "desc")).unwrap_err();
        assert_eq!(errors.name.as_deref(), Some(NAME_REQUIRED));
        assert!(errors.description.is_none());

        let errors = step.advance(&draft("", "\n")).unwrap_err();
        assert!(errors.name.is_some());
        assert_eq!(errors.description.as_deref(), Some(DESCRIPTION_REQUIRED));
    }

    #[test]
    fn test_step_two_requires_roles() {
        let mut current = draft("Ops", "desc");
        let errors = WizardStep::AddRoles.advance(&current).unwrap_err();
        assert_eq!(errors.roles.as_deref(), Some(ROLES_REQUIRED));

        current.add_role(Role::new("1", "Finance Manager", "Accounting"));
        assert_eq!(
            WizardStep::AddRoles.advance(&current),
            Ok(WizardStep::Confirmation)
        );
    }

    #[test]
    fn test_confirmation_is_last_and_always_valid() {
        let empty = CreateDepartmentDraft::default();
        assert_eq!(
            WizardStep::Confirmation.advance(&empty),
            Ok(WizardStep::Confirmation)
        );
        assert_eq!(WizardStep::NameDescription.previous(), None);
    }

    #[tokio::test]
    async fn test_blocked_next_keeps_step_and_draft() {
        let service = Arc::new(InMemoryDepartmentService::with_default_seed());
        let mut wizard = CreateDepartmentWizard::new(service);
        wizard.change_field(Field::Description, "Runs the platform");

        let transition = wizard.next().await.unwrap();
        assert!(matches!(transition, Transition::Blocked(_)));
        assert_eq!(wizard.step(), WizardStep::NameDescription);
        assert_eq!(wizard.errors().name.as_deref(), Some(NAME_REQUIRED));
        assert_eq!(wizard.draft().description, "Runs the platform");

        // 編輯欄位只清除該欄位的錯誤
        wizard.change_field(Field::Name, "Platform");
        assert!(wizard.errors().name.is_none());
    }

    #[tokio::test]
    async fn test_description_is_clamped() {
        let service = Arc::new(InMemoryDepartmentService::with_default_seed());
        let mut wizard = CreateDepartmentWizard::new(service);
        wizard.change_field(Field::Description, &"x".repeat(600));
        assert_eq!(wizard.draft().description.chars().count(), MAX_DESCRIPTION_CHARS);
    }

    #[tokio::test]
    async fn test_role_catalog_is_fetched_once() {
        let service = Arc::new(InMemoryDepartmentService::with_default_seed());
        let mut wizard = CreateDepartmentWizard::new(Arc::clone(&service));
        wizard.change_field(Field::Name, "Platform");
        wizard.change_field(Field::Description, "Runs the platform");

        wizard.next().await.unwrap();
        let token = wizard.roles_tracker().current_token();
        assert!(wizard.roles_tracker().has_data());

        wizard.back();
        wizard.next().await.unwrap();
        assert_eq!(wizard.roles_tracker().current_token(), token);
        assert_eq!(service.call_count(Operation::ListRoles), 1);
    }

    #[tokio::test]
    async fn test_finish_outside_confirmation_is_rejected() {
        let service = Arc::new(InMemoryDepartmentService::with_default_seed());
        let mut wizard = CreateDepartmentWizard::new(service);
        let result = wizard.finish().await;
        assert!(matches!(
            result,
            Err(AdminError::InvalidStep {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_progress_and_controls() {
        let service = Arc::new(InMemoryDepartmentService::with_default_seed());
        let mut wizard = CreateDepartmentWizard::new(service);

        let controls = wizard.controls();
        assert_eq!(controls.secondary, WizardAction::Cancel);
        assert_eq!(controls.primary, WizardAction::Next);
        assert_eq!(wizard.heading(), "Create Department");

        wizard.change_field(Field::Name, "Platform");
        wizard.change_field(Field::Description, "Runs the platform");
        wizard.next().await.unwrap();

        let progress = wizard.progress();
        assert!(progress[0].completed);
        assert!(progress[1].current);
        assert!(!progress[2].completed);
        assert_eq!(wizard.controls().secondary, WizardAction::Back);
    }

    #[tokio::test]
    async fn test_cancel_closes_wizard() {
        let service = Arc::new(InMemoryDepartmentService::with_default_seed());
        let mut wizard = CreateDepartmentWizard::new(Arc::clone(&service));
        wizard.change_field(Field::Name, "Platform");
        wizard.cancel();

        assert_eq!(wizard.phase(), &WizardPhase::Cancelled);
        assert_eq!(wizard.draft(), &CreateDepartmentDraft::default());
        assert!(matches!(wizard.next().await, Err(AdminError::WizardClosed)));
        assert_eq!(service.call_count(Operation::CreateDepartment), 0);
    }
}
