use crate::core::tracker::{AsyncState, RequestTracker};
use crate::domain::model::Department;
use crate::domain::ports::DepartmentService;
use crate::utils::error::Result;
use serde::Serialize;

/// 列表摘要顯示的描述長度
pub const SUMMARY_CHARS: usize = 100;

/// 列表上方的固定篩選選項
pub const FILTER_OPTIONS: [&str; 5] = ["product", "engineering", "accounting", "marketing", "support"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentRow {
    pub id: String,
    pub name: String,
    pub summary: String,
    pub role_count: usize,
}

impl From<&Department> for DepartmentRow {
    fn from(department: &Department) -> Self {
        Self {
            id: department.id.clone(),
            name: department.name.clone(),
            summary: summarize(&department.description),
            role_count: department.roles.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Failed { message: String },
    Ready { rows: Vec<DepartmentRow> },
}

/// 部門列表畫面：載入全部部門，依搜尋字串與篩選值過濾
pub struct DepartmentList<S: DepartmentService> {
    service: S,
    departments: RequestTracker<Vec<Department>>,
    search: String,
    filter: String,
}

impl<S: DepartmentService> DepartmentList<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            departments: RequestTracker::new("departments"),
            search: String::new(),
            filter: String::new(),
        }
    }

    pub async fn refresh(&self) -> Result<usize> {
        let service = &self.service;
        let envelope = self
            .departments
            .execute(|| service.list_departments())
            .await?;
        tracing::debug!("Loaded {} departments", envelope.payload.len());
        Ok(envelope.payload.len())
    }

    pub fn tracker(&self) -> &RequestTracker<Vec<Department>> {
        &self.departments
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.filter.clear();
    }

    pub fn filters_active(&self) -> bool {
        !self.search.is_empty() || !self.filter.is_empty()
    }

    pub fn filter_options(&self) -> &'static [&'static str] {
        &FILTER_OPTIONS
    }

    pub fn visible(&self) -> Vec<Department> {
        let search = self.search.to_lowercase();
        let filter = self.filter.to_lowercase();

        self.departments.with_state(|state| {
            state
                .data()
                .map(|departments| {
                    departments
                        .iter()
                        .filter(|department| {
                            let name = department.name.to_lowercase();
                            let matches_search = name.contains(&search)
                                || department.description.to_lowercase().contains(&search);
                            let matches_filter = filter.is_empty() || name.contains(&filter);
                            matches_search && matches_filter
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    pub fn rows(&self) -> Vec<DepartmentRow> {
        self.visible().iter().map(DepartmentRow::from).collect()
    }

    pub fn count_label(&self) -> String {
        let count = self.visible().len();
        format!("{} Department{}", count, if count == 1 { "" } else { "s" })
    }

    pub fn empty_message(&self) -> &'static str {
        if self.filters_active() {
            "No departments found matching your criteria"
        } else {
            "No departments created yet"
        }
    }

    pub fn view(&self) -> ListView {
        let state = self.departments.with_state(|state| match state {
            AsyncState::Idle | AsyncState::Loading => Some(ListView::Loading),
            AsyncState::Failed(message) => Some(ListView::Failed {
                message: message.clone(),
            }),
            AsyncState::Loaded(_) => None,
        });
        state.unwrap_or_else(|| ListView::Ready { rows: self.rows() })
    }
}

fn summarize(description: &str) -> String {
    match description.char_indices().nth(SUMMARY_CHARS) {
        Some((byte_index, _)) => format!("{}...", &description[..byte_index]),
        None => description.to_string(),
    }
}
