use crate::domain::model::Role;

/// 角色選擇步驟的搜尋與部門篩選條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFilter {
    pub search: String,
    pub department: Option<String>,
}

impl RoleFilter {
    pub fn new(search: impl Into<String>, department: Option<String>) -> Self {
        Self {
            search: search.into(),
            department: department.filter(|d| !d.is_empty()),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.department.is_some()
    }

    pub fn reset(&mut self) {
        self.search.clear();
        self.department = None;
    }

    pub fn matches(&self, role: &Role) -> bool {
        let matches_search = role
            .name
            .to_lowercase()
            .contains(&self.search.to_lowercase());
        let matches_department = self
            .department
            .as_deref()
            .map_or(true, |department| role.department == department);
        matches_search && matches_department
    }
}

/// 可加入的角色：排除已選取者，再套用搜尋（名稱不分大小寫）與部門篩選（完全相符）
pub fn available_roles(catalog: &[Role], selected: &[Role], filter: &RoleFilter) -> Vec<Role> {
    catalog
        .iter()
        .filter(|role| !selected.iter().any(|picked| picked.id == role.id))
        .filter(|role| filter.matches(role))
        .cloned()
        .collect()
}

/// 目錄中出現過的部門標籤，依首次出現順序、略過空白標籤
pub fn department_options(catalog: &[Role]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for role in catalog {
        if role.department.trim().is_empty() || options.contains(&role.department) {
            continue;
        }
        options.push(role.department.clone());
    }
    options
}
