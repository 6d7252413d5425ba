use serde::{Deserialize, Serialize};

/// 部門描述的字元上限
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// 角色目錄中的單一角色，由資料服務提供，取得後不再變動
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub department: String,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    pub description: String,
    pub roles: Vec<Role>,
}

/// 建立精靈中的草稿，送出或關閉後即丟棄
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDepartmentDraft {
    pub name: String,
    pub description: String,
    pub selected_roles: Vec<Role>,
}

impl CreateDepartmentDraft {
    /// 依 id 去重的插入；回傳是否真的加入
    pub fn add_role(&mut self, role: Role) -> bool {
        if self.contains_role(&role.id) {
            return false;
        }
        self.selected_roles.push(role);
        true
    }

    /// 移除指定 id 的角色；不存在時不做任何事
    pub fn remove_role(&mut self, role_id: &str) -> bool {
        let before = self.selected_roles.len();
        self.selected_roles.retain(|role| role.id != role_id);
        self.selected_roles.len() != before
    }

    pub fn contains_role(&self, role_id: &str) -> bool {
        self.selected_roles.iter().any(|role| role.id == role_id)
    }
}

/// 編輯部門時可修改的欄位（角色成員在建立後固定）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    pub name: String,
    pub description: String,
}

/// 資料服務統一的回應格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub payload: T,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            payload,
            succeeded: true,
            message: None,
        }
    }

    pub fn with_message(payload: T, message: impl Into<String>) -> Self {
        Self {
            payload,
            succeeded: true,
            message: Some(message.into()),
        }
    }
}

/// 表單欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Description,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
        }
    }
}
