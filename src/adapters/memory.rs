use crate::domain::model::{CreateDepartmentDraft, Department, DepartmentUpdate, Envelope, Role};
use crate::domain::ports::DepartmentService;
use crate::utils::error::{AdminError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// 資料服務的各項操作，用於計數與注入失敗
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListRoles,
    CreateDepartment,
    ListDepartments,
    GetDepartment,
    UpdateDepartment,
    DeleteDepartment,
}

/// 初始資料：角色目錄與既有部門
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub roles: Vec<Role>,
    pub departments: Vec<Department>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 內建的範例資料
    pub fn default_seed() -> Self {
        let roles = vec![
            Role::new("1", "Finance Manager", "Accounting"),
            Role::new("2", "Accountant", "Accounting"),
            Role::new("3", "Engineering Manager", "Engineering"),
            Role::new("4", "Software Engineer", "Engineering"),
            Role::new("5", "QA Engineer", "Engineering"),
            Role::new("6", "DevOps Engineer", "Engineering"),
            Role::new("7", "Billing Specialist", "Accounting"),
            Role::new("8", "Product Manager", "Product"),
            Role::new("9", "Product Designer", "Product"),
            Role::new("10", "UX Researcher", "Product"),
        ];
        let pick = |indexes: &[usize]| -> Vec<Role> {
            indexes.iter().map(|&i| roles[i].clone()).collect()
        };

        let departments = vec![
            Department {
                id: "1".to_string(),
                name: "Engineering".to_string(),
                description: "Software development and technical operations".to_string(),
                roles: pick(&[2, 3, 4]),
            },
            Department {
                id: "2".to_string(),
                name: "Product".to_string(),
                description: "Product department is responsible for defining the vision, strategy, and roadmap of the company's digital products. The team collaborates closely with engineering, design, and customer-facing departments to ensure product-market fit and long-term value.".to_string(),
                roles: pick(&[7, 8, 9]),
            },
            Department {
                id: "3".to_string(),
                name: "Accounting".to_string(),
                description: "Handles financial records, invoicing, budgeting, and compliance to ensure the company's financial health and regulatory adherence.".to_string(),
                roles: pick(&[0, 1, 6]),
            },
            Department {
                id: "4".to_string(),
                name: "Marketing".to_string(),
                description: "Drives brand awareness, customer engagement, and lead generation through strategic campaigns and market analysis.".to_string(),
                roles: Vec::new(),
            },
            Department {
                id: "5".to_string(),
                name: "Support".to_string(),
                description: "Provides timely assistance to customers and internal teams, resolving issues and ensuring a positive user experience.".to_string(),
                roles: Vec::new(),
            },
        ];

        Self { roles, departments }
    }
}

struct Store {
    roles: Vec<Role>,
    departments: Vec<Department>,
    /// `None` 表示數字 id 已用盡
    next_id: Option<u64>,
}

impl Store {
    /// 取下一個未被使用的數字 id
    fn allocate_id(&mut self) -> Result<String> {
        loop {
            let candidate = self
                .next_id
                .ok_or_else(|| AdminError::service("No department ids left to assign"))?;
            self.next_id = candidate.checked_add(1);

            let id = candidate.to_string();
            if !self.departments.iter().any(|department| department.id == id) {
                return Ok(id);
            }
        }
    }
}

/// 記憶體內的資料服務。單一寫入者、立即一致；
/// 測試可用 `fail_next` 讓指定操作的下一次呼叫失敗。
pub struct InMemoryDepartmentService {
    store: RwLock<Store>,
    faults: Mutex<VecDeque<(Operation, String)>>,
    calls: Mutex<HashMap<Operation, usize>>,
}

impl InMemoryDepartmentService {
    pub fn new(catalog: Catalog) -> Self {
        // id 由服務指派，從既有數字 id 的最大值之後開始；無法再遞增的 id 不列入
        let next_id = catalog
            .departments
            .iter()
            .filter_map(|department| department.id.parse::<u64>().ok()?.checked_add(1))
            .max()
            .unwrap_or(1);

        Self {
            store: RwLock::new(Store {
                roles: catalog.roles,
                departments: catalog.departments,
                next_id: Some(next_id),
            }),
            faults: Mutex::new(VecDeque::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_seed() -> Self {
        Self::new(Catalog::default_seed())
    }

    /// 讓 `operation` 的下一次呼叫以 `message` 失敗
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        let mut faults = self.faults.lock().unwrap_or_else(|p| p.into_inner());
        faults.push_back((operation, message.into()));
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|p| p.into_inner());
        calls.get(&operation).copied().unwrap_or(0)
    }

    pub async fn department_count(&self) -> usize {
        self.store.read().await.departments.len()
    }

    fn record_call(&self, operation: Operation) {
        let mut calls = self.calls.lock().unwrap_or_else(|p| p.into_inner());
        *calls.entry(operation).or_insert(0) += 1;
    }

    fn take_fault(&self, operation: Operation) -> Result<()> {
        let mut faults = self.faults.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(index) = faults.iter().position(|(op, _)| *op == operation) {
            if let Some((_, message)) = faults.remove(index) {
                tracing::debug!("Injected failure for {:?}: {}", operation, message);
                return Err(AdminError::service(message));
            }
        }
        Ok(())
    }
}

impl Default for InMemoryDepartmentService {
    fn default() -> Self {
        Self::with_default_seed()
    }
}

#[async_trait]
impl DepartmentService for InMemoryDepartmentService {
    async fn list_roles(&self) -> Result<Envelope<Vec<Role>>> {
        self.record_call(Operation::ListRoles);
        self.take_fault(Operation::ListRoles)?;

        let store = self.store.read().await;
        tracing::debug!("Listing {} roles", store.roles.len());
        Ok(Envelope::ok(store.roles.clone()))
    }

    async fn create_department(&self, draft: CreateDepartmentDraft) -> Result<Envelope<Department>> {
        self.record_call(Operation::CreateDepartment);

        if draft.name.trim().is_empty() {
            return Err(AdminError::service("Department name is required"));
        }
        if draft.selected_roles.is_empty() {
            return Err(AdminError::service("At least one role must be selected"));
        }
        self.take_fault(Operation::CreateDepartment)?;

        let mut store = self.store.write().await;
        let department = Department {
            id: store.allocate_id()?,
            name: draft.name,
            description: draft.description,
            roles: draft.selected_roles,
        };
        store.departments.push(department.clone());
        tracing::debug!("Stored department {} ({})", department.id, department.name);

        Ok(Envelope::with_message(
            department,
            "Department created successfully!",
        ))
    }

    async fn list_departments(&self) -> Result<Envelope<Vec<Department>>> {
        self.record_call(Operation::ListDepartments);
        self.take_fault(Operation::ListDepartments)?;

        let store = self.store.read().await;
        Ok(Envelope::ok(store.departments.clone()))
    }

    async fn get_department(&self, id: &str) -> Result<Envelope<Department>> {
        self.record_call(Operation::GetDepartment);
        self.take_fault(Operation::GetDepartment)?;

        let store = self.store.read().await;
        let department = store
            .departments
            .iter()
            .find(|department| department.id == id)
            .cloned();
        department
            .map(Envelope::ok)
            .ok_or_else(|| AdminError::department_not_found(id))
    }

    async fn update_department(
        &self,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<Envelope<Department>> {
        self.record_call(Operation::UpdateDepartment);

        if update.name.trim().is_empty() {
            return Err(AdminError::service("Department name is required"));
        }
        if update.description.trim().is_empty() {
            return Err(AdminError::service("Department description is required"));
        }
        self.take_fault(Operation::UpdateDepartment)?;

        let mut store = self.store.write().await;
        let department = store
            .departments
            .iter_mut()
            .find(|department| department.id == id)
            .ok_or_else(|| AdminError::department_not_found(id))?;

        department.name = update.name;
        department.description = update.description;

        Ok(Envelope::with_message(
            department.clone(),
            "Department updated successfully!",
        ))
    }

    async fn delete_department(&self, id: &str) -> Result<Envelope<()>> {
        self.record_call(Operation::DeleteDepartment);
        self.take_fault(Operation::DeleteDepartment)?;

        let mut store = self.store.write().await;
        let index = store
            .departments
            .iter()
            .position(|department| department.id == id)
            .ok_or_else(|| AdminError::department_not_found(id))?;
        let removed = store.departments.remove(index);
        tracing::debug!("Removed department {} ({})", removed.id, removed.name);

        Ok(Envelope::with_message((), "Department deleted successfully!"))
    }
}
