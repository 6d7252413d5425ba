use crate::domain::model::{CreateDepartmentDraft, Department, DepartmentUpdate, Envelope, Role};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// 部門與角色資料服務的邊界；畫面只透過這些操作存取資料
#[async_trait]
pub trait DepartmentService: Send + Sync {
    async fn list_roles(&self) -> Result<Envelope<Vec<Role>>>;
    async fn create_department(&self, draft: CreateDepartmentDraft) -> Result<Envelope<Department>>;
    async fn list_departments(&self) -> Result<Envelope<Vec<Department>>>;
    async fn get_department(&self, id: &str) -> Result<Envelope<Department>>;
    async fn update_department(
        &self,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<Envelope<Department>>;
    async fn delete_department(&self, id: &str) -> Result<Envelope<()>>;
}

#[async_trait]
impl<S: DepartmentService + ?Sized> DepartmentService for Arc<S> {
    async fn list_roles(&self) -> Result<Envelope<Vec<Role>>> {
        (**self).list_roles().await
    }

    async fn create_department(&self, draft: CreateDepartmentDraft) -> Result<Envelope<Department>> {
        (**self).create_department(draft).await
    }

    async fn list_departments(&self) -> Result<Envelope<Vec<Department>>> {
        (**self).list_departments().await
    }

    async fn get_department(&self, id: &str) -> Result<Envelope<Department>> {
        (**self).get_department(id).await
    }

    async fn update_department(
        &self,
        id: &str,
        update: DepartmentUpdate,
    ) -> Result<Envelope<Department>> {
        (**self).update_department(id, update).await
    }

    async fn delete_department(&self, id: &str) -> Result<Envelope<()>> {
        (**self).delete_department(id).await
    }
}
