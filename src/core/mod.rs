pub mod department_details;
pub mod department_list;
pub mod notification;
pub mod role_filter;
pub mod tracker;
pub mod wizard;

pub use crate::domain::model::{
    CreateDepartmentDraft, Department, DepartmentUpdate, Envelope, Field, Role,
};
pub use crate::domain::ports::DepartmentService;
pub use crate::utils::error::Result;
