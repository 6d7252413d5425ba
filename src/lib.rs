pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{Catalog, InMemoryDepartmentService, Operation};
pub use config::toml_config::AdminConfig;
pub use crate::core::department_details::{DepartmentDetails, DetailsView};
pub use crate::core::department_list::{DepartmentList, DepartmentRow, ListView};
pub use crate::core::notification::Notification;
pub use crate::core::role_filter::RoleFilter;
pub use crate::core::tracker::{AsyncState, RequestTracker};
pub use crate::core::wizard::{CreateDepartmentWizard, RolesView, Transition, WizardPhase, WizardStep};
pub use domain::model::{CreateDepartmentDraft, Department, DepartmentUpdate, Envelope, Field, Role};
pub use domain::ports::DepartmentService;
pub use utils::error::{AdminError, Result};
