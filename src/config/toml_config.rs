use crate::adapters::memory::Catalog;
use crate::domain::model::{Department, Role, MAX_DESCRIPTION_CHARS};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{
    validate_max_chars, validate_one_of, validate_positive_number, validate_required,
    validate_unique_ids, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["compact", "json"];
const SEEDS: [&str; 2] = ["default", "empty"];
const MAX_AUTO_CLOSE_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub auto_close: Option<bool>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub seed: Option<String>,
    pub roles: Option<Vec<Role>>,
    pub departments: Option<Vec<SeedDepartment>>,
}

/// 設定檔中的部門，角色以 id 參照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDepartment {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AdminConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdminError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DEPT_ADMIN_LOG_LEVEL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdminError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("info")
    }

    pub fn log_format(&self) -> &str {
        self.logging.format.as_deref().unwrap_or("compact")
    }

    /// 成功通知的自動關閉時間；關閉自動關閉時為 `None`
    pub fn auto_close(&self) -> Option<chrono::Duration> {
        if !self.notification.auto_close.unwrap_or(true) {
            return None;
        }
        let millis = self
            .notification
            .duration_ms
            .unwrap_or(5000)
            .min(MAX_AUTO_CLOSE_MS);
        Some(chrono::Duration::milliseconds(millis as i64))
    }

    /// 依設定建立初始資料：先選擇內建種子，再以設定檔中的角色與部門覆蓋
    pub fn build_catalog(&self) -> Result<Catalog> {
        let mut catalog = match self.catalog.seed.as_deref().unwrap_or("default") {
            "empty" => Catalog::empty(),
            _ => Catalog::default_seed(),
        };

        if let Some(roles) = &self.catalog.roles {
            catalog.roles = roles.clone();
            // 角色目錄被替換時，內建部門的角色參照不再可靠
            if self.catalog.departments.is_none() {
                catalog.departments.clear();
            }
        }

        if let Some(departments) = &self.catalog.departments {
            catalog.departments = departments
                .iter()
                .map(|seed| resolve_department(seed, &catalog.roles))
                .collect::<Result<Vec<_>>>()?;
        }

        Ok(catalog)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_one_of("logging.level", self.log_level(), &LOG_LEVELS)?;
        validate_one_of("logging.format", self.log_format(), &LOG_FORMATS)?;

        if self.notification.auto_close.unwrap_or(true) {
            if let Some(duration_ms) = self.notification.duration_ms {
                validate_positive_number("notification.duration_ms", duration_ms, 1)?;
                if duration_ms > MAX_AUTO_CLOSE_MS {
                    return Err(AdminError::InvalidConfigValueError {
                        field: "notification.duration_ms".to_string(),
                        value: duration_ms.to_string(),
                        reason: format!("Value must be at most {}", MAX_AUTO_CLOSE_MS),
                    });
                }
            }
        }

        if let Some(seed) = &self.catalog.seed {
            validate_one_of("catalog.seed", seed, &SEEDS)?;
        }

        if let Some(roles) = &self.catalog.roles {
            validate_unique_ids("catalog.roles.id", roles.iter().map(|r| r.id.as_str()))?;
        }

        if let Some(departments) = &self.catalog.departments {
            validate_unique_ids(
                "catalog.departments.id",
                departments.iter().map(|d| d.id.as_str()),
            )?;
            for department in departments {
                validate_required(
                    "catalog.departments.name",
                    &department.name,
                    "Department name is required",
                )?;
                validate_max_chars(
                    "catalog.departments.description",
                    &department.description,
                    MAX_DESCRIPTION_CHARS,
                )?;
            }
        }

        self.build_catalog().map(|_| ())
    }
}

fn resolve_department(seed: &SeedDepartment, roles: &[Role]) -> Result<Department> {
    let resolved = seed
        .roles
        .iter()
        .map(|role_id| {
            roles
                .iter()
                .find(|role| &role.id == role_id)
                .cloned()
                .ok_or_else(|| AdminError::InvalidConfigValueError {
                    field: format!("catalog.departments[{}].roles", seed.id),
                    value: role_id.clone(),
                    reason: "Unknown role id".to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Department {
        id: seed.id.clone(),
        name: seed.name.clone(),
        description: seed.description.clone(),
        roles: resolved,
    })
}

impl Validate for AdminConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AdminConfig::from_toml_str("").unwrap();

        assert_eq!(config.log_level(), "info");
        assert_eq!(config.log_format(), "compact");
        assert_eq!(config.auto_close(), Some(chrono::Duration::milliseconds(5000)));
        assert!(config.validate().is_ok());

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.roles.len(), 10);
        assert_eq!(catalog.departments.len(), 5);
    }

    #[test]
    fn test_custom_catalog() {
        let toml_content = r#"
[notification]
auto_close = false

[catalog]
seed = "empty"

[[catalog.roles]]
id = "r1"
name = "Site Reliability Engineer"
department = "Engineering"

[[catalog.roles]]
id = "r2"
name = "Recruiter"
department = "People"

[[catalog.departments]]
id = "d1"
name = "Platform"
description = "Keeps the lights on"
roles = ["r1"]
"#;

        let config = AdminConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.auto_close(), None);

        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.roles.len(), 2);
        assert_eq!(catalog.departments[0].roles[0].name, "Site Reliability Engineer");
    }

    #[test]
    fn test_unknown_role_reference_is_rejected() {
        let toml_content = r#"
[[catalog.departments]]
id = "d1"
name = "Platform"
description = "Keeps the lights on"
roles = ["missing"]
"#;
        let config = AdminConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(AdminError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        let config = AdminConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DEPT_ADMIN_TEST_LEVEL", "debug");

        let config =
            AdminConfig::from_toml_str("[logging]\nlevel = \"${DEPT_ADMIN_TEST_LEVEL}\"\n").unwrap();
        assert_eq!(config.log_level(), "debug");

        std::env::remove_var("DEPT_ADMIN_TEST_LEVEL");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[catalog]\nseed = \"empty\"\n")
            .unwrap();

        let config = AdminConfig::from_file(temp_file.path()).unwrap();
        assert!(config.build_catalog().unwrap().roles.is_empty());
    }
}
