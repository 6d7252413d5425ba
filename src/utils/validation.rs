use crate::utils::error::{AdminError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 欄位去除空白後不可為空，失敗時回傳表單使用的錯誤訊息
pub fn validate_required(field_name: &str, value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(field_name, message));
    }
    Ok(())
}

pub fn validate_max_chars(field_name: &str, value: &str, max_chars: usize) -> Result<()> {
    let count = value.chars().count();
    if count > max_chars {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{} characters", count),
            reason: format!("Value must be at most {} characters", max_chars),
        });
    }
    Ok(())
}

/// 依字元（非位元組）截斷字串，對應輸入框的 maxLength 行為
pub fn clamp_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value.to_string(),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(AdminError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Unsupported value. Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_unique_ids<'a, I>(field_name: &str, ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(AdminError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: id.to_string(),
                reason: "Identifier cannot be empty or whitespace-only".to_string(),
            });
        }
        if !seen.insert(id) {
            return Err(AdminError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: id.to_string(),
                reason: "Duplicate identifier".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("name", "Engineering", "required").is_ok());
        assert!(validate_required("name", "", "required").is_err());
        assert!(validate_required("name", "   \t", "required").is_err());
    }

    #[test]
    fn test_clamp_chars_counts_characters() {
        assert_eq!(clamp_chars("abcdef", 3), "abc");
        assert_eq!(clamp_chars("ab", 3), "ab");
        assert_eq!(clamp_chars("部門管理系統", 2), "部門");
    }

    #[test]
    fn test_validate_max_chars() {
        assert!(validate_max_chars("description", "abc", 3).is_ok());
        assert!(validate_max_chars("description", "abcd", 3).is_err());
    }

    #[test]
    fn test_validate_unique_ids() {
        assert!(validate_unique_ids("catalog.roles", ["1", "2"]).is_ok());
        assert!(validate_unique_ids("catalog.roles", ["1", "1"]).is_err());
        assert!(validate_unique_ids("catalog.roles", ["1", " "]).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        assert!(validate_one_of("logging.format", "json", &["compact", "json"]).is_ok());
        assert!(validate_one_of("logging.format", "xml", &["compact", "json"]).is_err());
    }
}
