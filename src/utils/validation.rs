use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// sqlx 接受 `sqlite::memory:` 與 `sqlite://path` 兩種寫法
pub fn validate_database_url(field_name: &str, url_str: &str) -> Result<()> {
    validate_non_empty_string(field_name, url_str)?;

    if url_str.starts_with("sqlite:") {
        return Ok(());
    }

    Err(EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: "Only sqlite: database URLs are supported".to_string(),
    })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("sources.kegg_base_url", "https://rest.kegg.jp").is_ok());
        assert!(validate_url("sources.kegg_base_url", "http://rest.kegg.jp").is_ok());
        assert!(validate_url("sources.kegg_base_url", "").is_err());
        assert!(validate_url("sources.kegg_base_url", "invalid-url").is_err());
        assert!(validate_url("sources.kegg_base_url", "ftp://rest.kegg.jp").is_err());
    }

    #[test]
    fn test_validate_database_url() {
        assert!(validate_database_url("database.url", "sqlite::memory:").is_ok());
        assert!(validate_database_url("database.url", "sqlite://metanetx.db").is_ok());
        assert!(validate_database_url("database.url", "postgres://localhost/mnx").is_err());
        assert!(validate_database_url("database.url", "  ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("etl.batch_size", 5, 1).is_ok());
        assert!(validate_positive_number("etl.batch_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("sources.timeout_seconds", 30, 1, 600).is_ok());
        assert!(validate_range("sources.timeout_seconds", 0, 1, 600).is_err());
    }
}
