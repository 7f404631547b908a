//! Validation helpers shared by every config section

pub use crate::error::ValidationError;

/// A section of `config.toml`
///
/// Adding a section means implementing this trait and adding a field to
/// [`crate::Config`].
pub trait ConfigSection: Default {
    /// Returns every problem found, not just the first
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Overwrites this section with `other`
    fn merge(&mut self, other: Self);

    /// TOML table name
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a numeric value is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        // Written so that NaN fails too
        if value >= min && value <= max {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        }
    }

    /// Validates that a string is not empty
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Validates an absolute http(s) URL
    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
            _ => Err(ValidationError::with_value(
                field,
                "must be an absolute http(s) URL",
                value,
            )),
        }
    }

    /// Validates a path component such as `/api/stories`
    pub fn root_relative(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.starts_with('/') && !value.starts_with("//") {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                "must start with a single '/'",
                value,
            ))
        }
    }

    /// Collects multiple validation results into a single result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range() {
        assert!(Validator::in_range(0.8, 0.0, 1.0, "test").is_ok());
        assert!(Validator::in_range(0.0, 0.0, 1.0, "test").is_ok());
        assert!(Validator::in_range(1.5, 0.0, 1.0, "test").is_err());
        assert!(Validator::in_range(f64::NAN, 0.0, 1.0, "test").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::not_empty("info", "test").is_ok());
        assert!(Validator::not_empty("   ", "test").is_err());
    }

    #[test]
    fn test_http_url() {
        assert!(Validator::http_url("http://localhost:5000", "test").is_ok());
        assert!(Validator::http_url("https://stories.example.com/", "test").is_ok());
        assert!(Validator::http_url("ftp://example.com", "test").is_err());
        assert!(Validator::http_url("/api", "test").is_err());
    }

    #[test]
    fn test_root_relative() {
        assert!(Validator::root_relative("/api/stories", "test").is_ok());
        assert!(Validator::root_relative("api/stories", "test").is_err());
        assert!(Validator::root_relative("//evil.com", "test").is_err());
    }

    #[test]
    fn test_collect_errors_some_err() {
        let results = vec![
            Ok(()),
            Err(ValidationError::new("field1", "error1")),
            Ok(()),
            Err(ValidationError::new("field2", "error2")),
        ];
        let result = Validator::collect_errors(results);
        assert_eq!(result.unwrap_err().len(), 2);
    }
}
