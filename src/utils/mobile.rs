use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

/// Strips everything but digits, matching whatever format the client sends
/// ("+91 90000-00001" and "9000000001" resolve to the same user).
pub fn normalize_mobile(mobile: &str) -> String {
    mobile.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_mobile(mobile: &str) -> AppResult<()> {
    if mobile.is_empty() {
        return Err(AppError::ValidationError(
            "Mobile number is required".to_string(),
        ));
    }
    Ok(())
}

fn aadhaar_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("valid aadhaar pattern"))
}

pub fn validate_aadhaar(aadhaar: &str) -> AppResult<()> {
    if !aadhaar_regex().is_match(aadhaar) {
        return Err(AppError::ValidationError(
            "Aadhaar must be a 12-digit number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_non_digits() {
        assert_eq!(normalize_mobile("+91 90000-00001"), "919000000001");
        assert_eq!(normalize_mobile("9000000001"), "9000000001");
        assert_eq!(normalize_mobile("abc"), "");
    }

    #[test]
    fn test_validate_mobile_rejects_empty() {
        assert!(validate_mobile("").is_err());
        assert!(validate_mobile("9000000001").is_ok());
    }

    #[test]
    fn test_validate_aadhaar() {
        assert!(validate_aadhaar("123456789012").is_ok());
        assert!(validate_aadhaar("12345678901").is_err());
        assert!(validate_aadhaar("1234567890123").is_err());
        assert!(validate_aadhaar("12345678901a").is_err());
    }
}
