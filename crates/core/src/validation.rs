//! Validation utilities

use crate::error::{CoreError, CoreResult};

/// Validate email format (đơn giản)
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();

    if email.is_empty() {
        return false;
    }

    // Kiểm tra có @ và ít nhất một ký tự trước và sau @
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let domain = &domain[1..];

        !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    } else {
        false
    }
}

/// Field bắt buộc phải có giá trị (không tính whitespace)
pub fn require_non_empty(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Validate nhiều field bắt buộc cùng lúc, trả lỗi ở field đầu tiên bị rỗng
pub fn require_fields(fields: &[(&str, &str)]) -> CoreResult<()> {
    for (field, value) in fields {
        require_non_empty(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ravi@bank.com"));
        assert!(validate_email("user.name@domain.co.in"));
        assert!(!validate_email("invalid"));
        assert!(!validate_email("@domain.com"));
        assert!(!validate_email("user@"));
        assert!(!validate_email("user@domain."));
        assert!(!validate_email("a@b@c.com"));
    }

    #[test]
    fn test_require_fields() {
        assert!(require_fields(&[("name", "Ravi"), ("phone", "98765")]).is_ok());

        let err = require_fields(&[("name", "Ravi"), ("phone", " ")]).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: phone must not be empty");
    }
}
