//! Account password rules and bcrypt hashing

use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_PASSWORD_CHARS: usize = 72;

/// Checks a new account password against the sign-up rules.
///
/// bcrypt only reads the first 72 bytes, so anything longer is refused rather
/// than silently truncated. The password may not contain the mailbox name of
/// the account's own email.
pub fn validate_password(password: &str, email: &str) -> AppResult<()> {
    let chars = password.chars().count();
    if chars < MIN_PASSWORD_CHARS {
        return Err(AppError::ValidationError(format!(
            "Your Ofertivo password needs at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_CHARS {
        return Err(AppError::ValidationError(format!(
            "Your Ofertivo password can be at most {MAX_PASSWORD_CHARS} bytes long"
        )));
    }

    let missing: Vec<&str> = [
        (password.chars().any(char::is_lowercase), "a lowercase letter"),
        (password.chars().any(char::is_uppercase), "an uppercase letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "a digit"),
    ]
    .into_iter()
    .filter_map(|(present, label)| (!present).then_some(label))
    .collect();
    if !missing.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Password is missing {}",
            missing.join(" and ")
        )));
    }

    let mailbox = email.split('@').next().unwrap_or_default();
    if mailbox.len() >= 3 && password.to_lowercase().contains(&mailbox.to_lowercase()) {
        return Err(AppError::ValidationError(
            "Password must not contain your email name".to_string(),
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "ana@example.com";

    fn message(result: AppResult<()>) -> String {
        match result {
            Err(AppError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123", EMAIL).is_ok());
        assert!(validate_password("Pass123", EMAIL).is_err());
        assert!(validate_password(&format!("Aa1{}", "x".repeat(70)), EMAIL).is_err());
    }

    #[test]
    fn test_missing_classes_are_named() {
        assert_eq!(
            message(validate_password("password123", EMAIL)),
            "Password is missing an uppercase letter"
        );
        assert_eq!(
            message(validate_password("password", EMAIL)),
            "Password is missing an uppercase letter and a digit"
        );
    }

    #[test]
    fn test_password_may_not_contain_mailbox() {
        assert!(validate_password("AnaRocks2026", EMAIL).is_err());
        assert!(validate_password("AnaRocks2026", "shop@example.com").is_ok());
        // two-letter mailboxes are too common to match against
        assert!(validate_password("JoJo12345", "jo@example.com").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "Password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("WrongPassword", &hashed).unwrap());
    }
}
