//! # Credential Rules
//!
//! Password digests and the account rules that do not need storage.
//!
//! Digests are unsalted SHA-256 in lowercase hex. That is fast and
//! deterministic, which is enough for a single-site deployment and
//! nothing more.

use sha2::{Digest, Sha256};

use crate::authz::Role;
use crate::error::{CoreError, CoreResult};
use crate::MIN_PASSWORD_LEN;

/// Hex SHA-256 of the password.
///
/// ```rust
/// use depot_core::credentials::hash_password;
///
/// assert_eq!(hash_password("admin123"), hash_password("admin123"));
/// assert_eq!(hash_password("admin123").len(), 64);
/// ```
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compares the digest of `password` with a stored digest.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

pub fn validate_new_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Refuses to remove the only remaining admin.
///
/// `admin_count` is the number of admin accounts currently stored,
/// including the target.
pub fn check_user_deletion(target_role: Role, admin_count: usize) -> CoreResult<()> {
    if target_role == Role::Admin && admin_count <= 1 {
        return Err(CoreError::LastAdminProtected);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic_hex() {
        let first = hash_password("worker123");
        let second = hash_password("worker123");
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, hash_password("worker124"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_password("manager123");
        assert!(verify_password("manager123", &stored));
        assert!(!verify_password("Manager123", &stored));
    }

    #[test]
    fn test_password_length() {
        assert!(validate_new_password("secret").is_ok());
        assert_eq!(
            validate_new_password("12345").unwrap_err(),
            CoreError::PasswordTooShort { min: 6 }
        );
    }

    #[test]
    fn test_last_admin_protected() {
        assert_eq!(
            check_user_deletion(Role::Admin, 1).unwrap_err(),
            CoreError::LastAdminProtected
        );
        assert!(check_user_deletion(Role::Admin, 2).is_ok());
        assert!(check_user_deletion(Role::Worker, 1).is_ok());
        assert!(check_user_deletion(Role::Manager, 0).is_ok());
    }
}
