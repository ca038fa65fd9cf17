// Password hashing utilities
// Uses bcrypt for secure password hashing

use bcrypt::{hash, verify};

/// Hashes a password using bcrypt
///
/// # Arguments
/// * `password` - The plaintext password to hash
/// * `cost` - bcrypt work factor (`bcrypt::DEFAULT_COST` in production)
///
/// # Example
/// ```
/// use fantasy_cricket_api::auth::password::hash_password;
///
/// let hash = hash_password("My_password1", 4).expect("valid hash");
/// ```
pub fn hash_password(password: &str, cost: u32) -> Result<String, String> {
    hash(password, cost).map_err(|e| e.to_string())
}

/// Verifies a password against a bcrypt hash
///
/// # Returns
/// * `Ok(bool)` - True if password matches, false otherwise
/// * `Err(String)` - If the stored hash is malformed
///
/// # Example
/// ```
/// use fantasy_cricket_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("My_password1", 4).unwrap();
/// let valid = verify_password("My_password1", &hash).unwrap();
/// assert!(valid);
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    verify(password, hash).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_and_verify_password() {
        let password = "Test_password_123";
        let hash = hash_password(password, TEST_COST).expect("valid hash");

        let valid = verify_password(password, &hash).expect("valid verification");
        assert!(valid);
    }

    #[test]
    fn verify_wrong_password() {
        let hash = hash_password("Test_password_123", TEST_COST).expect("valid hash");

        let valid = verify_password("wrong_password", &hash).expect("valid verification");
        assert!(!valid);
    }

    #[test]
    fn hash_different_outputs() {
        let password = "Test_password_123";
        let hash1 = hash_password(password, TEST_COST).expect("valid hash");
        let hash2 = hash_password(password, TEST_COST).expect("valid hash");

        // Salted
        assert_ne!(hash1, hash2);
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }
}
