/// Password hashing module using Argon2id
///
/// Passwords are hashed with Argon2id using fixed parameters and a random
/// per-password salt. The resulting PHC string embeds the algorithm,
/// parameters and salt, so verification needs nothing but the stored hash.
///
/// # Parameters
///
/// - **Memory**: 19 MiB (19456 KiB)
/// - **Iterations**: 2 passes
/// - **Parallelism**: 1 lane
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Sup3r$ecret")?;
///
/// assert!(verify_password("Sup3r$ecret", &hash)?);
/// assert!(!verify_password("wrong", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Memory cost in KiB
const M_COST: u32 = 19_456;

/// Number of passes
const T_COST: u32 = 2;

/// Degree of parallelism
const P_COST: u32 = 1;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(M_COST)
        .t_cost(T_COST)
        .p_cost(P_COST)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id
///
/// Returns a PHC string such as
/// `$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// Comparison is constant-time. Parameters are read from the hash itself.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored hash cannot be parsed
/// or carries no hash output, or `PasswordError::VerifyError` for any other
/// verification failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash("Hash output is missing".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Validates password strength
///
/// A password must:
/// - be at least 6 characters long
/// - contain an ASCII lowercase letter
/// - contain an ASCII uppercase letter
/// - contain a character outside `[A-Za-z0-9_]`
///
/// # Example
///
/// ```
/// use tasktrack_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("Admin@123").is_ok());
/// assert!(validate_password_strength("A@b").is_err());
/// assert!(validate_password_strength("Password123").is_err());
/// ```
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !password.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_')) {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=19456"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").expect("Hash 1 should succeed");
        let hash2 = hash_password("same_password").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("correct_password").expect("Hash should succeed");

        assert!(verify_password("correct_password", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_password").expect("Hash should succeed");

        assert!(!verify_password("wrong_password", &hash).expect("Verify should succeed"));
        assert!(!verify_password("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(matches!(
            verify_password("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_verify_password_hash_without_output() {
        let hash = hash_password("correct_password").expect("Hash should succeed");
        let (params, _) = hash.rsplit_once('$').expect("PHC string has segments");

        assert!(matches!(
            verify_password("correct_password", params),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_unicode_password_roundtrip() {
        let password = "unicode-密码-パスワード";
        let hash = hash_password(password).expect("Hash should succeed");

        assert!(verify_password(password, &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_validate_password_strength_valid() {
        for password in ["Admin@123", "Password@123", "aB#def", "S3cur3$Password"] {
            assert!(
                validate_password_strength(password).is_ok(),
                "Password '{}' should be valid",
                password
            );
        }
    }

    #[test]
    fn test_validate_password_strength_too_short() {
        let err = validate_password_strength("aB#de").unwrap_err();
        assert!(err.contains("at least 6 characters"));
    }

    #[test]
    fn test_validate_password_strength_missing_classes() {
        assert!(validate_password_strength("UPPER@123")
            .unwrap_err()
            .contains("lowercase"));
        assert!(validate_password_strength("lower@123")
            .unwrap_err()
            .contains("uppercase"));
        assert!(validate_password_strength("NoSpecial123")
            .unwrap_err()
            .contains("special character"));
    }

    #[test]
    fn test_validate_password_strength_character_classes_are_ascii() {
        assert!(validate_password_strength("Abc_def")
            .unwrap_err()
            .contains("special character"));
        assert!(validate_password_strength("Abcdéf").is_ok());
        assert!(validate_password_strength("Àbc@déf")
            .unwrap_err()
            .contains("uppercase"));
        assert!(validate_password_strength("ABC@éèê")
            .unwrap_err()
            .contains("lowercase"));
    }
}
