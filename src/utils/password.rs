//! bcrypt hashing, run on the blocking pool.

use super::error::AppError;

pub async fn hash_password(plain: &str, cost: u32) -> Result<String, AppError> {
    let plain = plain.to_string();

    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| AppError::HashingError(format!("hashing task failed: {}", e)))?
        .map_err(|e| AppError::HashingError(e.to_string()))
}

/// Constant-time check of `plain` against a stored bcrypt hash.
///
/// A stored value that is not a bcrypt hash simply does not match.
pub async fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    let plain = plain.to_string();
    let hash = hash.to_string();

    let result = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| AppError::HashingError(format!("verify task failed: {}", e)))?;

    match result {
        Ok(valid) => Ok(valid),
        Err(bcrypt::BcryptError::InvalidHash(_))
        | Err(bcrypt::BcryptError::InvalidPrefix(_))
        | Err(bcrypt::BcryptError::InvalidCost(_))
        | Err(bcrypt::BcryptError::InvalidBase64(_)) => Ok(false),
        Err(e) => Err(AppError::HashingError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("secret123", 4).await.unwrap();
        assert_ne!(hash, "secret123");
        assert!(verify_password("secret123", &hash).await.unwrap());
        assert!(!verify_password("secret124", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("secret123", 4).await.unwrap();
        let b = hash_password("secret123", 4).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_garbage_hash_does_not_match() {
        assert!(!verify_password("secret123", "not-a-hash").await.unwrap());
    }
}
