use crate::database::Database;
use crate::models::{NewUser, User, UserChanges};
use crate::session::Caller;
use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{
    duplicate, valid_email, valid_password, valid_username, INCORRECT_PASSWORD, INVALID_EMAIL,
    PASSWORD_NOT_LONG_ENOUGH, USERNAME_NOT_LONG_ENOUGH, USER_NOT_FOUND,
};
use crate::utils::{AppError, ServiceError, ValidationErrors};

/// The signed-in caller, with favorites. Anonymous callers get `None`.
pub async fn current_user(db: &Database, caller: &Caller) -> Result<Option<User>, AppError> {
    let Some(user_id) = caller.user_id else {
        return Ok(None);
    };

    Ok(db.find_user_with_favorites(user_id).await?)
}

pub async fn list_users(db: &Database) -> Result<Vec<User>, AppError> {
    Ok(db.list_users().await?)
}

/// Fields to check, `None` meaning "not provided".
struct Candidate<'a> {
    email: Option<&'a str>,
    username: Option<&'a str>,
    password: Option<&'a str>,
}

/// Runs the account checks in their fixed order, stopping at the first
/// failure: email uniqueness, username uniqueness, email format, username
/// length, password length. Rows owned by `own_id` don't count as
/// duplicates.
async fn check_candidate(
    db: &Database,
    candidate: &Candidate<'_>,
    own_id: Option<i64>,
) -> Result<(), ServiceError> {
    let taken_by_other = |found: Option<i64>| found.map_or(false, |id| Some(id) != own_id);

    if let Some(email) = candidate.email {
        if taken_by_other(db.user_id_by_email(email).await?) {
            return Err(ValidationErrors::single("email", duplicate("Email")).into());
        }
    }

    if let Some(username) = candidate.username {
        if taken_by_other(db.user_id_by_username(username).await?) {
            return Err(ValidationErrors::single("username", duplicate("Username")).into());
        }
    }

    if let Some(email) = candidate.email {
        if !valid_email(email) {
            return Err(ValidationErrors::single("email", INVALID_EMAIL).into());
        }
    }

    if let Some(username) = candidate.username {
        if !valid_username(username) {
            return Err(ValidationErrors::single("username", USERNAME_NOT_LONG_ENOUGH).into());
        }
    }

    if let Some(password) = candidate.password {
        if !valid_password(password) {
            return Err(ValidationErrors::single("password", PASSWORD_NOT_LONG_ENOUGH).into());
        }
    }

    Ok(())
}

/// Sign-up. The caller is expected to open a session for the returned user.
pub async fn create_user(
    db: &Database,
    input: &NewUser,
    bcrypt_cost: u32,
) -> Result<User, ServiceError> {
    log::info!("📝 createUser - email: {}, username: {}", input.email, input.username);

    let candidate = Candidate {
        email: Some(&input.email),
        username: Some(&input.username),
        password: Some(&input.password),
    };

    if let Err(e) = check_candidate(db, &candidate, None).await {
        log::warn!("❌ createUser rejected: {} - {}", input.email, e);
        return Err(e);
    }

    let hashed = hash_password(&input.password, bcrypt_cost).await?;
    let user = match db.insert_user(&input.email, &input.username, &hashed).await {
        Ok(user) => user,
        Err(e) => {
            if let Some(errors) = duplicate_from_constraint(&e) {
                log::warn!("❌ createUser lost a race: {} - {}", input.email, errors);
                return Err(errors.into());
            }
            log::error!("❌ Failed to create user {}: {}", input.email, e);
            return Err(AppError::from(e).into());
        }
    };

    log::info!("✅ User {} created (id {})", user.email, user.id);
    Ok(user)
}

/// A UNIQUE violation on insert means a concurrent sign-up took the email
/// or username after the checks ran.
fn duplicate_from_constraint(e: &sqlx::Error) -> Option<ValidationErrors> {
    let db_error = e.as_database_error()?;
    if !db_error.is_unique_violation() {
        return None;
    }

    if db_error.message().contains("users.username") {
        Some(ValidationErrors::single("username", duplicate("Username")))
    } else {
        Some(ValidationErrors::single("email", duplicate("Email")))
    }
}

/// Profile update. Persistence problems (and an unknown id) report `false`
/// instead of an error.
pub async fn update_user(
    db: &Database,
    id: i64,
    changes: UserChanges,
    bcrypt_cost: u32,
) -> Result<bool, ServiceError> {
    log::info!("✏️  updateUser - id: {}", id);
    let changes = changes.normalized();

    let user = match db.find_user(id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::warn!("⚠️ updateUser: no user with id {}", id);
            return Ok(false);
        }
        Err(e) => {
            log::error!("❌ updateUser: failed to load user {}: {}", id, e);
            return Ok(false);
        }
    };

    let candidate = Candidate {
        email: changes.email.as_deref(),
        username: changes.username.as_deref(),
        password: changes.password.as_deref(),
    };

    match check_candidate(db, &candidate, Some(user.id)).await {
        Ok(()) => {}
        Err(ServiceError::Invalid(errors)) => {
            log::warn!("❌ updateUser rejected for {}: {}", id, errors);
            return Err(errors.into());
        }
        Err(ServiceError::Internal(e)) => {
            log::error!("❌ updateUser: uniqueness check failed for {}: {}", id, e);
            return Ok(false);
        }
    }

    let new_hash = match changes.password.as_deref() {
        None => None,
        Some(password) if password_unchanged(password, &user.password).await => None,
        Some(password) => match hash_password(password, bcrypt_cost).await {
            Ok(hash) => Some(hash),
            Err(e) => {
                log::error!("❌ updateUser: {}", e);
                return Ok(false);
            }
        },
    };

    match db
        .update_user(
            id,
            changes.email.as_deref(),
            changes.username.as_deref(),
            new_hash.as_deref(),
        )
        .await
    {
        Ok(_) => {
            log::info!("✅ User {} updated", id);
            Ok(true)
        }
        Err(e) => {
            log::error!("❌ Failed to update user {}: {}", id, e);
            Ok(false)
        }
    }
}

/// Clients echo the stored hash back when the password field is untouched;
/// re-entering the current password is also "unchanged".
async fn password_unchanged(provided: &str, stored_hash: &str) -> bool {
    if provided == stored_hash {
        return true;
    }

    verify_password(provided, stored_hash).await.unwrap_or(false)
}

/// Removes the account (favorites cascade). Live sessions are left alone;
/// they simply resolve to no user afterwards.
pub async fn delete_user(db: &Database, id: i64) -> bool {
    log::info!("🗑️  deleteUser - id: {}", id);

    match db.delete_user(id).await {
        Ok(0) => {
            log::warn!("⚠️ deleteUser: no user with id {}", id);
            false
        }
        Ok(_) => {
            log::info!("✅ User {} deleted", id);
            true
        }
        Err(e) => {
            log::error!("❌ Failed to delete user {}: {}", id, e);
            false
        }
    }
}

/// Credential check. Opening the session is left to the caller, so a
/// failure here never creates one.
pub async fn login_user(db: &Database, email: &str, password: &str) -> Result<User, ServiceError> {
    log::info!("🔐 loginUser - email: {}", email);

    let Some(user) = db.find_user_by_email(email).await? else {
        log::warn!("❌ Login failed: {} - unknown email", email);
        return Err(ValidationErrors::single("email", USER_NOT_FOUND).into());
    };

    if !verify_password(password, &user.password).await? {
        log::warn!("❌ Login failed: {} - wrong password", email);
        return Err(ValidationErrors::single("password", INCORRECT_PASSWORD).into());
    }

    let user = User {
        favorites: db.favorites_for_user(user.id).await?,
        ..user
    };

    log::info!("✅ Login successful: {}", email);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_user, test_database, TEST_BCRYPT_COST};

    fn message(result: Result<impl std::fmt::Debug, ServiceError>) -> String {
        match result {
            Err(ServiceError::Invalid(errors)) => errors.first_message().to_string(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_then_login() {
        let db = test_database().await;
        let created = create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();
        assert_ne!(created.password, "secret123");

        let logged_in = login_user(&db, "a@x.com", "secret123").await.unwrap();
        assert_eq!(logged_in.id, created.id);
        assert_eq!(logged_in.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_wins_over_other_problems() {
        let db = test_database().await;
        create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        // every other field is invalid too, the duplicate is reported first
        let result = create_user(&db, &new_user("a@x.com", "al", "123"), TEST_BCRYPT_COST).await;
        assert_eq!(message(result), "Email already taken.");
    }

    #[tokio::test]
    async fn test_checks_run_in_fixed_order() {
        let db = test_database().await;
        create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        let cases = [
            (new_user("b@x.com", "alice", "1"), "Username already taken."),
            (new_user("not-an-email", "al", "1"), "Email is not valid."),
            (new_user("b@x.com", "al", "1"), "Username must be at least 3 characters long."),
            (new_user("b@x.com", "bob", "1"), "Password must be at least 6 characters long."),
        ];

        for (input, expected) in cases {
            let result = create_user(&db, &input, TEST_BCRYPT_COST).await;
            assert_eq!(message(result), expected);
        }

        assert_eq!(list_users(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_duplicate_message() {
        let db = test_database().await;
        db.insert_user("a@x.com", "alice", "hash").await.unwrap();

        let email_clash = db.insert_user("a@x.com", "other", "hash").await.unwrap_err();
        let errors = duplicate_from_constraint(&email_clash).unwrap();
        assert_eq!(errors.errors()[0].field, "email");
        assert_eq!(errors.first_message(), "Email already taken.");

        let username_clash = db.insert_user("b@x.com", "alice", "hash").await.unwrap_err();
        let errors = duplicate_from_constraint(&username_clash).unwrap();
        assert_eq!(errors.errors()[0].field, "username");
        assert_eq!(errors.first_message(), "Username already taken.");

        assert!(duplicate_from_constraint(&sqlx::Error::RowNotFound).is_none());
    }

    #[tokio::test]
    async fn test_login_failures() {
        let db = test_database().await;
        create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        let unknown = login_user(&db, "nobody@x.com", "secret123").await;
        assert_eq!(message(unknown), "This user doesn't exist.");

        let wrong = login_user(&db, "a@x.com", "wrong-password").await;
        assert_eq!(message(wrong), "Incorrect password.");
    }

    #[tokio::test]
    async fn test_current_user() {
        let db = test_database().await;
        let user = create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        assert_eq!(current_user(&db, &Caller::anonymous()).await.unwrap(), None);

        let caller = Caller {
            session_id: None,
            user_id: Some(user.id),
        };
        let current = current_user(&db, &caller).await.unwrap().unwrap();
        assert_eq!(current.username, "alice");
    }

    #[tokio::test]
    async fn test_update_with_own_values_passes_uniqueness() {
        let db = test_database().await;
        let user = create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some("a@x.com".into()),
            username: Some("alice".into()),
            password: Some(user.password.clone()),
        };
        assert!(update_user(&db, user.id, changes, TEST_BCRYPT_COST).await.unwrap());

        // stored hash echoed back: the password is untouched
        let reloaded = db.find_user(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password, user.password);
        assert!(login_user(&db, "a@x.com", "secret123").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejects_other_users_email() {
        let db = test_database().await;
        create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();
        let bob = create_user(&db, &new_user("b@x.com", "bob", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        let result = update_user(&db, bob.id, changes, TEST_BCRYPT_COST).await;
        assert_eq!(message(result), "Email already taken.");
    }

    #[tokio::test]
    async fn test_update_changes_password() {
        let db = test_database().await;
        let user = create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        let changes = UserChanges {
            email: Some(String::new()),
            username: Some("alicia".into()),
            password: Some("brand-new-pass".into()),
        };
        assert!(update_user(&db, user.id, changes, TEST_BCRYPT_COST).await.unwrap());

        assert!(login_user(&db, "a@x.com", "secret123").await.is_err());
        let user = login_user(&db, "a@x.com", "brand-new-pass").await.unwrap();
        assert_eq!(user.username, "alicia");
    }

    #[tokio::test]
    async fn test_update_unknown_user_reports_false() {
        let db = test_database().await;
        let result = update_user(&db, 999, UserChanges::default(), TEST_BCRYPT_COST).await;
        assert!(!result.unwrap());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let db = test_database().await;
        let user = create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();

        assert!(delete_user(&db, user.id).await);
        assert!(!delete_user(&db, user.id).await);
        assert!(db.find_user(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_failure_reports_false() {
        let db = test_database().await;
        let user = create_user(&db, &new_user("a@x.com", "alice", "secret123"), TEST_BCRYPT_COST)
            .await
            .unwrap();
        db.close().await;

        assert!(!delete_user(&db, user.id).await);
        let changes = UserChanges {
            username: Some("alicia".into()),
            ..Default::default()
        };
        assert!(!update_user(&db, user.id, changes, TEST_BCRYPT_COST).await.unwrap());
    }
}
