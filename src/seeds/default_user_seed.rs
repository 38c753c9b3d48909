use crate::database::Database;
use crate::utils::password::hash_password;

pub const DEFAULT_EMAIL: &str = "user@example.com";
pub const DEFAULT_USERNAME: &str = "Pierre";
pub const DEFAULT_PASSWORD: &str = "user";

/// Inserts the demo account unless a user with its email already exists.
/// Goes straight to the store: the demo password is shorter than sign-up allows.
pub async fn seed_default_user(db: &Database, bcrypt_cost: u32) {
    match db.user_id_by_email(DEFAULT_EMAIL).await {
        Ok(Some(_)) => {
            log::info!("👤 Demo user already present, skipping seed");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("❌ Failed to look up demo user: {}", e);
            return;
        }
    }

    let hash = match hash_password(DEFAULT_PASSWORD, bcrypt_cost).await {
        Ok(hash) => hash,
        Err(e) => {
            log::error!("❌ Failed to hash demo user password: {}", e);
            return;
        }
    };

    match db.insert_user(DEFAULT_EMAIL, DEFAULT_USERNAME, &hash).await {
        Ok(user) => log::info!("   ✅ Seeded demo user {} (id {})", user.email, user.id),
        Err(e) => log::error!("   ❌ Failed to seed demo user: {}", e),
    }
}
