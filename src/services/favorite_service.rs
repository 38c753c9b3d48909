use crate::database::Database;
use crate::models::Favorite;

/// Saves `movie_id` for `user_id` and returns the row.
///
/// `None` when the user doesn't exist or the store fails; the failure is
/// logged, not raised.
pub async fn append_favorite(db: &Database, movie_id: i64, user_id: i64) -> Option<Favorite> {
    log::info!("⭐ appendMovie - movie {} for user {}", movie_id, user_id);

    let mut user = match db.find_user_with_favorites(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::warn!("⚠️ appendMovie: no user with id {}", user_id);
            return None;
        }
        Err(e) => {
            log::error!("❌ appendMovie: failed to load user {}: {}", user_id, e);
            return None;
        }
    };

    let favorite = match db.insert_favorite(user_id, movie_id).await {
        Ok(favorite) => favorite,
        Err(e) => {
            log::error!("❌ Failed to save movie {} for user {}: {}", movie_id, user_id, e);
            return None;
        }
    };

    user.push_favorite(favorite.clone());
    log::info!(
        "✅ Movie {} saved, user {} now has {} favorites",
        movie_id,
        user_id,
        user.favorites.len()
    );

    Some(favorite)
}

/// Deletes every favorite row for `movie_id`, whichever user owns it.
// TODO: scope to the calling user once clients send it; today any caller
// un-favorites the movie for everyone.
pub async fn remove_favorite(db: &Database, movie_id: i64) -> bool {
    log::info!("🗑️  dettachMovie - movie {}", movie_id);

    match db.delete_favorites_by_movie(movie_id).await {
        Ok(removed) => {
            log::info!("✅ Movie {} removed from {} favorites", movie_id, removed);
            true
        }
        Err(e) => {
            log::error!("❌ Failed to remove movie {}: {}", movie_id, e);
            false
        }
    }
}
