use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// A user's saved catalog movie (row of the `favorites` join table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, SimpleObject)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    /// Opaque catalog id
    pub movie_id: i64,
}
