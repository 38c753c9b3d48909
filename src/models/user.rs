use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use super::favorite::Favorite;

/// Row of the `users` table plus, when loaded, the user's favorites.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, SimpleObject)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// bcrypt hash, never exposed through the API
    #[serde(skip_serializing)]
    #[graphql(skip)]
    pub password: String,
    #[sqlx(skip)]
    #[graphql(name = "movies")]
    pub favorites: Vec<Favorite>,
}

impl User {
    pub fn has_favorite(&self, movie_id: i64) -> bool {
        self.favorites.iter().any(|f| f.movie_id == movie_id)
    }

    /// Appends to the in-memory favorites list, keeping one entry per movie.
    pub fn push_favorite(&mut self, favorite: Favorite) {
        if !self.has_favorite(favorite.movie_id) {
            self.favorites.push(favorite);
        }
    }
}

/// Input of `createUser`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Input of `updateUser`; `None` (or an empty string) leaves the column as is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UserChanges {
    /// Drops empty strings, which clients send for "unchanged".
    pub fn normalized(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            email: keep(self.email),
            username: keep(self.username),
            password: keep(self.password),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            email: "a@x.com".into(),
            username: "alice".into(),
            password: "$2b$04$hash".into(),
            favorites: vec![],
        }
    }

    #[test]
    fn test_push_favorite_appends_once() {
        let mut user = user();
        user.push_favorite(Favorite { id: 1, user_id: 1, movie_id: 603 });
        user.push_favorite(Favorite { id: 2, user_id: 1, movie_id: 604 });
        user.push_favorite(Favorite { id: 1, user_id: 1, movie_id: 603 });

        let ids: Vec<i64> = user.favorites.iter().map(|f| f.movie_id).collect();
        assert_eq!(ids, vec![603, 604]);
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "a@x.com");
    }

    #[test]
    fn test_changes_drop_empty_strings() {
        let changes = UserChanges {
            email: Some(String::new()),
            username: Some("bob".into()),
            password: None,
        }
        .normalized();

        assert_eq!(changes.email, None);
        assert_eq!(changes.username.as_deref(), Some("bob"));
        assert_eq!(changes.password, None);
    }
}
