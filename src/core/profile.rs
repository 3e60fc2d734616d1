//! User profile business logic.
//!
//! Profiles mirror the identity provider: `user_id` is the provider's subject
//! id, and the upsert refreshes only the identity fields (name, avatar,
//! expertise). The counter fields (`points`, `deals_count`) and the premium
//! flag belong to the transactional operations and survive every upsert
//! untouched. Deals keep their own denormalized copies of these fields, so a
//! profile edit does not rewrite existing deals.

use crate::{
    entities::{UserProfile, user_profile},
    errors::{Error, Result},
};
use sea_orm::{Set, SqlErr, prelude::*};

/// Creates the profile on first sign-in, or refreshes the identity fields on
/// a later one.
pub async fn upsert_profile(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    avatar_url: &str,
    expertise: &str,
) -> Result<user_profile::Model> {
    match UserProfile::find_by_id(user_id).one(db).await? {
        Some(profile) => refresh_identity(db, profile, name, avatar_url, expertise).await,
        None => insert_profile(db, user_id, name, avatar_url, expertise).await,
    }
}

async fn insert_profile(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    avatar_url: &str,
    expertise: &str,
) -> Result<user_profile::Model> {
    let fresh = user_profile::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        avatar_url: Set(avatar_url.to_string()),
        expertise: Set(expertise.to_string()),
        points: Set(0),
        deals_count: Set(0),
        is_premium: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    match fresh.insert(db).await {
        Ok(profile) => Ok(profile),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // A concurrent first sign-in inserted the row between the
            // existence check and here. Converge on the update path.
            let existing = UserProfile::find_by_id(user_id)
                .one(db)
                .await?
                .ok_or_else(|| Error::Conflict {
                    message: format!("profile '{user_id}' vanished during retry"),
                })?;
            refresh_identity(db, existing, name, avatar_url, expertise).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn refresh_identity(
    db: &DatabaseConnection,
    profile: user_profile::Model,
    name: &str,
    avatar_url: &str,
    expertise: &str,
) -> Result<user_profile::Model> {
    let mut active: user_profile::ActiveModel = profile.into();
    active.name = Set(name.to_string());
    active.avatar_url = Set(avatar_url.to_string());
    active.expertise = Set(expertise.to_string());
    active.update(db).await.map_err(Into::into)
}

/// Retrieves a profile by its identity-provider id.
pub async fn get_profile(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Option<user_profile::Model>> {
    UserProfile::find_by_id(user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use sea_orm::sea_query::Expr;

    #[tokio::test]
    async fn test_upsert_creates_fresh_profile() -> Result<()> {
        let db = setup_test_db().await?;

        let profile = upsert_profile(&db, "u1", "Ada", "https://a.test/u1.png", "Backend").await?;
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.points, 0);
        assert_eq!(profile.deals_count, 0);
        assert!(!profile.is_premium);

        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_refreshes_identity_but_keeps_counters() -> Result<()> {
        let db = setup_test_db().await?;

        upsert_profile(&db, "u1", "Ada", "https://a.test/u1.png", "Backend").await?;

        // Simulate earned points and a closed deal between sign-ins.
        UserProfile::update_many()
            .col_expr(user_profile::Column::Points, Expr::value(70))
            .col_expr(user_profile::Column::DealsCount, Expr::value(2))
            .filter(user_profile::Column::UserId.eq("u1"))
            .exec(&db)
            .await?;

        let updated = upsert_profile(&db, "u1", "Ada L.", "https://a.test/new.png", "ML").await?;
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.avatar_url, "https://a.test/new.png");
        assert_eq!(updated.expertise, "ML");
        assert_eq!(updated.points, 70);
        assert_eq!(updated.deals_count, 2);

        let count = UserProfile::find().all(&db).await?.len();
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_losing_first_sign_in_race_converges_on_update() -> Result<()> {
        let db = setup_test_db().await?;
        upsert_profile(&db, "u1", "Ada", "https://a.test/u1.png", "Backend").await?;

        // A racing first sign-in whose existence check ran before the row
        // landed takes the insert path against an existing primary key.
        let converged = insert_profile(&db, "u1", "Ada L.", "https://a.test/new.png", "ML").await?;
        assert_eq!(converged.name, "Ada L.");
        assert_eq!(converged.expertise, "ML");

        let count = UserProfile::find().all(&db).await?.len();
        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_profile_missing_is_none() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_profile(&db, "ghost").await?.is_none());
        Ok(())
    }
}
