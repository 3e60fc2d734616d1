//! Content item business logic.
//!
//! Publishing an item and granting the creator's publish points happen in one
//! transaction, so an item never exists without its points and points are
//! never granted for an item that failed to insert.

use crate::{
    core::points,
    entities::{ContentItem, ItemType, UserProfile, content_item, user_profile},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Publishes a new content item and grants the creator the publish points for
/// its type (problems 50, businesses 30, everything else 0).
pub async fn create_content_item(
    db: &DatabaseConnection,
    creator_id: &str,
    title: &str,
    description: &str,
    item_type: ItemType,
) -> Result<content_item::Model> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::Config {
            message: "Item title cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let creator = UserProfile::find_by_id(creator_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            user_id: creator_id.to_string(),
        })?;

    let item = content_item::ActiveModel {
        creator_id: Set(creator.user_id.clone()),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        item_type: Set(item_type.as_str().to_string()),
        upvotes: Set(0),
        interested_investors_count: Set(0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let award = points::creation_points_for(item_type);
    if award != 0 {
        UserProfile::update_many()
            .col_expr(
                user_profile::Column::Points,
                Expr::col(user_profile::Column::Points).add(award),
            )
            .filter(user_profile::Column::UserId.eq(creator.user_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    Ok(item)
}

/// Retrieves a content item by id.
pub async fn get_item(db: &DatabaseConnection, item_id: i64) -> Result<Option<content_item::Model>> {
    ContentItem::find_by_id(item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{create_test_user, setup_test_db};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_item_rejects_blank_title() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let err = create_content_item(&db, "u1", "   ", "desc", ItemType::Problem)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_item_requires_known_creator() -> Result<()> {
        let db = setup_test_db().await?;

        let err = create_content_item(&db, "ghost", "Cold chain gaps", "", ItemType::Problem)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UserNotFound { .. }));
        assert!(ContentItem::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_publishing_a_problem_grants_fifty_points() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;

        let item =
            create_content_item(&db, "u1", "  Cold chain gaps  ", "Vaccines spoil", ItemType::Problem)
                .await?;
        assert_eq!(item.title, "Cold chain gaps");
        assert_eq!(item.item_type, "problem");
        assert_eq!(item.upvotes, 0);
        assert_eq!(item.interested_investors_count, 0);

        let creator = UserProfile::find_by_id("u1").one(&db).await?.unwrap();
        assert_eq!(creator.points, 50);

        Ok(())
    }

    #[tokio::test]
    async fn test_publish_points_by_type() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "u1", "Ada").await?;

        create_content_item(&db, "u1", "Dry-ice couriers", "", ItemType::Business).await?;
        create_content_item(&db, "u1", "Reusable pods", "", ItemType::Solution).await?;
        create_content_item(&db, "u1", "Route pooling", "", ItemType::Idea).await?;

        // 30 for the business, nothing for the solution or idea.
        let creator = UserProfile::find_by_id("u1").one(&db).await?.unwrap();
        assert_eq!(creator.points, 30);

        Ok(())
    }
}
