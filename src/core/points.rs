//! Reputation point schedule.
//!
//! Points are the marketplace's reputation currency. The schedule is fixed:
//! publishing a problem earns 50, publishing a business listing earns 30, and
//! upvotes feed the creator 20 (problems and solutions) or 10 (businesses).
//! Ideas earn nothing either way. Removing an upvote takes back exactly what
//! it granted.

use crate::entities::ItemType;

/// Points granted to the author when a problem is published.
pub const PROBLEM_CREATION_POINTS: i64 = 50;
/// Points granted to the author when a business listing is published.
pub const BUSINESS_CREATION_POINTS: i64 = 30;
/// Points an upvote feeds the creator of a problem or solution.
pub const PROBLEM_UPVOTE_POINTS: i64 = 20;
/// Points an upvote feeds the creator of a business listing.
pub const BUSINESS_UPVOTE_POINTS: i64 = 10;

/// Points awarded to the creator at publish time.
#[must_use]
pub const fn creation_points_for(item_type: ItemType) -> i64 {
    match item_type {
        ItemType::Problem => PROBLEM_CREATION_POINTS,
        ItemType::Business => BUSINESS_CREATION_POINTS,
        ItemType::Solution | ItemType::Idea => 0,
    }
}

/// Points one upvote moves to (or, on removal, back from) the creator.
#[must_use]
pub const fn upvote_points_for(item_type: ItemType) -> i64 {
    match item_type {
        ItemType::Problem | ItemType::Solution => PROBLEM_UPVOTE_POINTS,
        ItemType::Business => BUSINESS_UPVOTE_POINTS,
        ItemType::Idea => 0,
    }
}
