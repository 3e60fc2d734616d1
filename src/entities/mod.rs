//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod content_item;
pub mod deal;
pub mod deal_message;
pub mod deal_participant;
pub mod notification;
pub mod payment;
pub mod unread_counter;
pub mod upvote;
pub mod user_profile;

// Re-export specific types to avoid conflicts
pub use content_item::{
    Column as ContentItemColumn, Entity as ContentItem, ItemType, Model as ContentItemModel,
};
pub use deal::{Column as DealColumn, DealStatus, Entity as Deal, Model as DealModel};
pub use deal_message::{
    Column as DealMessageColumn, Entity as DealMessage, Model as DealMessageModel, SYSTEM_SENDER,
};
pub use deal_participant::{
    Column as DealParticipantColumn, Entity as DealParticipant, Model as DealParticipantModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, KIND_DEAL_CREATION, KIND_MEMBERSHIP,
    Model as PaymentModel,
};
pub use unread_counter::{
    Column as UnreadCounterColumn, Entity as UnreadCounter, Model as UnreadCounterModel,
};
pub use upvote::{Column as UpvoteColumn, Entity as Upvote, Model as UpvoteModel};
pub use user_profile::{
    Column as UserProfileColumn, Entity as UserProfile, Model as UserProfileModel,
};
