//! Domain entities - the core business objects.

mod caller;
mod interaction;
mod post;
mod topic;
mod user;

pub use caller::Caller;
pub use interaction::{Interaction, InteractionKind};
pub use post::{NewPost, Post, PostChanges, PostView, parse_post_id};
pub use topic::Topic;
pub use user::User;
