pub mod identity;
pub mod post;

pub use identity::PostIdentity;
pub use post::{OutboundPost, PostFields};
