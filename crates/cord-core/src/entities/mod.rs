//! Gateway entities decoded into arena storage

mod message;
mod user;

pub use message::{Message, MessageView};
pub use user::{User, UserView};
