//! Value objects - immutable types that represent protocol concepts

mod intents;

pub use intents::Intents;
