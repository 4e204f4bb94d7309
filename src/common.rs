pub mod error;
pub mod slug;
