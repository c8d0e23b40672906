//! Per-entity response handlers, registered in [`HandlerRegistry::standard`](crate::HandlerRegistry::standard).

pub mod friends;
pub mod groups;
pub mod users;
pub mod wall;

mod paging;
