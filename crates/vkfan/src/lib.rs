//! Batched, multi-wave client for the VK API.
//!
//! A [`VkClient`] exposes one façade per API section. Each façade call turns
//! typed parameters into request batches, runs them, follows up on anything
//! the responses ask for, and returns the assembled results.

pub mod client;
pub mod config;
pub mod error;
pub mod facade;
pub mod persist;

pub use client::{PreparedCall, VkClient};
pub use config::{ClientConfig, TOKEN_ENV};
pub use error::ClientError;
pub use facade::{
    Facade, Friends, FriendsGet, GroupMembers, Groups, UserProfiles, Users, UsersGet, Wall,
    WallGet,
};

pub use vkfan_core::{Ident, Params, QueryPath, TransportKind};
pub use vkfan_query::{Limit, ResultTree};
