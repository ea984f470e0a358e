//! # Piazza Core
//!
//! The domain layer of Piazza: short-lived posts that other users can like,
//! dislike, or comment on until the post expires.
//!
//! This crate holds the post lifecycle rules, interaction authorization and
//! recording, and topic discovery. It has zero infrastructure dependencies;
//! storage, identity, and time come in through [`ports`].

pub mod authorizer;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod ports;
pub mod query;
pub mod recorder;
pub mod service;

pub use error::{DomainError, RepoError};
pub use service::{InteractionReceipt, PostService};
