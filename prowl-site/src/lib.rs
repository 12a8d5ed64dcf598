//! Job-board extraction for the professional network site.
//!
//! The layers, leaf first:
//!
//! - [`parse`]: pure string parsers (skills, slugs, ids, timestamps)
//! - [`pages`]: page objects with best-effort getters over a live [`Page`](prowl_drivers::browser::page::Page)
//! - [`factory`]: page object → entity mapping
//! - [`pagination`]: the search state machine
//! - [`auth`]: sign-in and session persistence
//! - [`service`]: [`JobBoard`], the operations exposed to callers
//!
//! Entities in [`model`] serialize with camelCase keys.
pub mod auth;
pub mod factory;
pub mod model;
pub mod pages;
pub mod pagination;
pub mod parse;
pub mod service;

pub use auth::AuthenticationFlow;
pub use model::{Company, DateFilter, Hirer, JobPostingInfo, JobPostingListingItem, SearchQuery};
pub use pagination::{SearchController, SearchState, StopReason};
pub use service::JobBoard;
