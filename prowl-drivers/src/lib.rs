//! Driver layer for browser automation and session persistence.
//!
//! - [`browser::page::Page`] / [`browser::page::DomElement`]: the capability
//!   surface page objects are written against
//! - [`browser::driver::ProwlDriver`]: WebDriver client wrapper (fantoccini)
//! - [`session::SessionStore`]: per-identity storage-state snapshots
//! - [`session::SessionFactory`]: opens seeded, scoped browser contexts
pub mod browser;
pub mod session;
