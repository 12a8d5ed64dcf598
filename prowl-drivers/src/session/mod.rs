//! Session persistence and browser-context lifecycle.
pub mod factory;
pub mod state;
pub mod store;

pub use factory::{BrowserLauncher, BrowserSession, ScopedBrowserContext, SessionFactory, WebDriverLauncher};
pub use state::{StorageState, StoredCookie};
pub use store::SessionStore;
