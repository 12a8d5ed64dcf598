//! Opens isolated browser sessions seeded from the [`SessionStore`] and
//! guarantees they are torn down.
use super::state::StorageState;
use super::store::SessionStore;
use crate::browser::driver::ProwlDriver;
use crate::browser::page::{Page, ProwlPage};
use anyhow::Result;
use async_trait::async_trait;
use prowl_common::settings::BrowserSettings;
use prowl_common::{Identity, ProwlError};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A live, isolated browsing context.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    fn page(&self) -> &dyn Page;

    /// Snapshot the context's cookies and storage.
    async fn export_state(&self) -> Result<StorageState>;

    /// Terminate the browser. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Start termination without waiting for it; used when the owner is
    /// dropped before [`close`](Self::close) ran.
    fn abandon(&mut self);
}

/// Starts browsers.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, state: &StorageState) -> Result<Box<dyn BrowserSession>>;
}

/// [`BrowserLauncher`] backed by a WebDriver endpoint.
pub struct WebDriverLauncher {
    settings: BrowserSettings,
    origin: String,
}

impl WebDriverLauncher {
    /// `origin` is visited first so stored cookies can be installed.
    pub fn new(settings: BrowserSettings, origin: impl Into<String>) -> Self {
        Self {
            settings,
            origin: origin.into(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self, state: &StorageState) -> Result<Box<dyn BrowserSession>> {
        let driver = ProwlDriver::launch(&self.settings).await?;
        if let Err(err) = driver.seed(&self.origin, state).await {
            let _ = driver.close().await;
            return Err(err.context("seeding the browser from the stored session failed"));
        }
        let page = driver.page();
        Ok(Box::new(WebDriverSession {
            driver: Some(driver),
            page,
        }))
    }
}

struct WebDriverSession {
    driver: Option<ProwlDriver>,
    page: ProwlPage,
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    fn page(&self) -> &dyn Page {
        &self.page
    }

    async fn export_state(&self) -> Result<StorageState> {
        match &self.driver {
            Some(driver) => driver.export_state().await,
            None => anyhow::bail!("browser session already closed"),
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(driver) => driver.close().await,
            None => Ok(()),
        }
    }

    fn abandon(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = driver.close().await {
                        warn!(target: "prowl.browser", error = %err, "background browser close failed");
                    }
                });
            }
            Err(_) => {
                warn!(target: "prowl.browser", "no async runtime left; browser session may outlive the process")
            }
        }
    }
}

/// A browser session that is closed on every exit path.
///
/// Prefer [`close`](Self::close); if the context is dropped instead (error
/// propagation, panic, or the owning future being cancelled) the session is
/// closed in the background.
pub struct ScopedBrowserContext {
    identity: Identity,
    session: Box<dyn BrowserSession>,
    closed: bool,
}

impl ScopedBrowserContext {
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn page(&self) -> &dyn Page {
        self.session.page()
    }

    pub async fn export_state(&self) -> Result<StorageState> {
        self.session.export_state().await
    }

    /// Terminate the browser; failures are logged, not returned.
    pub async fn close(mut self) {
        self.closed = true;
        match self.session.close().await {
            Ok(()) => debug!(target: "prowl.browser", identity = %self.identity, "browser closed"),
            Err(err) => warn!(
                target: "prowl.browser",
                identity = %self.identity,
                error = %err,
                "browser close failed"
            ),
        }
    }
}

impl Drop for ScopedBrowserContext {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                target: "prowl.browser",
                identity = %self.identity,
                "browser context dropped without close; closing in background"
            );
            self.session.abandon();
        }
    }
}

/// Creates [`ScopedBrowserContext`]s for identities.
#[derive(Clone)]
pub struct SessionFactory {
    store: SessionStore,
    launcher: Arc<dyn BrowserLauncher>,
}

impl SessionFactory {
    pub fn new(store: SessionStore, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self { store, launcher }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Launch a browser seeded from `identity`'s stored session. Not retried.
    pub async fn open(&self, identity: &Identity) -> Result<ScopedBrowserContext, ProwlError> {
        let state = self.store.load(identity);
        info!(
            target: "prowl.browser",
            identity = %identity,
            cookies = state.cookies.len(),
            "opening browser context"
        );
        let session = self
            .launcher
            .launch(&state)
            .await
            .map_err(|source| ProwlError::Launch {
                identity: identity.clone(),
                source,
            })?;
        Ok(ScopedBrowserContext {
            identity: identity.clone(),
            session,
            closed: false,
        })
    }
}
