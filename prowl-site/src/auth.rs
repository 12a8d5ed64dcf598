use crate::pages::{self, LoginPage};
use prowl_common::settings::SiteSettings;
use prowl_common::{Credentials, Identity, ProwlError, Result};
use prowl_drivers::session::{ScopedBrowserContext, SessionFactory, StorageState};
use tracing::{info, warn};

/// Drives the sign-in form and persists the resulting session.
#[derive(Clone)]
pub struct AuthenticationFlow {
    sessions: SessionFactory,
    site: SiteSettings,
}

impl AuthenticationFlow {
    pub fn new(sessions: SessionFactory, site: SiteSettings) -> Self {
        Self { sessions, site }
    }

    /// Ensure `credentials` has a valid stored session.
    ///
    /// Returns without launching a browser when one already exists. The
    /// session file is only written once the whole sequence succeeded.
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let identity = credentials.identity();
        if self.sessions.store().is_authenticated(&identity) {
            info!(target: "prowl.auth", %identity, "stored session still valid");
            return Ok(());
        }

        let ctx = self.sessions.open(&identity).await?;
        let outcome = self.sign_in(&ctx, &identity, credentials).await;
        ctx.close().await;

        let state = outcome?;
        self.sessions.store().save(&identity, &state)?;
        if !state.is_valid() {
            warn!(target: "prowl.auth", %identity, "saved session has no unexpired cookie");
        }
        info!(target: "prowl.auth", %identity, "session saved");
        Ok(())
    }

    async fn sign_in(
        &self,
        ctx: &ScopedBrowserContext,
        identity: &Identity,
        credentials: &Credentials,
    ) -> Result<StorageState> {
        let form = LoginPage::new(ctx.page(), &self.site);
        form.open()
            .await
            .map_err(ProwlError::login(identity, "open login page"))?;
        form.fill_credentials(&credentials.username, &credentials.password)
            .await
            .map_err(ProwlError::login(identity, "fill credentials"))?;
        form.submit()
            .await
            .map_err(ProwlError::login(identity, "submit credentials"))?;

        let landed = form
            .settle()
            .await
            .map_err(ProwlError::login(identity, "await login completion"))?;
        if pages::is_auth_wall(&landed) {
            return Err(ProwlError::Login {
                identity: identity.clone(),
                stage: "await login completion",
                source: anyhow::anyhow!("still on {landed} after submitting credentials"),
            });
        }

        ctx.export_state()
            .await
            .map_err(ProwlError::login(identity, "export session state"))
    }
}
