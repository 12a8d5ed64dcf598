use anyhow::{Context, Result};
use prowl_common::settings::{SiteSettings, Timeouts};
use prowl_drivers::browser::page::Page;

pub const LOGIN_PATH: &str = "login";
pub const USERNAME_SELECTOR: &str = "input#username";
pub const PASSWORD_SELECTOR: &str = "input#password";
pub const SUBMIT_SELECTOR: &str = "button[type=submit]";

/// The sign-in form.
pub struct LoginPage<'a> {
    page: &'a dyn Page,
    site: &'a SiteSettings,
}

impl<'a> LoginPage<'a> {
    pub fn new(page: &'a dyn Page, site: &'a SiteSettings) -> Self {
        Self { page, site }
    }

    /// Navigate to the form and wait for it to render.
    pub async fn open(&self) -> Result<()> {
        self.page.goto(&self.site.url(LOGIN_PATH)).await?;
        self.page
            .wait_for(USERNAME_SELECTOR, self.site.timeouts.page_wait())
            .await
            .context("login form")?;
        Ok(())
    }

    pub async fn fill_credentials(&self, username: &str, password: &str) -> Result<()> {
        self.page.fill(USERNAME_SELECTOR, username).await?;
        self.page.fill(PASSWORD_SELECTOR, password).await?;
        Ok(())
    }

    pub async fn submit(&self) -> Result<()> {
        self.page.click(SUBMIT_SELECTOR).await
    }

    /// Fixed wait for the post-login redirects (and any manual 2FA step) to
    /// finish, then the URL the browser settled on.
    pub async fn settle(&self) -> Result<String> {
        self.page
            .pause(Timeouts::ms(self.site.timeouts.login_settle))
            .await;
        self.page.current_url().await
    }
}
