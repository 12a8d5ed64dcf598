use crate::browser::page::ProwlPage;
use crate::session::state::{OriginState, StorageEntry, StorageState, StoredCookie};
use anyhow::{Context, Result};
use cookie::{Cookie, SameSite};
use fantoccini::{Client, ClientBuilder};
use prowl_common::settings::BrowserSettings;
use serde_json::{json, Value};
use std::collections::HashMap;
use time::OffsetDateTime;
use tracing::{debug, warn};
use url::Url;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One driver is one browser process: chromedriver starts Chrome when the
/// session is created and terminates it when the session is closed.
pub struct ProwlDriver {
    pub client: Client,
}

/// Chrome command-line arguments for the given settings.
pub fn build_chrome_arguments(settings: &BrowserSettings) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--window-size=1440,900".to_string(),
    ];
    if settings.headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args.extend(settings.args.iter().cloned());
    args
}

impl ProwlDriver {
    /// Create a new browser session on the configured WebDriver endpoint.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(build_chrome_arguments(settings)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await
            .with_context(|| format!("cannot open a session on {}", settings.webdriver_url))?;

        debug!(target: "prowl.browser", endpoint = %settings.webdriver_url, "browser session started");
        Ok(Self { client })
    }

    /// Page handle bound to this driver's current tab.
    pub fn page(&self) -> ProwlPage {
        ProwlPage::new(self.client.clone())
    }

    /// Load `origin` and install the snapshot's cookies and local storage.
    ///
    /// WebDriver only accepts cookies for the current document's domain, so
    /// the origin is visited first. Cookies the browser refuses are skipped.
    pub async fn seed(&self, origin: &str, state: &StorageState) -> Result<()> {
        self.client
            .goto(origin)
            .await
            .with_context(|| format!("cannot reach {origin}"))?;

        let mut installed = 0usize;
        for stored in &state.cookies {
            match self.client.add_cookie(to_webdriver_cookie(stored)).await {
                Ok(()) => installed += 1,
                Err(err) => warn!(
                    target: "prowl.browser",
                    cookie = %stored.name,
                    domain = %stored.domain,
                    error = %err,
                    "cookie rejected"
                ),
            }
        }

        let current_origin = origin_of(origin);
        if let Some(entries) = current_origin
            .as_deref()
            .and_then(|o| state.origin(o))
            .map(|o| &o.local_storage)
        {
            let pairs: Vec<Value> = entries.iter().map(|e| json!([e.name, e.value])).collect();
            self.client
                .execute(
                    "for (const [k, v] of arguments[0]) { window.localStorage.setItem(k, v); }",
                    vec![Value::Array(pairs)],
                )
                .await?;
        }

        if installed > 0 {
            // reload so the site sees the restored session
            self.client.refresh().await?;
        }
        debug!(target: "prowl.browser", installed, "storage state seeded");
        Ok(())
    }

    /// Capture cookies and the current origin's local storage.
    pub async fn export_state(&self) -> Result<StorageState> {
        let cookies = self
            .client
            .get_all_cookies()
            .await?
            .iter()
            .map(from_webdriver_cookie)
            .collect();

        let mut origins = Vec::new();
        let url = self.client.current_url().await?;
        if let Some(origin) = origin_of(url.as_str()) {
            let read = self
                .client
                .execute("return Object.entries(window.localStorage);", vec![])
                .await;
            let local_storage = storage_entries(read, &origin);
            origins.push(OriginState {
                origin,
                local_storage,
            });
        }

        Ok(StorageState { cookies, origins })
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// Decode `Object.entries(localStorage)`. A failed read exports no entries.
fn storage_entries<E: std::fmt::Display>(
    read: std::result::Result<Value, E>,
    origin: &str,
) -> Vec<StorageEntry> {
    let raw = match read {
        Ok(raw) => raw,
        Err(err) => {
            warn!(
                target: "prowl.browser",
                %origin,
                error = %err,
                "local storage not readable; exporting cookies only"
            );
            return Vec::new();
        }
    };
    raw.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|pair| {
                    Some(StorageEntry {
                        name: pair.get(0)?.as_str()?.to_string(),
                        value: pair.get(1)?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn origin_of(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

fn to_webdriver_cookie(stored: &StoredCookie) -> Cookie<'static> {
    let mut cookie = Cookie::new(stored.name.clone(), stored.value.clone());
    if !stored.domain.is_empty() {
        cookie.set_domain(stored.domain.clone());
    }
    cookie.set_path(stored.path.clone());
    cookie.set_secure(stored.secure);
    cookie.set_http_only(stored.http_only);
    if let Some(expires) = stored.expires.filter(|e| *e > 0.0) {
        if let Ok(at) = OffsetDateTime::from_unix_timestamp(expires as i64) {
            cookie.set_expires(at);
        }
    }
    match stored.same_site.as_deref() {
        Some("Strict") => cookie.set_same_site(SameSite::Strict),
        Some("Lax") => cookie.set_same_site(SameSite::Lax),
        Some("None") => cookie.set_same_site(SameSite::None),
        _ => {}
    }
    cookie
}

fn from_webdriver_cookie(cookie: &Cookie<'static>) -> StoredCookie {
    StoredCookie {
        domain: cookie.domain().unwrap_or_default().to_string(),
        path: cookie.path().unwrap_or("/").to_string(),
        expires: Some(
            cookie
                .expires_datetime()
                .map(|at| at.unix_timestamp() as f64)
                .unwrap_or(-1.0),
        ),
        http_only: cookie.http_only().unwrap_or(false),
        secure: cookie.secure().unwrap_or(false),
        same_site: cookie.same_site().map(|s| format!("{s:?}")),
        ..StoredCookie::new(cookie.name(), cookie.value(), "")
    }
}
