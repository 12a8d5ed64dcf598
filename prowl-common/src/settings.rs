//! Immutable runtime settings handed to constructors.
//!
//! Every fixed wait in the system is a named field of [`Timeouts`]. The
//! target site exposes no reliable "done" signal after login, clicks or
//! search submission, so these settle periods are plain sleeps of a known
//! length rather than adaptive polling.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// How to reach and launch the browser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// WebDriver endpoint (chromedriver by default).
    pub webdriver_url: String,
    /// Run without a visible window.
    pub headless: bool,
    /// Extra Chrome command-line arguments.
    pub args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            args: Vec::new(),
        }
    }
}

/// Where per-identity storage snapshots live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub dir: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("var").join("session"),
        }
    }
}

/// Localized UI strings the extractors match against.
///
/// Defaults are the Italian labels of the target UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLocale {
    /// `aria-label` of the job search keyword input.
    pub search_input_label: String,
    /// `aria-label` of the job search location input.
    pub location_input_label: String,
    /// `aria-label` of the "next page" button under the result list.
    pub next_page_label: String,
    /// Marker text inside a result card for on-site applications.
    pub simple_application_marker: String,
    /// Marker text inside the apply button label for on-site applications.
    pub apply_button_simple_marker: String,
    /// Word joining the last two entries of a skill run ("Go e Rust").
    pub and_word: String,
    /// Lowercase phrase in the feedback banner of closed postings.
    pub closed_posting_phrase: String,
}

impl Default for SiteLocale {
    fn default() -> Self {
        Self {
            search_input_label: "Cerca per qualifica, competenza o azienda".to_string(),
            location_input_label: "Città, stato o CAP".to_string(),
            next_page_label: "Visualizza pagina successiva".to_string(),
            simple_application_marker: "Candidatura semplice".to_string(),
            apply_button_simple_marker: "semplice".to_string(),
            and_word: " e ".to_string(),
            closed_posting_phrase: "non accetta".to_string(),
        }
    }
}

/// Fixed waits, in milliseconds unless stated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Upper bound for an optional field's anchor element to appear.
    pub field_wait: u64,
    /// Upper bound for a required container (result list, login form).
    pub page_wait: u64,
    /// Settle period after submitting the login form.
    pub login_settle: u64,
    /// Settle period after clicking an external apply button.
    pub apply_settle: u64,
    /// Settle period after submitting a search.
    pub search_settle: u64,
    /// Pause after filling a search input.
    pub input_settle: u64,
    /// Pause after opening the date filter control.
    pub filter_open: u64,
    /// Pause between key presses inside the date filter.
    pub filter_step: u64,
    /// Pause between two scroll increments.
    pub scroll_pause: u64,
    /// Number of scroll increments per result page.
    pub scroll_steps: u32,
    /// Pixels per scroll increment.
    pub scroll_increment: i64,
    /// Settle period after clicking "next page".
    pub next_page_settle: u64,
    /// Settle period after opening a dropdown menu.
    pub dropdown_settle: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            field_wait: 1_000,
            page_wait: 10_000,
            login_settle: 50_000,
            apply_settle: 5_000,
            search_settle: 5_000,
            input_settle: 500,
            filter_open: 1_500,
            filter_step: 500,
            scroll_pause: 500,
            scroll_steps: 8,
            scroll_increment: 400,
            next_page_settle: 1_000,
            dropdown_settle: 1_000,
        }
    }
}

impl Timeouts {
    /// All waits collapsed to zero; scroll shape kept. Used by tests.
    pub fn immediate() -> Self {
        Self {
            field_wait: 0,
            page_wait: 0,
            login_settle: 0,
            apply_settle: 0,
            search_settle: 0,
            input_settle: 0,
            filter_open: 0,
            filter_step: 0,
            scroll_pause: 0,
            next_page_settle: 0,
            dropdown_settle: 0,
            ..Self::default()
        }
    }

    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    pub fn field_wait(&self) -> Duration {
        Self::ms(self.field_wait)
    }

    pub fn page_wait(&self) -> Duration {
        Self::ms(self.page_wait)
    }
}

/// Everything the site-specific extractors need to know.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Origin of the target site, without trailing slash.
    pub base_url: String,
    pub locale: SiteLocale,
    pub timeouts: Timeouts,
    /// Safety cap on result pages visited by one search.
    pub max_pages: u32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.linkedin.com".to_string(),
            locale: SiteLocale::default(),
            timeouts: Timeouts::default(),
            max_pages: 100,
        }
    }
}

impl SiteSettings {
    /// Join a site-relative path onto the configured origin.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
