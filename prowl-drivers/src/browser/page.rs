use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{elements::Element, error::CmdError, key::Key as WdKey, Client, Locator};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Keys the extractors send to the focused element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    ArrowDown,
    Enter,
}

impl Key {
    fn webdriver(self) -> char {
        let key = match self {
            Key::Tab => WdKey::Tab,
            Key::ArrowDown => WdKey::Down,
            Key::Enter => WdKey::Enter,
        };
        key.into()
    }
}

/// One open tab: its WebDriver window handle and the URL it shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub handle: String,
    pub url: String,
}

/// Browser capability surface the page objects are written against.
///
/// Implemented over WebDriver by [`ProwlPage`]; tests provide in-memory
/// fakes. Every method maps to one browser round-trip.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate the current tab to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// URL of the current tab.
    async fn current_url(&self) -> Result<String>;

    /// Wait up to `timeout` for the first element matching `selector`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Box<dyn DomElement>>;

    /// First element matching `selector`, if any, without waiting.
    async fn query(&self, selector: &str) -> Result<Option<Box<dyn DomElement>>>;

    /// All elements currently matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>>;

    /// Replace the value of the input matching `selector` with `text`.
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Send a single key press to the focused element.
    async fn press(&self, key: Key) -> Result<()>;

    /// Scroll the element matching `selector` vertically by `dy` pixels.
    async fn scroll_by(&self, selector: &str, dy: i64) -> Result<()>;

    /// Every open tab of this browsing context. WebDriver returns window
    /// handles in no particular order, so callers match on `handle`.
    async fn tabs(&self) -> Result<Vec<Tab>>;

    /// Fixed settle period between interactions.
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// A handle to one element of a live page.
#[async_trait]
pub trait DomElement: Send + Sync {
    /// Rendered text.
    async fn text(&self) -> Result<String>;

    /// Inner HTML markup.
    async fn inner_html(&self) -> Result<String>;

    /// Attribute value, `None` when the attribute is absent.
    async fn attr(&self, name: &str) -> Result<Option<String>>;

    /// First descendant matching `selector`.
    async fn find(&self, selector: &str) -> Result<Option<Box<dyn DomElement>>>;

    /// All descendants matching `selector`.
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>>;

    async fn click(&self) -> Result<()>;
}

/// [`Page`] over a `fantoccini` WebDriver client.
#[derive(Clone)]
pub struct ProwlPage {
    pub(crate) client: Client,
}

impl ProwlPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn absent_on_no_such_element<T>(
    res: std::result::Result<T, CmdError>,
) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_no_such_element() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn boxed(elements: Vec<Element>) -> Vec<Box<dyn DomElement>> {
    elements
        .into_iter()
        .map(|element| Box::new(ProwlElement::new(element)) as Box<dyn DomElement>)
        .collect()
}

#[async_trait]
impl Page for ProwlPage {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!(target: "prowl.browser", %url, "navigate");
        self.client
            .goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))
    }

    async fn current_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Box<dyn DomElement>> {
        let element = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .with_context(|| format!("`{selector}` did not appear within {timeout:?}"))?;
        Ok(Box::new(ProwlElement::new(element)))
    }

    async fn query(&self, selector: &str) -> Result<Option<Box<dyn DomElement>>> {
        let found = absent_on_no_such_element(self.client.find(Locator::Css(selector)).await)?;
        Ok(found.map(|element| Box::new(ProwlElement::new(element)) as Box<dyn DomElement>))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(boxed(elements))
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let input = self
            .client
            .find(Locator::Css(selector))
            .await
            .with_context(|| format!("input `{selector}` not found"))?;
        input.clear().await?;
        input.send_keys(text).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let target = self
            .client
            .find(Locator::Css(selector))
            .await
            .with_context(|| format!("click target `{selector}` not found"))?;
        target.click().await?;
        Ok(())
    }

    async fn press(&self, key: Key) -> Result<()> {
        let focused = self.client.active_element().await?;
        focused.send_keys(&key.webdriver().to_string()).await?;
        Ok(())
    }

    async fn scroll_by(&self, selector: &str, dy: i64) -> Result<()> {
        let scrolled = self
            .client
            .execute(
                "const el = document.querySelector(arguments[0]);
                 if (!el) { return false; }
                 el.scrollBy(0, arguments[1]);
                 return true;",
                vec![json!(selector), json!(dy)],
            )
            .await?;
        if scrolled.as_bool() != Some(true) {
            anyhow::bail!("scroll container `{selector}` not found");
        }
        Ok(())
    }

    async fn tabs(&self) -> Result<Vec<Tab>> {
        let current = self.client.window().await?;
        let handles = self.client.windows().await?;
        let mut tabs = Vec::with_capacity(handles.len());
        for handle in handles {
            self.client.switch_to_window(handle.clone()).await?;
            tabs.push(Tab {
                handle: String::from(handle),
                url: self.client.current_url().await?.to_string(),
            });
        }
        self.client.switch_to_window(current).await?;
        Ok(tabs)
    }
}

/// [`DomElement`] over a `fantoccini` element reference.
#[derive(Clone)]
pub struct ProwlElement {
    pub element: Element,
}

impl ProwlElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

#[async_trait]
impl DomElement for ProwlElement {
    async fn text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }

    async fn inner_html(&self) -> Result<String> {
        self.element.html(true).await.map_err(anyhow::Error::from)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        self.element.attr(name).await.map_err(anyhow::Error::from)
    }

    async fn find(&self, selector: &str) -> Result<Option<Box<dyn DomElement>>> {
        let found = absent_on_no_such_element(self.element.find(Locator::Css(selector)).await)?;
        Ok(found.map(|element| Box::new(ProwlElement::new(element)) as Box<dyn DomElement>))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>> {
        let elements = self.element.find_all(Locator::Css(selector)).await?;
        Ok(boxed(elements))
    }

    async fn click(&self) -> Result<()> {
        self.element.click().await.map_err(anyhow::Error::from)
    }
}
