#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use prowl_common::settings::{SiteSettings, Timeouts};
use prowl_common::Identity;
use prowl_drivers::browser::page::{DomElement, Key, Page, Tab};
use prowl_drivers::session::state::now_epoch_seconds;
use prowl_drivers::session::{BrowserLauncher, BrowserSession, SessionFactory, SessionStore, StorageState, StoredCookie};
use prowl_site::JobBoard;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "https://www.linkedin.com";

pub fn site() -> SiteSettings {
    SiteSettings {
        timeouts: Timeouts::immediate(),
        ..SiteSettings::default()
    }
}

pub fn identity() -> Identity {
    Identity::new("someone@example.com")
}

/// A snapshot holding one cookie that expires in an hour.
pub fn valid_state() -> StorageState {
    StorageState {
        cookies: vec![StoredCookie::new("li_at", "token", ".linkedin.com").expiring_at(now_epoch_seconds() + 3600.0)],
        origins: Vec::new(),
    }
}

/// What clicking a node does to the fake browser.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickEffect {
    NextScreen,
    OpenTab(String),
    SetUrl(String),
}

#[derive(Debug, Clone, Default)]
pub struct FakeNode {
    pub text: String,
    pub html: String,
    pub attrs: HashMap<String, String>,
    pub children: HashMap<String, Vec<FakeNode>>,
    pub on_click: Option<ClickEffect>,
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = html.to_string();
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, selector: &str, node: FakeNode) -> Self {
        self.children.entry(selector.to_string()).or_default().push(node);
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click = Some(effect);
        self
    }
}

/// One rendered state of the page: selector → matching nodes.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    nodes: HashMap<String, Vec<FakeNode>>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, node: FakeNode) -> Self {
        self.nodes.entry(selector.to_string()).or_default().push(node);
        self
    }

    pub fn with_all(mut self, selector: &str, nodes: Vec<FakeNode>) -> Self {
        self.nodes.entry(selector.to_string()).or_default().extend(nodes);
        self
    }

    fn first(&self, selector: &str) -> Option<&FakeNode> {
        self.nodes.get(selector).and_then(|nodes| nodes.first())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Goto(String),
    Fill(String, String),
    Click(String),
    ClickElement(String),
    Press(Key),
    Scroll(String, i64),
}

#[derive(Default)]
struct PageState {
    url: String,
    screens: Vec<Screen>,
    current: usize,
    extra_tabs: Vec<String>,
    newest_tab_first: bool,
    stall: Option<Duration>,
    waits: Vec<String>,
    redirects: HashMap<String, String>,
    actions: Vec<Action>,
}

impl PageState {
    fn screen(&self) -> Screen {
        self.screens.get(self.current).cloned().unwrap_or_default()
    }

    fn apply(&mut self, effect: Option<ClickEffect>) {
        match effect {
            Some(ClickEffect::NextScreen) => self.current += 1,
            Some(ClickEffect::OpenTab(url)) => self.extra_tabs.push(url),
            Some(ClickEffect::SetUrl(url)) => self.url = url,
            None => {}
        }
    }
}

/// In-memory [`Page`] that serves fixed screens and records every action.
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new(screens: Vec<Screen>) -> Self {
        let page = Self::default();
        page.state.lock().unwrap().screens = screens;
        page
    }

    pub fn single(screen: Screen) -> Self {
        Self::new(vec![screen])
    }

    /// Navigating to `from` lands on `to`.
    pub fn redirect(self, from: &str, to: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .redirects
            .insert(from.to_string(), to.to_string());
        self
    }

    /// Report window handles newest first, as some drivers do.
    pub fn newest_tab_first(self) -> Self {
        self.state.lock().unwrap().newest_tab_first = true;
        self
    }

    /// Every settle pause blocks for `stall`.
    pub fn stalling(self, stall: Duration) -> Self {
        self.state.lock().unwrap().stall = Some(stall);
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.lock().unwrap().actions.clone()
    }

    pub fn presses(&self) -> Vec<Key> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Press(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Click(selector) | Action::ClickElement(selector) => Some(selector),
                _ => None,
            })
            .collect()
    }

    /// Selectors passed to `wait_for`, in call order.
    pub fn waits(&self) -> Vec<String> {
        self.state.lock().unwrap().waits.clone()
    }

    pub fn url(&self) -> String {
        self.state.lock().unwrap().url.clone()
    }

    fn record(&self, action: Action) {
        self.state.lock().unwrap().actions.push(action);
    }

    fn element(&self, selector: &str, node: FakeNode) -> Box<dyn DomElement> {
        Box::new(FakeElement {
            selector: selector.to_string(),
            node,
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(Action::Goto(url.to_string()));
        state.url = state.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.url())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Box<dyn DomElement>> {
        self.state.lock().unwrap().waits.push(selector.to_string());
        match self.query(selector).await? {
            Some(element) => Ok(element),
            None => Err(anyhow!("`{selector}` did not appear within {timeout:?}")),
        }
    }

    async fn query(&self, selector: &str) -> Result<Option<Box<dyn DomElement>>> {
        let node = self.state.lock().unwrap().screen().first(selector).cloned();
        Ok(node.map(|node| self.element(selector, node)))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>> {
        let nodes = self
            .state
            .lock()
            .unwrap()
            .screen()
            .nodes
            .get(selector)
            .cloned()
            .unwrap_or_default();
        Ok(nodes.into_iter().map(|node| self.element(selector, node)).collect())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.screen().first(selector).is_none() {
            return Err(anyhow!("input `{selector}` not found"));
        }
        state.actions.push(Action::Fill(selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(node) = state.screen().first(selector).cloned() else {
            return Err(anyhow!("click target `{selector}` not found"));
        };
        state.actions.push(Action::Click(selector.to_string()));
        state.apply(node.on_click);
        Ok(())
    }

    async fn press(&self, key: Key) -> Result<()> {
        self.record(Action::Press(key));
        Ok(())
    }

    async fn scroll_by(&self, selector: &str, dy: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.screen().first(selector).is_none() {
            return Err(anyhow!("scroll container `{selector}` not found"));
        }
        state.actions.push(Action::Scroll(selector.to_string(), dy));
        Ok(())
    }

    async fn tabs(&self) -> Result<Vec<Tab>> {
        let state = self.state.lock().unwrap();
        let mut tabs: Vec<Tab> = std::iter::once(&state.url)
            .chain(state.extra_tabs.iter())
            .enumerate()
            .map(|(i, url)| Tab {
                handle: format!("tab-{i}"),
                url: url.clone(),
            })
            .collect();
        if state.newest_tab_first {
            tabs.reverse();
        }
        Ok(tabs)
    }

    async fn pause(&self, _duration: Duration) {
        let stall = self.state.lock().unwrap().stall;
        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
    }
}

struct FakeElement {
    selector: String,
    node: FakeNode,
    state: Arc<Mutex<PageState>>,
}

#[async_trait]
impl DomElement for FakeElement {
    async fn text(&self) -> Result<String> {
        Ok(self.node.text.clone())
    }

    async fn inner_html(&self) -> Result<String> {
        Ok(self.node.html.clone())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        Ok(self.node.attrs.get(name).cloned())
    }

    async fn find(&self, selector: &str) -> Result<Option<Box<dyn DomElement>>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>> {
        let nodes = self.node.children.get(selector).cloned().unwrap_or_default();
        Ok(nodes
            .into_iter()
            .map(|node| {
                Box::new(FakeElement {
                    selector: selector.to_string(),
                    node,
                    state: Arc::clone(&self.state),
                }) as Box<dyn DomElement>
            })
            .collect())
    }

    async fn click(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(Action::ClickElement(self.selector.clone()));
        state.apply(self.node.on_click.clone());
        Ok(())
    }
}

/// Counts browser lifecycle events across every session it launched.
#[derive(Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub abandons: AtomicUsize,
}

pub struct FakeLauncher {
    page: FakePage,
    exported: StorageState,
    fail_launch: bool,
    pub counters: Arc<Counters>,
    pub seeded_with: Mutex<Vec<StorageState>>,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            exported: StorageState::default(),
            fail_launch: false,
            counters: Arc::default(),
            seeded_with: Mutex::default(),
        }
    }

    /// State returned by `export_state` of launched sessions.
    pub fn exporting(mut self, state: StorageState) -> Self {
        self.exported = state;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(FakePage::default())
        }
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub fn abandons(&self) -> usize {
        self.counters.abandons.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, state: &StorageState) -> Result<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err(anyhow!("session not created: chrome not reachable"));
        }
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        self.seeded_with.lock().unwrap().push(state.clone());
        Ok(Box::new(FakeSession {
            page: self.page.clone(),
            exported: self.exported.clone(),
            counters: Arc::clone(&self.counters),
            closed: false,
        }))
    }
}

struct FakeSession {
    page: FakePage,
    exported: StorageState,
    counters: Arc<Counters>,
    closed: bool,
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn page(&self) -> &dyn Page {
        &self.page
    }

    async fn export_state(&self) -> Result<StorageState> {
        Ok(self.exported.clone())
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn abandon(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.abandons.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// A [`JobBoard`] over `launcher`, storing sessions under `dir`.
pub fn board(dir: &Path, launcher: Arc<FakeLauncher>) -> JobBoard {
    let sessions = SessionFactory::new(SessionStore::new(dir), launcher);
    JobBoard::new(site(), sessions)
}

/// Like [`board`], with a valid session already stored for [`identity`].
pub fn signed_in_board(dir: &Path, launcher: Arc<FakeLauncher>) -> JobBoard {
    SessionStore::new(dir)
        .save(&identity(), &valid_state())
        .unwrap();
    board(dir, launcher)
}
