// Scripted in-memory browser for session and inventory tests.
//
// Pages are scripted per URL as a queue; each `page_source` pops the next
// entry until one remains, which then repeats. Titles work the same way.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;
use url::Url;

use netinv_api::{Credential, DriverLauncher, ElementRef, Environment, Error, Locator, PortalDriver};
use netinv_core::{PortalConfig, Timings};

pub const BASE: &str = "https://portal.example.edu/cgi-bin/netadmin.pl";
pub const LIVE_TITLE: &str = " VLAN SUMMARY ";

pub fn titled(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}

pub fn live_page(body: &str) -> String {
    titled(LIVE_TITLE, body)
}

pub fn login_page() -> String {
    titled("Central Authentication Service", "<form></form>")
}

pub fn portal_config(environment: Environment) -> PortalConfig {
    let mut config = PortalConfig::new(Url::parse(BASE).unwrap(), environment);
    config.timings = Timings::default();
    config
}

pub fn credential() -> Credential {
    Credential::new("netops", SecretString::from("s3cret".to_string()))
}

// ── Script ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Script {
    pages: HashMap<String, VecDeque<String>>,
    titles: VecDeque<String>,
    missing: HashSet<String>,
    delayed: HashMap<String, usize>,
    buttons: Vec<String>,
    current: Option<String>,
    pub fail_launch: bool,
    pub calls: Vec<String>,
    pub launches: usize,
    pub quits: usize,
}

fn sticky_pop(queue: &mut VecDeque<String>) -> Option<String> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

impl Script {
    pub fn page(&mut self, url: &str, source: impl Into<String>) -> &mut Self {
        self.pages
            .entry(url.to_owned())
            .or_default()
            .push_back(source.into());
        self
    }

    /// Forget every scripted page for `url`.
    pub fn clear_pages(&mut self, url: &str) -> &mut Self {
        self.pages.remove(url);
        self
    }

    pub fn clear_titles(&mut self) -> &mut Self {
        self.titles.clear();
        self
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.titles.push_back(title.into());
        self
    }

    /// The element behind `locator` never appears.
    pub fn missing(&mut self, locator: &Locator) -> &mut Self {
        self.missing.insert(locator.to_string());
        self
    }

    /// The element behind `locator` appears after `polls` failed lookups.
    pub fn delayed(&mut self, locator: &Locator, polls: usize) -> &mut Self {
        self.delayed.insert(locator.to_string(), polls);
        self
    }

    pub fn buttons(&mut self, labels: &[&str]) -> &mut Self {
        self.buttons = labels.iter().map(|l| (*l).to_owned()).collect();
        self
    }

    pub fn called(&self, call: &str) -> bool {
        self.calls.iter().any(|c| c == call)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub type Shared = Arc<Mutex<Script>>;

/// A script where the portal accepts the login and every page is live.
pub fn happy_script() -> Shared {
    let script = Shared::default();
    script
        .lock()
        .unwrap()
        .title(LIVE_TITLE)
        .page(BASE, live_page(""))
        .buttons(&["Call Me", "Send Me a Push"]);
    script
}

// ── Fake driver ─────────────────────────────────────────────────────

pub struct FakeDriver {
    script: Shared,
}

#[async_trait]
impl PortalDriver for FakeDriver {
    async fn navigate(&mut self, url: &Url) -> Result<(), Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("navigate {url}"));
        script.current = Some(url.to_string());
        Ok(())
    }

    async fn title(&mut self) -> Result<String, Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push("title".into());
        Ok(sticky_pop(&mut script.titles).unwrap_or_default())
    }

    async fn page_source(&mut self) -> Result<String, Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push("source".into());
        let current = script.current.clone().unwrap_or_default();
        let page = script
            .pages
            .get_mut(&current)
            .and_then(sticky_pop)
            .unwrap_or_else(|| titled("404 Not Found", ""));
        Ok(page)
    }

    async fn find(&mut self, locator: &Locator) -> Result<ElementRef, Error> {
        let mut script = self.script.lock().unwrap();
        let key = locator.to_string();
        script.calls.push(format!("find {key}"));
        if script.missing.contains(&key) {
            return Err(Error::NoSuchElement { locator: key });
        }
        if let Some(remaining) = script.delayed.get_mut(&key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::NoSuchElement { locator: key });
            }
        }
        Ok(ElementRef::new(key))
    }

    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("find_all {locator}"));
        Ok((0..script.buttons.len())
            .map(|i| ElementRef::new(format!("button-{i}")))
            .collect())
    }

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("send_keys {} {text}", element.id()));
        Ok(())
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("click {}", element.id()));
        Ok(())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String, Error> {
        let script = self.script.lock().unwrap();
        let index: usize = element
            .id()
            .strip_prefix("button-")
            .and_then(|i| i.parse().ok())
            .unwrap_or(usize::MAX);
        Ok(script.buttons.get(index).cloned().unwrap_or_default())
    }

    async fn enter_frame(&mut self, frame: &ElementRef) -> Result<(), Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(format!("enter_frame {}", frame.id()));
        Ok(())
    }

    async fn leave_frame(&mut self) -> Result<(), Error> {
        self.script.lock().unwrap().calls.push("leave_frame".into());
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), Error> {
        let mut script = self.script.lock().unwrap();
        script.calls.push("quit".into());
        script.quits += 1;
        Ok(())
    }
}

pub struct FakeLauncher {
    pub script: Shared,
}

impl FakeLauncher {
    pub fn new(script: &Shared) -> Self {
        Self {
            script: Arc::clone(script),
        }
    }
}

#[async_trait]
impl DriverLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self) -> Result<FakeDriver, Error> {
        let mut script = self.script.lock().unwrap();
        script.launches += 1;
        if script.fail_launch {
            return Err(Error::SessionNotCreated {
                message: "no browser binary".into(),
            });
        }
        Ok(FakeDriver {
            script: Arc::clone(&self.script),
        })
    }
}
