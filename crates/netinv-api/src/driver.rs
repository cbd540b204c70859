// Browser-driver abstraction
//
// The session controller in `netinv-core` never talks HTTP itself; it
// drives whatever implements `PortalDriver`. The WebDriver client in this
// crate is the production implementation, tests substitute scripted fakes.

use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::error::Error;

/// How to find an element in the current browsing context.
///
/// Every variant lowers to a CSS selector, which is the one strategy all
/// WebDriver servers support uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Id(String),
    Name(String),
    ClassName(String),
    Css(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::Name(value.into())
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::ClassName(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }

    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{id}"),
            Self::Name(name) => format!("[name=\"{name}\"]"),
            Self::ClassName(class) => format!(".{class}"),
            Self::Css(selector) => selector.clone(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(v) => write!(f, "id={v}"),
            Self::Name(v) => write!(f, "name={v}"),
            Self::ClassName(v) => write!(f, "class={v}"),
            Self::Css(v) => write!(f, "css={v}"),
        }
    }
}

/// Opaque handle to an element, valid only in the browsing context it
/// was found in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// An exclusively owned, interactive browser session.
///
/// All methods take `&mut self`: a browser session is a single cursor
/// (one current page, one current frame) and must never be driven by two
/// callers at once.
#[async_trait]
pub trait PortalDriver: Send {
    /// Load `url` in the top-level browsing context.
    async fn navigate(&mut self, url: &Url) -> Result<(), Error>;

    /// Title of the current top-level document.
    async fn title(&mut self) -> Result<String, Error>;

    /// Serialized DOM of the current document.
    async fn page_source(&mut self) -> Result<String, Error>;

    /// First element matching `locator`, or [`Error::NoSuchElement`].
    async fn find(&mut self, locator: &Locator) -> Result<ElementRef, Error>;

    /// All elements matching `locator` (possibly none).
    async fn find_all(&mut self, locator: &Locator) -> Result<Vec<ElementRef>, Error>;

    async fn send_keys(&mut self, element: &ElementRef, text: &str) -> Result<(), Error>;

    async fn click(&mut self, element: &ElementRef) -> Result<(), Error>;

    /// Rendered text of an element.
    async fn text(&mut self, element: &ElementRef) -> Result<String, Error>;

    /// Switch the browsing context into an `<iframe>` element.
    async fn enter_frame(&mut self, frame: &ElementRef) -> Result<(), Error>;

    /// Switch back to the parent browsing context.
    async fn leave_frame(&mut self) -> Result<(), Error>;

    /// Release the browser session. Idempotent.
    async fn quit(&mut self) -> Result<(), Error>;
}

/// Provisions fresh browser sessions.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    type Driver: PortalDriver;

    async fn launch(&self) -> Result<Self::Driver, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locators_lower_to_css() {
        assert_eq!(Locator::id("username").to_css(), "#username");
        assert_eq!(Locator::name("submit").to_css(), "[name=\"submit\"]");
        assert_eq!(Locator::class_name("btn-cancel").to_css(), ".btn-cancel");
        assert_eq!(
            Locator::css("button.auth-button.positive").to_css(),
            "button.auth-button.positive"
        );
    }

    #[test]
    fn locator_display_names_strategy() {
        assert_eq!(Locator::id("duo_iframe").to_string(), "id=duo_iframe");
        assert_eq!(Locator::name("dampen_choice").to_string(), "name=dampen_choice");
    }
}
