// netinv-api: browser-driver surface for the netadmin portal (W3C WebDriver)

pub mod auth;
pub mod driver;
pub mod error;
pub mod transport;
pub mod webdriver;

pub use auth::{Credential, Environment};
pub use driver::{DriverLauncher, ElementRef, Locator, PortalDriver};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use webdriver::{Browser, BrowserOptions, WebDriverClient, WebDriverLauncher, WebDriverSession};
