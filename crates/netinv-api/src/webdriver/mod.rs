// W3C WebDriver implementation of the browser-driver traits.

pub mod client;
pub mod session;

pub use client::WebDriverClient;
pub use session::{Browser, BrowserOptions, ELEMENT_KEY, WebDriverLauncher, WebDriverSession};
