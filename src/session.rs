use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// The page's load event fired.
    Load,
    /// The load event fired and the network went quiet afterwards.
    NetworkIdle,
}

/// Per-album browser launch options.
///
/// Every album gets its own browser, so the download directory is passed in
/// explicitly instead of living in shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Where the browser's native download mechanism saves files.
    pub download_dir: PathBuf,
    pub headless: bool,
    /// Block known ad and tracker hosts before any navigation.
    pub block_ads: bool,
}

/// An opaque handle to one element of the live page.
///
/// Implementations wrap whatever node handle the automation library uses.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Focus the element and type `text` into it verbatim.
    async fn type_text(&self, text: &str) -> Result<()>;

    /// Click the element.
    async fn click(&self) -> Result<()>;

    /// Read an attribute, preferring the resolved DOM property when one
    /// exists (so `href` comes back absolute).
    async fn read_attribute(&self, name: &str) -> Result<Option<String>>;
}

/// A single automated browser page.
///
/// This trait is the seam between the pipeline and the browser automation
/// library. The pipeline only ever drives one page at a time and awaits every
/// call before issuing the next.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockBrowserPage`,
/// `MockPageElement` and `MockBrowserLauncher` generated by `mockall`.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate to `url` and wait for `wait`, failing with
    /// [`RipError::NavigationTimeout`](crate::RipError::NavigationTimeout)
    /// once `timeout` elapses.
    async fn goto(&self, url: &str, wait: WaitUntil, timeout: Duration) -> Result<()>;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>>;

    /// The first element matching `selector`, if any.
    async fn query(&self, selector: &str) -> Result<Option<Box<dyn PageElement>>>;

    /// Evaluate a script in the page and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// The page's current serialized markup.
    async fn content(&self) -> Result<String>;

    /// Wait for the navigation triggered by a previous action to finish.
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<()>;

    /// Close the page and its browser.
    async fn close(&mut self) -> Result<()>;
}

/// Starts fresh browser sessions.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a new browser configured with `options` and open one blank page.
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserPage>>;
}
