//! Chromium implementation of the browser session traits.
//!
//! Drives a real Chromium over the DevTools protocol with `chromiumoxide`.
//! Each [`ChromiumLauncher::launch`] starts a separate browser process whose
//! download directory is fixed for its whole lifetime.

use crate::session::{BrowserLauncher, BrowserPage, PageElement, SessionOptions, WaitUntil};
use crate::{Result, RipError};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

/// URL patterns blocked when ad blocking is enabled.
const AD_PATTERNS: &[&str] = &[
    "*doubleclick.net*",
    "*googlesyndication.com*",
    "*googleadservices.com*",
    "*google-analytics.com*",
    "*googletagmanager.com*",
    "*adservice.google.*",
    "*amazon-adsystem.com*",
    "*adnxs.com*",
    "*taboola.com*",
    "*outbrain.com*",
    "*popads.net*",
    "*propellerads.com*",
    "*scorecardresearch.com*",
    "*quantserve.com*",
];

/// How long the network must stay quiet after the load event.
const NETWORK_IDLE_SETTLE: Duration = Duration::from_millis(500);

const READY_STATE_POLL: Duration = Duration::from_millis(100);

/// Set on the current document before every click. A document that still
/// carries it has not been replaced yet.
const DEPARTED_MARKER: &str = "__albumripDeparted";

fn mark_departed_script() -> String {
    format!("window.{DEPARTED_MARKER} = true")
}

/// Reports `"departed"` while the clicked document is still showing,
/// otherwise the new document's `readyState`.
fn arrival_script() -> String {
    format!("window.{DEPARTED_MARKER} === true ? 'departed' : document.readyState")
}

fn has_arrived(state: &serde_json::Value) -> bool {
    state.as_str() == Some("complete")
}

fn cdp(err: CdpError) -> RipError {
    RipError::Browser(err.to_string())
}

/// Launches local Chromium processes.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl ChromiumLauncher {
    /// Use the Chromium that `chromiumoxide` finds on this machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific browser binary.
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Pass an additional command line flag to every launched browser.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    fn browser_config(&self, options: &SessionOptions) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        builder = builder
            .arg("--disable-notifications")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        for arg in &self.extra_args {
            builder = builder.arg(arg);
        }
        builder.build().map_err(RipError::Browser)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserPage>> {
        let config = self.browser_config(options)?;
        log::debug!(
            "Launching browser (headless: {}, downloads: {})",
            options.headless,
            options.download_dir.display()
        );

        let (browser, mut handler) = Browser::launch(config).await.map_err(cdp)?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("Browser handler error: {e}");
                }
            }
            log::debug!("Browser handler task ended");
        });

        let page = browser.new_page("about:blank").await.map_err(cdp)?;

        let download = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(options.download_dir.to_string_lossy().to_string())
            .build()
            .map_err(RipError::Browser)?;
        page.execute(download).await.map_err(cdp)?;

        if options.block_ads {
            let blocked = SetBlockedUrLsParams {
                urls: AD_PATTERNS.iter().map(|p| p.to_string()).collect(),
            };
            page.execute(blocked).await.map_err(cdp)?;
            log::debug!("Blocking {} ad/tracker patterns", AD_PATTERNS.len());
        }

        Ok(Box::new(ChromiumPage {
            browser: Some(browser),
            page,
            handler_task: Some(handler_task),
        }))
    }
}

/// One page of a launched Chromium, owning the browser process.
pub struct ChromiumPage {
    browser: Option<Browser>,
    page: Page,
    handler_task: Option<JoinHandle<()>>,
}

impl ChromiumPage {
    async fn wait_for_network_idle(&self) -> Result<()> {
        loop {
            let state: String = self
                .page
                .evaluate("document.readyState")
                .await
                .map_err(cdp)?
                .into_value()
                .unwrap_or_default();
            if state == "complete" {
                break;
            }
            tokio::time::sleep(READY_STATE_POLL).await;
        }
        tokio::time::sleep(NETWORK_IDLE_SETTLE).await;
        Ok(())
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str, wait: WaitUntil, timeout: Duration) -> Result<()> {
        log::debug!("Navigating to {url}");
        let navigation = async {
            self.page.goto(url).await.map_err(cdp)?;
            if wait == WaitUntil::NetworkIdle {
                self.wait_for_network_idle().await?;
            }
            Ok::<(), RipError>(())
        };
        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| RipError::NavigationTimeout { timeout })?
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>> {
        let elements = self.page.find_elements(selector).await.map_err(cdp)?;
        Ok(elements
            .into_iter()
            .map(|element| {
                Box::new(ChromiumElement {
                    element,
                    page: self.page.clone(),
                }) as Box<dyn PageElement>
            })
            .collect())
    }

    async fn query(&self, selector: &str) -> Result<Option<Box<dyn PageElement>>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self.page.evaluate(script).await.map_err(cdp)?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.map_err(cdp)
    }

    /// Poll until the document that was showing at the last click has been
    /// replaced and the new one finished loading. Evaluation errors while the
    /// old context is torn down count as "not yet".
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<()> {
        let script = arrival_script();
        let arrival = async {
            loop {
                match self.page.evaluate(script.as_str()).await {
                    Ok(result) => {
                        let state = result.into_value().unwrap_or(serde_json::Value::Null);
                        if has_arrived(&state) {
                            return;
                        }
                    }
                    Err(e) => log::trace!("Page not ready for evaluation yet: {e}"),
                }
                tokio::time::sleep(READY_STATE_POLL).await;
            }
        };
        tokio::time::timeout(timeout, arrival)
            .await
            .map_err(|_| RipError::NavigationTimeout { timeout })
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut browser) = self.browser.take() {
            browser.close().await.map_err(cdp)?;
            if let Err(e) = browser.wait().await {
                log::debug!("Browser process did not exit cleanly: {e}");
            }
        }
        if let Some(handler_task) = self.handler_task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), handler_task).await;
        }
        Ok(())
    }
}

/// A DOM node of a [`ChromiumPage`].
pub struct ChromiumElement {
    element: Element,
    page: Page,
}

#[async_trait]
impl PageElement for ChromiumElement {
    async fn type_text(&self, text: &str) -> Result<()> {
        self.element.focus().await.map_err(cdp)?;
        self.element.type_str(text).await.map_err(cdp)?;
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        self.page
            .evaluate(mark_departed_script())
            .await
            .map_err(cdp)?;
        self.element.click().await.map_err(cdp)?;
        Ok(())
    }

    async fn read_attribute(&self, name: &str) -> Result<Option<String>> {
        if let Some(serde_json::Value::String(value)) =
            self.element.property(name).await.map_err(cdp)?
        {
            return Ok(Some(value));
        }
        self.element.attribute(name).await.map_err(cdp)
    }
}
