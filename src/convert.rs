//! # Converter wizard driver
//!
//! The converter is a human-facing wizard with one page per step and no batch
//! API, so every track walks the full cycle:
//!
//! ```text
//! Idle --submit url--> Submitted --result page--> ResultShown
//!   ^                                                  |
//!   +----back to form---- Downloaded <--click download-+
//! ```
//!
//! Any missing control fails the track with [`RipError::FormLayout`]; any
//! navigation that outlives the configured budget fails it with
//! [`RipError::NavigationTimeout`]. Nothing is retried.

use crate::config::ConverterSite;
use crate::session::{BrowserPage, PageElement, WaitUntil};
use crate::{Result, RipError};

/// Where the wizard is for the track being converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    /// The input form is showing.
    Idle,
    /// The track URL was submitted; the result page is loading.
    Submitted,
    /// The result page with the download control is showing.
    ResultShown,
    /// The download was triggered.
    Downloaded,
}

/// Drives the converter for one album on a shared page.
///
/// Calls must not overlap; the page carries the wizard's state between them.
pub struct ConversionDriver<'a> {
    page: &'a dyn BrowserPage,
    site: &'a ConverterSite,
}

impl<'a> ConversionDriver<'a> {
    pub fn new(page: &'a dyn BrowserPage, site: &'a ConverterSite) -> Self {
        Self { page, site }
    }

    /// Navigate to the converter's start page for `source_link`.
    pub async fn open(&self, source_link: &str) -> Result<()> {
        let url = self.site.start_url_for(source_link);
        log::debug!("Opening converter at {url}");
        self.page
            .goto(&url, WaitUntil::NetworkIdle, self.site.navigation_timeout())
            .await
    }

    /// Run one track through the whole wizard, ending back on the input form.
    pub async fn convert(&self, track_link: &str) -> Result<()> {
        let mut state = self.advance(ConversionState::Idle, track_link).await?;
        while state != ConversionState::Idle {
            state = self.advance(state, track_link).await?;
        }
        Ok(())
    }

    /// Perform the single step leaving `state` and return the state reached.
    pub async fn advance(&self, state: ConversionState, track_link: &str) -> Result<ConversionState> {
        let next = match state {
            ConversionState::Idle => {
                let input = self.require(&self.site.input_selector, "url input").await?;
                input.type_text(track_link).await?;

                let submit = self
                    .require(&self.site.submit_selector, "submit control")
                    .await?;
                submit.click().await?;
                ConversionState::Submitted
            }
            ConversionState::Submitted => {
                self.page
                    .wait_for_navigation(self.site.navigation_timeout())
                    .await?;
                ConversionState::ResultShown
            }
            ConversionState::ResultShown => {
                let download = self
                    .require(&self.site.download_selector, "download control")
                    .await?;
                download.click().await?;
                ConversionState::Downloaded
            }
            ConversionState::Downloaded => {
                let home = self
                    .require(&self.site.home_selector, "link back to the form")
                    .await?;
                home.click().await?;
                self.page
                    .wait_for_navigation(self.site.navigation_timeout())
                    .await?;
                ConversionState::Idle
            }
        };
        log::debug!("{state:?} -> {next:?} for {track_link}");
        Ok(next)
    }

    async fn require(&self, selector: &str, element: &str) -> Result<Box<dyn PageElement>> {
        self.page
            .query(selector)
            .await?
            .ok_or_else(|| RipError::form_layout(element, selector))
    }
}
