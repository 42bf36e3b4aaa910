//! Infinite-scroll track discovery.
//!
//! The source page renders its track list lazily as the viewport moves, and
//! its scrollable height grows while that happens. The collector scrolls in
//! fixed steps and re-reads the live height on every tick until the distance
//! covered reaches the bottom, then reads the rendered elements once.

use crate::config::ScrollSettings;
use crate::session::BrowserPage;
use crate::{Result, RipError};
use serde::Deserialize;
use std::time::Duration;

/// Live page geometry sampled on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetrics {
    /// `document.body.scrollHeight` before the tick's scroll.
    pub scroll_height: i64,
    /// `window.innerHeight`.
    pub inner_height: i64,
}

/// Samples the height and then scrolls, so the sample reflects the page as it
/// was before this tick moved it.
fn tick_script(step_px: u32) -> String {
    format!(
        "(() => {{ const scrollHeight = document.body.scrollHeight; \
         window.scrollBy(0, {step_px}); \
         return {{ scrollHeight, innerHeight: window.innerHeight }}; }})()"
    )
}

/// Scrolls a page until its lazily loaded content stops growing.
#[derive(Debug, Clone)]
pub struct ScrollCollector {
    step_px: u32,
    interval: Duration,
    max_ticks: Option<u32>,
}

impl Default for ScrollCollector {
    fn default() -> Self {
        Self::new(&ScrollSettings::default())
    }
}

impl ScrollCollector {
    pub fn new(settings: &ScrollSettings) -> Self {
        Self {
            step_px: settings.step_px,
            interval: settings.interval(),
            max_ticks: settings.max_ticks,
        }
    }

    /// Scroll until the cumulative distance reaches the live
    /// `scrollHeight - innerHeight`. Returns the number of ticks taken.
    ///
    /// The interval elapses before every tick, including the first.
    pub async fn settle(&self, page: &dyn BrowserPage) -> Result<u32> {
        let script = tick_script(self.step_px);
        let mut distance: i64 = 0;
        let mut ticks: u32 = 0;

        loop {
            tokio::time::sleep(self.interval).await;

            let value = page.evaluate(&script).await?;
            let metrics: ScrollMetrics = serde_json::from_value(value)
                .map_err(|e| RipError::Parse(format!("Unexpected scroll metrics: {e}")))?;
            distance += i64::from(self.step_px);
            ticks += 1;

            let threshold = metrics.scroll_height - metrics.inner_height;
            log::trace!("Scroll tick {ticks}: {distance}px of {threshold}px");

            if distance >= threshold {
                log::debug!("Scrolling settled after {ticks} ticks ({distance}px)");
                return Ok(ticks);
            }

            if self.max_ticks.is_some_and(|max| ticks >= max) {
                log::warn!(
                    "Stopped scrolling after {ticks} ticks with {}px still unrendered",
                    threshold - distance
                );
                return Ok(ticks);
            }
        }
    }

    /// Settle the page, then read `attribute` from every element matching
    /// `selector` in document order.
    ///
    /// Fails with [`RipError::TrackDiscovery`] when nothing matched. `link`
    /// only labels that error.
    pub async fn collect_all(
        &self,
        page: &dyn BrowserPage,
        link: &str,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>> {
        self.settle(page).await?;

        let elements = page.query_all(selector).await?;
        let mut values = Vec::with_capacity(elements.len());
        for element in &elements {
            match element.read_attribute(attribute).await? {
                Some(value) => values.push(value),
                None => log::debug!("Skipping '{selector}' element without '{attribute}'"),
            }
        }

        log::info!("Found {} tracks on {link}", values.len());

        if values.is_empty() {
            return Err(RipError::TrackDiscovery {
                link: link.to_string(),
            });
        }
        Ok(values)
    }
}
