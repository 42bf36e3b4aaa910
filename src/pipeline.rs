use crate::album::{derive_identifier, extract_cover_reference};
use crate::artwork::ArtworkPersister;
use crate::config::PipelineConfig;
use crate::convert::ConversionDriver;
use crate::events::{
    create_event_channel, PipelineEventEmitter, PipelineEventReceiver, PipelineEventSender,
};
use crate::scroll::ScrollCollector;
use crate::session::{BrowserLauncher, BrowserPage, SessionOptions, WaitUntil};
use crate::{Result, RipError};
use http_client::HttpClient;
use serde::{Deserialize, Serialize};

/// One album whose tracks were discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSummary {
    pub link: String,
    pub album: String,
    pub track_count: usize,
}

/// What a batch run reports back.
///
/// Failed albums only show up in `links`; per-track outcomes are in the logs
/// and the event stream, never here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Every link that was attempted, in order.
    pub links: Vec<String>,
    /// Albums that got as far as converting tracks.
    pub albums: Vec<AlbumSummary>,
}

/// The single-link result, which carries the discovered tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumReport {
    pub link: String,
    pub album: String,
    /// Track links in page order, duplicates included.
    pub tracks: Vec<String>,
}

impl AlbumReport {
    fn summary(&self) -> AlbumSummary {
        AlbumSummary {
            link: self.link.clone(),
            album: self.album.clone(),
            track_count: self.tracks.len(),
        }
    }
}

/// Split a comma separated `links` value into source links.
///
/// Blank entries are dropped; no links at all is an input error.
pub fn parse_links(param: &str) -> Result<Vec<String>> {
    let links: Vec<String> = param
        .split(',')
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .collect();

    if links.is_empty() {
        return Err(RipError::Input("provide `links` query param".to_string()));
    }
    Ok(links)
}

/// Runs albums through discovery, artwork and conversion, one at a time.
///
/// # Examples
///
/// ```rust,no_run
/// use albumrip::{Pipeline, PipelineConfig};
/// use albumrip::chromium::ChromiumLauncher;
///
/// # tokio_test::block_on(async {
/// let http_client = http_client::native::NativeClient::new();
/// let pipeline = Pipeline::new(
///     ChromiumLauncher::new(),
///     Box::new(http_client),
///     PipelineConfig::default(),
/// );
///
/// let report = pipeline
///     .run(&["https://soundcloud.com/artist/sets/album".to_string()])
///     .await;
/// println!("Attempted {} links", report.links.len());
/// # });
/// ```
pub struct Pipeline<L> {
    launcher: L,
    http: Box<dyn HttpClient>,
    config: PipelineConfig,
    events: Option<PipelineEventSender>,
}

impl<L: BrowserLauncher> Pipeline<L> {
    pub fn new(launcher: L, http: Box<dyn HttpClient>, config: PipelineConfig) -> Self {
        Self {
            launcher,
            http,
            config,
            events: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get a receiver for progress events, creating the channel on first use.
    pub fn subscribe(&mut self) -> PipelineEventReceiver {
        match &self.events {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = create_event_channel();
                self.events = Some(sender);
                receiver
            }
        }
    }

    /// Process every link in order.
    ///
    /// Each album runs inside its own failure boundary: an error is logged
    /// with the offending link and the next link proceeds. This never fails.
    pub async fn run(&self, links: &[String]) -> BatchReport {
        let mut report = BatchReport::default();

        for link in links {
            report.links.push(link.clone());
            match self.process_album(link).await {
                Ok(album) => {
                    log::info!("done processing link {link}");
                    report.albums.push(album.summary());
                }
                Err(e) => {
                    log::error!("Failed to process {link}: {e}");
                    self.events.emit_album_failed(link, e.to_string());
                }
            }
        }

        report
    }

    /// Process one link without an album boundary; failures reach the caller.
    pub async fn run_single(&self, link: &str) -> Result<AlbumReport> {
        let result = self.process_album(link).await;
        if let Err(e) = &result {
            self.events.emit_album_failed(link, e.to_string());
        }
        result
    }

    async fn process_album(&self, link: &str) -> Result<AlbumReport> {
        let album = derive_identifier(link);
        if album.is_empty() {
            return Err(RipError::Input(format!(
                "cannot derive an album name from '{link}'"
            )));
        }

        let album_dir = self.config.album_dir(&album);
        let options = SessionOptions {
            download_dir: album_dir,
            headless: self.config.headless,
            block_ads: self.config.block_ads,
        };

        log::info!("Processing album '{album}' from {link}");
        self.events.emit_album_started(link, &album);

        let mut page = self.launcher.launch(&options).await?;
        let result = self.drive_album(page.as_ref(), link, &album, &options).await;
        if let Err(e) = page.close().await {
            log::warn!("Failed to close browser for {link}: {e}");
        }

        result
    }

    async fn drive_album(
        &self,
        page: &dyn BrowserPage,
        link: &str,
        album: &str,
        options: &SessionOptions,
    ) -> Result<AlbumReport> {
        let site = &self.config.site;

        page.goto(link, WaitUntil::NetworkIdle, site.source.page_load_timeout())
            .await?;

        // The cover reference only holds for this navigation
        match extract_cover_reference(page, &site.source.cover).await {
            Ok(cover) => {
                let persister =
                    ArtworkPersister::new(self.http.as_ref(), &self.config.artwork_filename);
                match persister.persist(&cover, &options.download_dir).await {
                    Some(path) => self.events.emit_artwork_saved(link, path),
                    None => self
                        .events
                        .emit_artwork_failed(link, "cover image was not saved".to_string()),
                }
            }
            Err(e) => {
                log::warn!("No album cover for {link}: {e}");
                self.events.emit_artwork_failed(link, e.to_string());
            }
        }

        let tracks = ScrollCollector::new(&site.scroll)
            .collect_all(page, link, &site.source.track, &site.source.track_attribute)
            .await?;
        log::info!("processing {} urls", tracks.len());
        self.events.emit_tracks_discovered(link, tracks.len());

        let driver = ConversionDriver::new(page, &site.converter);
        driver.open(link).await?;

        let mut converted = 0;
        let mut failed = 0;
        for (position, track) in tracks.iter().enumerate() {
            let index = position + 1;
            log::info!("{index}: processing url {track}");

            match driver.convert(track).await {
                Ok(()) => {
                    converted += 1;
                    self.events.emit_track_converted(index, track);
                }
                Err(e) => {
                    failed += 1;
                    self.events.emit_track_failed(index, track, e.to_string());
                    if !self.config.isolate_track_failures {
                        return Err(e);
                    }
                    log::warn!("Track {index} ({track}) failed: {e}");
                    // The wizard is mid-cycle; only the start page is a known Idle state
                    driver.open(link).await?;
                }
            }
        }

        self.events.emit_album_finished(link, converted, failed);

        Ok(AlbumReport {
            link: link.to_string(),
            album: album.to_string(),
            tracks,
        })
    }
}
