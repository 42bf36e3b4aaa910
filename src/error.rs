use std::time::Duration;
use thiserror::Error;

/// Error types for album ripping operations.
///
/// The variants follow the failure units of the pipeline: some are fatal for
/// the whole request, some only for one album or one track, and some are
/// always swallowed.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use albumrip::{Pipeline, PipelineConfig, RipError};
/// use albumrip::chromium::ChromiumLauncher;
///
/// #[tokio::main]
/// async fn main() {
///     let http_client = http_client::native::NativeClient::new();
///     let pipeline = Pipeline::new(
///         ChromiumLauncher::new(),
///         Box::new(http_client),
///         PipelineConfig::default(),
///     );
///
///     match pipeline.run_single("https://soundcloud.com/artist/sets/album").await {
///         Ok(report) => println!("Converted {} tracks", report.tracks.len()),
///         Err(RipError::TrackDiscovery { link }) => eprintln!("No tracks on {link}"),
///         Err(RipError::FormLayout { element, .. }) => eprintln!("Converter changed: {element}"),
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum RipError {
    /// The request did not carry a usable source link.
    ///
    /// Fatal for the whole request.
    #[error("Invalid input: {0}")]
    Input(String),

    /// Scrolling settled but the source page rendered no track links.
    ///
    /// Fatal for the album, never for the batch.
    #[error("No tracks found on {link}")]
    TrackDiscovery {
        /// The album page that produced no tracks
        link: String,
    },

    /// An element the converter wizard always renders was not on the page.
    ///
    /// This usually means the converter site changed its markup or the
    /// previous navigation landed somewhere unexpected.
    #[error("Converter form is missing the {element} ({selector})")]
    FormLayout {
        /// Human readable name of the missing control
        element: String,
        /// Selector that matched nothing
        selector: String,
    },

    /// A navigation did not finish within its time budget.
    #[error("Navigation did not complete within {timeout:?}")]
    NavigationTimeout {
        /// The budget that elapsed
        timeout: Duration,
    },

    /// Cover artwork could not be located, fetched or written.
    ///
    /// Always logged and swallowed; the tracks are the primary deliverable.
    #[error("Artwork failed: {0}")]
    Artwork(String),

    /// The browser automation layer reported an error.
    #[error("Browser error: {0}")]
    Browser(String),

    /// HTTP/network related errors outside the browser.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse page markup or script output.
    #[error("Failed to parse: {0}")]
    Parse(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RipError {
    pub(crate) fn form_layout(element: &str, selector: &str) -> Self {
        RipError::FormLayout {
            element: element.to_string(),
            selector: selector.to_string(),
        }
    }
}

impl From<config::ConfigError> for RipError {
    fn from(err: config::ConfigError) -> Self {
        RipError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RipError {
    fn from(err: serde_json::Error) -> Self {
        RipError::Parse(err.to_string())
    }
}
