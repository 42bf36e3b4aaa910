pub mod album;
pub mod artwork;
pub mod chromium;
pub mod config;
pub mod convert;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod scroll;
pub mod server;
pub mod session;

pub use artwork::ArtworkPersister;
pub use config::{ConverterSite, PipelineConfig, ScrollSettings, SiteProfile, SourceSelectors};
pub use convert::{ConversionDriver, ConversionState};
pub use error::RipError;
pub use events::{
    create_event_channel, PipelineEvent, PipelineEventEmitter, PipelineEventReceiver,
    PipelineEventSender,
};
pub use pipeline::{parse_links, AlbumReport, AlbumSummary, BatchReport, Pipeline};
pub use scroll::ScrollCollector;
pub use session::{BrowserLauncher, BrowserPage, PageElement, SessionOptions, WaitUntil};

#[cfg(feature = "mock")]
pub use session::{MockBrowserLauncher, MockBrowserPage, MockPageElement};

pub type Result<T> = std::result::Result<T, RipError>;
