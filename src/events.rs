//! # Pipeline Events
//!
//! This module provides a broadcast channel system for emitting progress
//! events while albums are processed. Events are observability only: the
//! batch result never carries per-track outcomes, but a listener can.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Events emitted by the pipeline as it works through a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A fresh browser session is about to open the album page.
    AlbumStarted {
        timestamp: DateTime<Utc>,
        link: String,
        album: String,
    },
    /// The cover image was written to disk.
    ArtworkSaved {
        timestamp: DateTime<Utc>,
        link: String,
        path: PathBuf,
    },
    /// The cover image could not be saved; processing continues.
    ArtworkFailed {
        timestamp: DateTime<Utc>,
        link: String,
        reason: String,
    },
    /// Scrolling settled and the album's track links were read.
    TracksDiscovered {
        timestamp: DateTime<Utc>,
        link: String,
        count: usize,
    },
    /// The converter accepted a track and its download was triggered.
    TrackConverted {
        timestamp: DateTime<Utc>,
        /// 1-based position in the album's track list
        index: usize,
        track: String,
    },
    /// A track failed somewhere in the converter wizard.
    TrackFailed {
        timestamp: DateTime<Utc>,
        /// 1-based position in the album's track list
        index: usize,
        track: String,
        reason: String,
    },
    /// Every track of the album went through the converter.
    AlbumFinished {
        timestamp: DateTime<Utc>,
        link: String,
        converted: usize,
        failed: usize,
    },
    /// The album was abandoned.
    AlbumFailed {
        timestamp: DateTime<Utc>,
        link: String,
        reason: String,
    },
}

/// A handle for receiving pipeline events.
pub type PipelineEventReceiver = broadcast::Receiver<PipelineEvent>;

/// A handle for sending pipeline events.
pub type PipelineEventSender = broadcast::Sender<PipelineEvent>;

/// Creates a new broadcast channel for pipeline events.
///
/// The channel has a default capacity of 256 events.
pub fn create_event_channel() -> (PipelineEventSender, PipelineEventReceiver) {
    broadcast::channel(256)
}

/// Helper trait for emitting pipeline events.
pub trait PipelineEventEmitter {
    fn emit_album_started(&self, link: &str, album: &str);
    fn emit_artwork_saved(&self, link: &str, path: PathBuf);
    fn emit_artwork_failed(&self, link: &str, reason: String);
    fn emit_tracks_discovered(&self, link: &str, count: usize);
    fn emit_track_converted(&self, index: usize, track: &str);
    fn emit_track_failed(&self, index: usize, track: &str, reason: String);
    fn emit_album_finished(&self, link: &str, converted: usize, failed: usize);
    fn emit_album_failed(&self, link: &str, reason: String);
}

impl PipelineEventEmitter for Option<PipelineEventSender> {
    fn emit_album_started(&self, link: &str, album: &str) {
        emit(self, || PipelineEvent::AlbumStarted {
            timestamp: Utc::now(),
            link: link.to_string(),
            album: album.to_string(),
        });
    }

    fn emit_artwork_saved(&self, link: &str, path: PathBuf) {
        emit(self, || PipelineEvent::ArtworkSaved {
            timestamp: Utc::now(),
            link: link.to_string(),
            path,
        });
    }

    fn emit_artwork_failed(&self, link: &str, reason: String) {
        emit(self, || PipelineEvent::ArtworkFailed {
            timestamp: Utc::now(),
            link: link.to_string(),
            reason,
        });
    }

    fn emit_tracks_discovered(&self, link: &str, count: usize) {
        emit(self, || PipelineEvent::TracksDiscovered {
            timestamp: Utc::now(),
            link: link.to_string(),
            count,
        });
    }

    fn emit_track_converted(&self, index: usize, track: &str) {
        emit(self, || PipelineEvent::TrackConverted {
            timestamp: Utc::now(),
            index,
            track: track.to_string(),
        });
    }

    fn emit_track_failed(&self, index: usize, track: &str, reason: String) {
        emit(self, || PipelineEvent::TrackFailed {
            timestamp: Utc::now(),
            index,
            track: track.to_string(),
            reason,
        });
    }

    fn emit_album_finished(&self, link: &str, converted: usize, failed: usize) {
        emit(self, || PipelineEvent::AlbumFinished {
            timestamp: Utc::now(),
            link: link.to_string(),
            converted,
            failed,
        });
    }

    fn emit_album_failed(&self, link: &str, reason: String) {
        emit(self, || PipelineEvent::AlbumFailed {
            timestamp: Utc::now(),
            link: link.to_string(),
            reason,
        });
    }
}

fn emit(sender: &Option<PipelineEventSender>, event: impl FnOnce() -> PipelineEvent) {
    if let Some(sender) = sender {
        let _ = sender.send(event()); // Ignore send errors (no receivers)
    }
}
