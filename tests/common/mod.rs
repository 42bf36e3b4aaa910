#![allow(dead_code)]

use albumrip::{
    BrowserLauncher, BrowserPage, PageElement, PipelineConfig, Result, RipError, SessionOptions,
    WaitUntil,
};
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::StatusCode;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One album page served by [`FakeSite`].
#[derive(Debug, Clone, Default)]
pub struct FakeAlbum {
    pub tracks: Vec<String>,
    pub cover: Option<String>,
}

/// Everything the fake browsers did, shared across launches.
#[derive(Debug, Default)]
pub struct Recorder {
    pub launches: Vec<SessionOptions>,
    pub visits: Vec<String>,
    pub downloads: Vec<String>,
    pub closed: usize,
}

/// A scripted source site plus converter, served to every launched browser.
#[derive(Clone, Default)]
pub struct FakeSite {
    albums: HashMap<String, FakeAlbum>,
    stalling_tracks: HashSet<String>,
    pub recorder: Arc<Mutex<Recorder>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn album(mut self, link: &str, tracks: &[&str], cover: Option<&str>) -> Self {
        self.albums.insert(
            link.to_string(),
            FakeAlbum {
                tracks: tracks.iter().map(|t| t.to_string()).collect(),
                cover: cover.map(str::to_string),
            },
        );
        self
    }

    /// The converter never finishes loading the result page for `track`.
    pub fn stall_on(mut self, track: &str) -> Self {
        self.stalling_tracks.insert(track.to_string());
        self
    }

    pub fn downloads(&self) -> Vec<String> {
        self.recorder.lock().unwrap().downloads.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.recorder.lock().unwrap().launches.len()
    }

    pub fn closed_count(&self) -> usize {
        self.recorder.lock().unwrap().closed
    }
}

#[async_trait]
impl BrowserLauncher for FakeSite {
    async fn launch(&self, options: &SessionOptions) -> Result<Box<dyn BrowserPage>> {
        self.recorder.lock().unwrap().launches.push(options.clone());
        Ok(Box::new(FakePage {
            site: self.clone(),
            state: Arc::new(Mutex::new(PageState::default())),
        }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Stage {
    #[default]
    Form,
    Submitted,
    Result,
    Downloaded,
}

#[derive(Debug, Default)]
struct PageState {
    url: String,
    typed: String,
    stage: Stage,
}

const TRACK_SELECTOR: &str = "a.trackItem__trackTitle";
const INPUT_SELECTOR: &str = "input[class=form-control]";
const BUTTON_SELECTOR: &str = "button[type=submit]";
const HOME_SELECTOR: &str = r#"a[href="https://www.soundcloudme.com"]"#;

struct FakePage {
    site: FakeSite,
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    fn current_album(&self) -> Option<FakeAlbum> {
        let url = self.state.lock().unwrap().url.clone();
        self.site.albums.get(&url).cloned()
    }

    fn on_converter(&self) -> bool {
        self.state
            .lock()
            .unwrap()
            .url
            .starts_with("https://www.soundcloudme.com/")
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str, _wait: WaitUntil, _timeout: Duration) -> Result<()> {
        self.site.recorder.lock().unwrap().visits.push(url.to_string());
        let mut state = self.state.lock().unwrap();
        state.url = url.to_string();
        state.stage = Stage::Form;
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn PageElement>>> {
        if selector == TRACK_SELECTOR {
            let tracks = self.current_album().map(|a| a.tracks).unwrap_or_default();
            return Ok(tracks
                .into_iter()
                .map(|href| Box::new(TrackAnchor { href }) as Box<dyn PageElement>)
                .collect());
        }
        Ok(self.query(selector).await?.into_iter().collect())
    }

    async fn query(&self, selector: &str) -> Result<Option<Box<dyn PageElement>>> {
        if !self.on_converter() {
            return Ok(None);
        }
        let stage = self.state.lock().unwrap().stage;
        let present = match selector {
            INPUT_SELECTOR => stage == Stage::Form,
            BUTTON_SELECTOR => matches!(stage, Stage::Form | Stage::Result),
            HOME_SELECTOR => stage == Stage::Downloaded,
            _ => false,
        };
        if !present {
            return Ok(None);
        }
        Ok(Some(Box::new(Control {
            selector: selector.to_string(),
            site: self.site.clone(),
            state: self.state.clone(),
        })))
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::json!({ "scrollHeight": 800, "innerHeight": 800 }))
    }

    async fn content(&self) -> Result<String> {
        let cover = self.current_album().and_then(|album| album.cover);
        Ok(match cover {
            Some(cover) => format!(
                r#"<html><body><span aria-role="img" style="background-image: url(&quot;{cover}&quot;);"></span></body></html>"#
            ),
            None => "<html><body></body></html>".to_string(),
        })
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.stage {
            Stage::Submitted => {
                if self.site.stalling_tracks.contains(&state.typed) {
                    return Err(RipError::NavigationTimeout { timeout });
                }
                state.stage = Stage::Result;
            }
            Stage::Form => {}
            other => panic!("Unexpected navigation wait in {other:?}"),
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.site.recorder.lock().unwrap().closed += 1;
        Ok(())
    }
}

struct TrackAnchor {
    href: String,
}

#[async_trait]
impl PageElement for TrackAnchor {
    async fn type_text(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        Ok(())
    }

    async fn read_attribute(&self, name: &str) -> Result<Option<String>> {
        Ok((name == "href").then(|| self.href.clone()))
    }
}

struct Control {
    selector: String,
    site: FakeSite,
    state: Arc<Mutex<PageState>>,
}

#[async_trait]
impl PageElement for Control {
    async fn type_text(&self, text: &str) -> Result<()> {
        self.state.lock().unwrap().typed = text.to_string();
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.stage = match (state.stage, self.selector.as_str()) {
            (Stage::Form, BUTTON_SELECTOR) => Stage::Submitted,
            (Stage::Result, BUTTON_SELECTOR) => {
                self.site
                    .recorder
                    .lock()
                    .unwrap()
                    .downloads
                    .push(state.typed.clone());
                Stage::Downloaded
            }
            (Stage::Downloaded, HOME_SELECTOR) => {
                state.typed.clear();
                Stage::Form
            }
            (stage, selector) => panic!("Unexpected click on {selector} in {stage:?}"),
        };
        Ok(())
    }

    async fn read_attribute(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Serves the same image bytes for any URL, or a fixed error status.
#[derive(Debug, Clone)]
pub struct StubImages {
    pub status: StatusCode,
}

impl StubImages {
    pub fn ok() -> Self {
        Self {
            status: StatusCode::Ok,
        }
    }
}

pub const COVER_BYTES: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

#[async_trait]
impl HttpClient for StubImages {
    async fn send(&self, _req: Request) -> std::result::Result<Response, http_types::Error> {
        let mut response = Response::new(self.status);
        if self.status.is_success() {
            response.set_body(COVER_BYTES.to_vec());
        }
        Ok(response)
    }
}

/// Config rooted at `root` with no scroll delay.
pub fn test_config(root: &Path) -> PipelineConfig {
    let mut config = PipelineConfig {
        storage_root: root.to_path_buf(),
        ..PipelineConfig::default()
    };
    config.site.scroll.interval_ms = 0;
    config
}
