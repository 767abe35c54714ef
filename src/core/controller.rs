use std::time::Instant;

use crate::core::error::LoadError;
use crate::core::state::{ImageOpened, LoadState, PlaybackRequest, VisualState};
use crate::fetch::client::{FetchClient, FetchEvent, FetchRequest};
use crate::fetch::transport::UriScheme;
use crate::playback::decode::{DecodeClient, DecodeEvent, DecodeRequest};
use crate::playback::source::{FrameImage, FrameSource};

/// Handler invoked synchronously (on the UI thread) when an image has been
/// attached and the surface has been laid out at its decoded size.
pub type ImageOpenedHandler = Box<dyn FnMut(ImageOpened)>;

/// The load/playback lifecycle state machine.
///
/// Owns the three user inputs (uri, load-enabled, animate-enabled) and the
/// host lifecycle flags, and drives the fetch/decode/attach pipeline
/// through background workers. All state lives on the UI thread; worker
/// results come back over channels and are applied in [`GifController::poll`],
/// so no locking is needed; mutual exclusion is by construction.
///
/// Every pipeline run is identified by a [`PlaybackRequest`]. Any worker
/// event whose request id no longer matches the live request is stale and is
/// discarded without touching shared state; a stale decode result clears the
/// frame source it built so nothing leaks.
pub struct GifController {
    uri_source: Option<String>,
    can_load: bool,
    is_animating: bool,

    is_attached: bool,
    is_window_activated: bool,
    has_applied_template: bool,

    /// Re-entrancy guard: set before a pipeline run starts, cleared only by
    /// teardown. While set, no second run can start.
    has_image: bool,
    state: LoadState,
    visual_state: VisualState,
    active_request: Option<PlaybackRequest>,
    next_request_id: u64,

    source: Option<Box<dyn FrameSource>>,
    /// Decoded dimensions the surface should take, once attached.
    surface_size: Option<(u32, u32)>,
    /// Last measured surface size reported by the host, as (height, width).
    last_measured: Option<(f32, f32)>,
    /// One-shot: consumed by the next size-changed signal to fire ImageOpened.
    fire_image_opened: bool,
    progress: i32,

    fetch: FetchClient,
    decode: DecodeClient,
    on_image_opened: Option<ImageOpenedHandler>,
}

impl GifController {
    pub fn new() -> Self {
        Self::with_clients(FetchClient::spawn(), DecodeClient::spawn())
    }

    pub(crate) fn with_clients(fetch: FetchClient, decode: DecodeClient) -> Self {
        Self {
            uri_source: None,
            can_load: true,
            is_animating: true,
            is_attached: false,
            is_window_activated: true,
            has_applied_template: false,
            has_image: false,
            state: LoadState::Idle,
            visual_state: VisualState::Unloaded,
            active_request: None,
            next_request_id: 0,
            source: None,
            surface_size: None,
            last_measured: None,
            fire_image_opened: false,
            progress: 0,
            fetch,
            decode,
            on_image_opened: None,
        }
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    pub fn set_uri_source(&mut self, uri: Option<String>) {
        if self.uri_source == uri {
            return;
        }
        self.uri_source = uri;
        self.reset_image();
        self.show_image();
    }

    pub fn set_can_load(&mut self, can_load: bool) {
        if self.can_load == can_load {
            return;
        }
        self.can_load = can_load;
        self.reset_image();
        self.show_image();
    }

    pub fn set_animating(&mut self, is_animating: bool) {
        if self.is_animating == is_animating {
            return;
        }
        self.is_animating = is_animating;
        self.check_timer();
    }

    /// Forces a teardown and a fresh pipeline run for the current uri, even
    /// though the uri did not change. The new run gets a new request id, so
    /// anything still in flight from before is superseded.
    pub fn reload(&mut self) {
        self.reset_image();
        self.show_image();
    }

    pub fn set_on_image_opened(&mut self, handler: ImageOpenedHandler) {
        self.on_image_opened = Some(handler);
    }

    // ------------------------------------------------------------------
    // Host lifecycle hooks
    // ------------------------------------------------------------------

    pub fn on_attach(&mut self) {
        self.is_attached = true;
        self.check_timer();
        self.show_image();
    }

    pub fn on_detach(&mut self) {
        self.is_attached = false;
        self.check_timer();
        self.reset_image();
    }

    pub fn on_template_applied(&mut self) {
        self.has_applied_template = true;
        self.show_image();
    }

    pub fn set_window_activated(&mut self, activated: bool) {
        if self.is_window_activated == activated {
            return;
        }
        self.is_window_activated = activated;
        self.check_timer();
    }

    pub fn on_size_changed(&mut self, height: f32, width: f32) {
        self.last_measured = Some((height, width));
        if self.fire_image_opened {
            self.fire_image_opened = false;
            self.emit_image_opened(height, width);
        }
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// Starts a pipeline run if every precondition holds: uri set, loading
    /// enabled, attached, template applied, and no run active or image held.
    fn show_image(&mut self) {
        if !self.can_load || !self.has_applied_template || !self.is_attached || self.has_image {
            return;
        }
        let Some(uri) = self.uri_source.clone() else {
            return;
        };

        self.set_progress(0);
        self.visual_state = VisualState::Unloaded;

        // Scheme problems are configuration errors: fail before any work.
        let scheme = match UriScheme::parse(&uri) {
            Ok(scheme) => scheme,
            Err(e) => {
                log::error!("Cannot load {}: {}", uri, e);
                self.has_image = true;
                self.fail();
                return;
            }
        };

        self.has_image = true;
        self.next_request_id += 1;
        let request = PlaybackRequest {
            uri: uri.clone(),
            request_id: self.next_request_id,
        };
        log::debug!("Starting pipeline for {} (request {})", uri, request.request_id);

        self.state = LoadState::FetchPending;
        self.fetch.request(FetchRequest {
            request_id: request.request_id,
            uri,
            scheme,
        });
        self.active_request = Some(request);
    }

    /// Applies completed worker events. Must be called from the UI thread,
    /// once per host frame.
    pub fn poll(&mut self) {
        for event in self.fetch.drain_events() {
            match event {
                FetchEvent::Progress {
                    request_id,
                    bytes_received,
                    total_bytes,
                } => self.handle_fetch_progress(request_id, bytes_received, total_bytes),
                FetchEvent::Done { request_id, result } => {
                    self.handle_fetch_done(request_id, result)
                }
            }
        }

        for event in self.decode.drain_events() {
            match event {
                DecodeEvent::Done { request_id, result } => {
                    self.handle_decode_done(request_id, result)
                }
            }
        }
    }

    /// Timer pulse; returns true if the presented frame changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.source.as_mut() {
            Some(source) => source.tick(now),
            None => false,
        }
    }

    fn handle_fetch_progress(&mut self, request_id: u64, bytes_received: u64, total_bytes: u64) {
        if !self.is_current(request_id) || self.state != LoadState::FetchPending {
            return;
        }
        if total_bytes == 0 {
            return;
        }

        let percent = (bytes_received * 100 / total_bytes) as i32;
        if percent != self.progress {
            self.set_progress(percent);
        }
    }

    fn handle_fetch_done(&mut self, request_id: u64, result: Result<Vec<u8>, LoadError>) {
        if !self.is_current(request_id) {
            log::debug!("Discarding stale fetch result (request {})", request_id);
            return;
        }

        match result {
            Ok(bytes) if !bytes.is_empty() => {
                self.state = LoadState::Decoding;
                self.decode.request(DecodeRequest { request_id, bytes });
            }
            Ok(_) => {
                log::error!("Fetch returned an empty body");
                self.fail();
            }
            Err(e) => {
                log::error!("Fetch failed: {}", e);
                self.fail();
            }
        }
    }

    fn handle_decode_done(
        &mut self,
        request_id: u64,
        result: Result<Box<dyn FrameSource>, LoadError>,
    ) {
        if !self.is_current(request_id) {
            // A superseded run cleans up what it allocated, exactly once.
            log::debug!("Discarding stale decode result (request {})", request_id);
            if let Ok(mut source) = result {
                source.clear_resources();
            }
            return;
        }

        match result {
            Ok(source) => self.attach_source(source),
            Err(e) => {
                log::error!("Decode failed: {}", e);
                self.fail();
            }
        }
    }

    fn attach_source(&mut self, mut source: Box<dyn FrameSource>) {
        // Render one frame so something shows even while animation is paused.
        source.render_frame();

        let width = source.width();
        let height = source.height();
        self.surface_size = Some((width, height));
        self.source = Some(source);
        self.state = LoadState::Loaded;
        self.visual_state = VisualState::Loaded;
        self.check_timer();

        // ImageOpened must wait until the measured surface size reflects the
        // new image; the next size-changed signal consumes this flag. If the
        // surface is already at that size no signal will come, so fire now.
        self.fire_image_opened = true;
        if self.last_measured == Some((height as f32, width as f32)) {
            self.fire_image_opened = false;
            self.emit_image_opened(height as f32, width as f32);
        }
    }

    fn fail(&mut self) {
        // has_image stays set: the failed state is terminal until the next
        // input change tears the control down and re-runs the pipeline.
        self.active_request = None;
        self.state = LoadState::Failed;
        self.visual_state = VisualState::Failed;
    }

    /// Tears down the current image and any in-flight pipeline run. Late
    /// worker results become stale the moment the live request is dropped.
    fn reset_image(&mut self) {
        self.active_request = None;
        self.fire_image_opened = false;
        self.surface_size = None;
        self.state = LoadState::Idle;
        self.visual_state = VisualState::Unloaded;

        if !self.has_image {
            return;
        }

        if let Some(mut source) = self.source.take() {
            source.stop();
            source.clear_resources();
        }
        self.has_image = false;
    }

    /// The animation timer runs iff animating is requested, the control is
    /// attached, the window is activated and an image is attached. Start and
    /// stop are idempotent at the source boundary, so recomputing is cheap.
    fn check_timer(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };

        if self.is_animating && self.is_attached && self.is_window_activated {
            source.start();
        } else {
            source.stop();
        }
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.is_attached
            && self.can_load
            && self
                .active_request
                .as_ref()
                .map(|r| r.request_id)
                == Some(request_id)
    }

    fn set_progress(&mut self, progress: i32) {
        self.progress = progress;
    }

    fn emit_image_opened(&mut self, pixel_height: f32, pixel_width: f32) {
        log::debug!("Image opened: {}x{}", pixel_width, pixel_height);
        if let Some(handler) = self.on_image_opened.as_mut() {
            handler(ImageOpened {
                pixel_height,
                pixel_width,
            });
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn uri_source(&self) -> Option<&str> {
        self.uri_source.as_deref()
    }

    pub fn can_load(&self) -> bool {
        self.can_load
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn visual_state(&self) -> VisualState {
        self.visual_state
    }

    pub fn has_image(&self) -> bool {
        self.has_image
    }

    /// Decoded dimensions the surface should be laid out at, when loaded.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface_size
    }

    /// Pixels of the currently presented frame, for texture upload.
    pub fn frame_image(&self) -> Option<&FrameImage> {
        self.source.as_ref().and_then(|s| s.frame_image())
    }

    pub fn is_timer_running(&self) -> bool {
        self.source.as_ref().map(|s| s.is_running()).unwrap_or(false)
    }

    pub fn progress(&self) -> i32 {
        self.progress
    }

    /// Progress text for the host: the percent once any progress was made,
    /// a placeholder before that.
    pub fn progress_label(&self) -> String {
        if self.progress > 0 {
            self.progress.to_string()
        } else {
            "...".to_string()
        }
    }
}

impl Default for GifController {
    fn default() -> Self {
        Self::new()
    }
}
