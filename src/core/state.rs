/// Position of the control in the load pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No pipeline running and no image attached.
    Idle,
    /// Bytes are being fetched for the current request.
    FetchPending,
    /// Fetched bytes are being decoded into a frame source.
    Decoding,
    /// A decoded source is attached to the surface.
    Loaded,
    /// The last pipeline run failed; waiting for an input change or reload.
    Failed,
}

/// Visual state the host should render. Mirrors the load pipeline but only
/// distinguishes what actually looks different on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualState {
    /// Nothing attached yet; show the progress placeholder while fetching.
    Unloaded,
    /// Load failed; show the reload affordance.
    Failed,
    /// Image attached and sized.
    Loaded,
}

/// One attempt to fetch+decode+attach an image.
///
/// Requests are immutable; a newer request supersedes an older one by
/// carrying a higher `request_id`. Worker results are tagged with the id of
/// the request that produced them, which is how stale results are told apart
/// from current ones, including after a reload of an unchanged uri.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub uri: String,
    pub request_id: u64,
}

/// Dimensions reported by the `ImageOpened` notification, measured after the
/// surface has been laid out at the decoded size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageOpened {
    pub pixel_height: f32,
    pub pixel_width: f32,
}
