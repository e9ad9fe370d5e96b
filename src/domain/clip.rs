use std::str::FromStr;

/// Longest clip the service will request, in seconds.
pub const MAX_CLIP_SECONDS: i64 = 120;

/// Whether the downloader trims to the requested range or fetches the whole video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipMode {
    #[default]
    Clip,
    Full,
}

impl FromStr for ClipMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clip" => Ok(ClipMode::Clip),
            "full" => Ok(ClipMode::Full),
            other => Err(format!("unknown clip mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl TimeRange {
    pub fn new(start_seconds: u64, end_seconds: u64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    /// Signed distance from start to end. Negative when end precedes start.
    pub fn raw_duration(&self) -> i64 {
        saturate(self.end_seconds as i128 - self.start_seconds as i128)
    }

    /// Duration bounded above by [`MAX_CLIP_SECONDS`]. End is never moved and
    /// negative or zero durations pass through.
    pub fn clamped_duration(&self) -> i64 {
        clamp_duration(self.raw_duration())
    }

    /// Range selector handed to the downloader for the given mode.
    pub fn window(&self, mode: ClipMode) -> ClipWindow {
        match mode {
            ClipMode::Clip => ClipWindow::Section {
                start_seconds: self.start_seconds,
                duration_seconds: self.clamped_duration(),
            },
            ClipMode::Full => ClipWindow::Whole,
        }
    }
}

pub fn clamp_duration(duration: i64) -> i64 {
    duration.min(MAX_CLIP_SECONDS)
}

fn saturate(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Plain-data description of which part of the source to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipWindow {
    Whole,
    Section {
        start_seconds: u64,
        duration_seconds: i64,
    },
}

impl ClipWindow {
    /// Section end as passed to the extraction tool (`start + duration`).
    pub fn end_seconds(&self) -> Option<i64> {
        match self {
            ClipWindow::Whole => None,
            ClipWindow::Section {
                start_seconds,
                duration_seconds,
            } => Some(saturate(*start_seconds as i128 + *duration_seconds as i128)),
        }
    }
}
