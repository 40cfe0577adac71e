//! Frame clock driven by the host's animation timestamp.

#[cfg(feature = "web")]
use web_sys::window;

#[cfg(not(feature = "web"))]
use std::time::Instant;

/// Timing snapshot shared by every per-frame component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// Seconds since the host's time origin. Kept wide so hours-long
    /// sessions still resolve milliseconds.
    pub time: f64,
    /// Seconds since the previous frame. Zero on the first frame.
    pub delta: f32,
    /// Value of `time` when the output surface was last resized.
    pub last_resize_time: f64,
}

impl FrameState {
    /// Seconds elapsed since the last resize.
    #[inline]
    pub fn time_since_resize(&self) -> f32 {
        (self.time - self.last_resize_time) as f32
    }
}

/// Converts monotonic millisecond timestamps into [`FrameState`] snapshots.
pub struct FrameClock {
    state: FrameState,
    /// Previous timestamp in seconds, `None` before the first tick.
    last_time: Option<f64>,

    #[cfg(not(feature = "web"))]
    origin: Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a clock that has not seen a frame yet.
    pub fn new() -> Self {
        Self {
            state: FrameState::default(),
            last_time: None,
            #[cfg(not(feature = "web"))]
            origin: Instant::now(),
        }
    }

    /// Current high-resolution time in milliseconds, for hosts that do not
    /// hand out their own animation timestamp.
    pub fn now_millis(&self) -> f64 {
        #[cfg(feature = "web")]
        {
            window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or(0.0)
        }

        #[cfg(not(feature = "web"))]
        {
            self.origin.elapsed().as_secs_f64() * 1000.0
        }
    }

    /// Advance to the given timestamp (milliseconds).
    ///
    /// A timestamp older than the previous one yields a zero delta instead of a
    /// negative one.
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameState {
        let time = timestamp_ms * 0.001;
        let delta = match self.last_time {
            None => 0.0,
            Some(last) if time < last => {
                log::warn!("frame timestamp went backwards by {:.4}s", last - time);
                0.0
            }
            Some(last) => time - last,
        };
        self.last_time = Some(time);
        self.state.time = time;
        self.state.delta = delta as f32;
        self.state
    }

    /// Record that the output surface was resized at the current frame time.
    pub fn mark_resized(&mut self) {
        self.state.last_resize_time = self.state.time;
    }

    /// The most recent snapshot.
    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether at least one frame has been ticked.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.last_time.is_some()
    }
}
