// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Frame analyzer tuning
pub mod analyzer {
    /// Maximum dimension for decode processing; larger frames are downscaled.
    /// QR codes are typically large enough in the viewfinder to survive this.
    pub const MAX_PROCESS_DIMENSION: u32 = 640;
}

/// Capture pipeline tuning
pub mod pipeline {
    /// Preferred capture width (cameras may negotiate something close)
    pub const DEFAULT_WIDTH: u32 = 1280;
    /// Preferred capture height
    pub const DEFAULT_HEIGHT: u32 = 720;

    /// Appsink buffer cap; old frames are dropped beyond this.
    pub const MAX_BUFFERS: u32 = 2;

    /// Capacity of the pipeline -> subscription frame channel
    pub const FRAME_CHANNEL_CAPACITY: usize = 4;

    /// Capacity of the subscription -> UI message channel
    pub const UI_CHANNEL_CAPACITY: usize = 8;
}

/// Timeouts and logging cadence
pub mod timing {
    /// Seconds to wait for the pipeline to reach PLAYING
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Seconds to wait for the pipeline to reach NULL on teardown
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Log frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 120;
}
