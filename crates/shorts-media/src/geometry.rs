//! Frame geometry for fitting a source into a target frame.
//!
//! A source whose aspect differs from the target is scaled to the target
//! height. The scaled frame is then center-cropped when it is too wide, or
//! composited over a blurred fill when it is too narrow.

use shorts_models::{AspectRatio, Resolution};

/// How a source frame is mapped onto the target frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    /// Source already matches the target; no scale, crop or pad.
    Passthrough,
    /// Same aspect, different size: scale straight to the target.
    Scale { width: u32, height: u32 },
    /// Scaled frame is wider than the target: keep a centered window.
    Crop {
        scaled_width: u32,
        scaled_height: u32,
        offset_x: u32,
    },
    /// Scaled frame is narrower than the target: center it over a blurred fill.
    Pad {
        scaled_width: u32,
        scaled_height: u32,
        offset_x: u32,
    },
}

impl FramePlan {
    /// Whether the plan changes the frame at all.
    pub fn is_identity(&self) -> bool {
        matches!(self, FramePlan::Passthrough)
    }

    /// Frame size produced by applying this plan to a source of `source` size.
    pub fn output_size(&self, source: Resolution, target: Resolution) -> Resolution {
        match self {
            FramePlan::Passthrough => source,
            _ => target,
        }
    }
}

/// Width of a `src_width`x`src_height` frame scaled to `target_height`, floored.
pub fn scaled_width(src_width: u32, src_height: u32, target_height: u32) -> u32 {
    if src_height == 0 {
        return 0;
    }
    (u64::from(target_height) * u64::from(src_width) / u64::from(src_height)) as u32
}

/// Plan the geometry correction for a source frame.
pub fn plan_frame(
    src_width: u32,
    src_height: u32,
    target: Resolution,
    target_aspect: AspectRatio,
) -> FramePlan {
    if target_aspect.matches(src_width, src_height) {
        if src_width == target.width && src_height == target.height {
            return FramePlan::Passthrough;
        }
        return FramePlan::Scale {
            width: target.width,
            height: target.height,
        };
    }

    let scaled_height = target.height;
    let scaled_width = scaled_width(src_width, src_height, target.height);

    if scaled_width > target.width {
        FramePlan::Crop {
            scaled_width,
            scaled_height,
            offset_x: (scaled_width - target.width) / 2,
        }
    } else if scaled_width < target.width {
        FramePlan::Pad {
            scaled_width,
            scaled_height,
            offset_x: (target.width - scaled_width) / 2,
        }
    } else {
        // Rounding landed exactly on the target width.
        FramePlan::Scale {
            width: target.width,
            height: target.height,
        }
    }
}
