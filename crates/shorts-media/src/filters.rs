//! FFmpeg filter graph building for vertical clips.

use std::path::Path;

use shorts_models::{CaptionPosition, CaptionStyle, Resolution};

use crate::geometry::FramePlan;

/// Gaussian blur strength of the padded background.
pub const BACKGROUND_BLUR_SIGMA: f32 = 20.0;

/// Label of the final video stream.
pub const VIDEO_OUTPUT_LABEL: &str = "[vout]";

/// Build the geometry part of the graph. The chain starts at `[0:v]` and ends unlabeled.
pub fn build_frame_filter(plan: &FramePlan, target: Resolution) -> String {
    match *plan {
        FramePlan::Passthrough => "[0:v]null".to_string(),
        FramePlan::Scale { width, height } => {
            format!("[0:v]scale={width}:{height}:flags=lanczos")
        }
        FramePlan::Crop {
            scaled_width,
            scaled_height,
            offset_x,
        } => format!(
            "[0:v]scale={sw}:{sh}:flags=lanczos,crop={tw}:{th}:{ox}:0",
            sw = scaled_width,
            sh = scaled_height,
            tw = target.width,
            th = target.height,
            ox = offset_x,
        ),
        FramePlan::Pad {
            scaled_width,
            scaled_height,
            offset_x,
        } => format!(
            // Background: source stretched to fill the frame, then blurred
            "[0:v]split=2[src_bg][src_fg];\
             [src_bg]scale={tw}:{th}:force_original_aspect_ratio=increase,\
             crop={tw}:{th},\
             gblur=sigma={blur},\
             format=yuv420p[bg];\
             [src_fg]scale={sw}:{sh}:flags=lanczos,\
             format=yuv420p[main];\
             [bg][main]overlay={ox}:0:format=auto",
            tw = target.width,
            th = target.height,
            blur = BACKGROUND_BLUR_SIGMA,
            sw = scaled_width,
            sh = scaled_height,
            ox = offset_x,
        ),
    }
}

/// Build a `drawtext` filter that reads the caption from `textfile`.
pub fn build_caption_filter(textfile: &Path, style: &CaptionStyle, target: Resolution) -> String {
    let margin = target.height / 12;
    let y = match style.position {
        CaptionPosition::Top => margin.to_string(),
        CaptionPosition::Bottom => format!("h-text_h-{}", margin),
    };

    format!(
        "drawtext=textfile={file}:font={font}:fontsize={size}:fontcolor={color}:\
         borderw={border}:bordercolor={border_color}:line_spacing={spacing}:\
         x=(w-text_w)/2:y={y}",
        file = quote_filter_value(&textfile.to_string_lossy()),
        font = quote_filter_value(&style.font),
        size = style.font_size,
        color = style.color,
        border = style.stroke_width,
        border_color = style.stroke_color,
        spacing = style.font_size / 3,
        y = y,
    )
}

/// Full filter graph ending in [`VIDEO_OUTPUT_LABEL`].
pub fn build_filter_graph(
    plan: &FramePlan,
    target: Resolution,
    caption: Option<(&Path, &CaptionStyle)>,
) -> String {
    let mut graph = build_frame_filter(plan, target);
    graph.push_str(",setsar=1");

    if let Some((textfile, style)) = caption {
        graph.push(',');
        graph.push_str(&build_caption_filter(textfile, style, target));
    }

    graph.push_str(VIDEO_OUTPUT_LABEL);
    graph
}

/// Single-quote a filter option value.
fn quote_filter_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "'\\''"))
}
