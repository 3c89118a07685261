//! Filter Adapter - 外部音频滤镜工具

mod ffmpeg_filter;

pub use ffmpeg_filter::{FfmpegFilter, FfmpegFilterConfig};
