//! Report rendering

pub mod json;
pub mod terminal;

use crate::OutputFormat;
use faultline_core::FaultlineConfig;

/// Command line flag first, then `[output] format`
pub fn resolve_format(flag: Option<OutputFormat>, config: &FaultlineConfig) -> OutputFormat {
    if let Some(format) = flag {
        return format;
    }
    match config.output.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Terminal,
    }
}
