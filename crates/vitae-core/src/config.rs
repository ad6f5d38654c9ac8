// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{FaceSelection, PaperSize};

/// Settings for a resume generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Width of the normalized portrait crop in pixels.
    pub portrait_width: u32,
    /// Height of the normalized portrait crop in pixels. Together with the
    /// width this fixes the 3.5:4.5 physical aspect ratio.
    pub portrait_height: u32,
    /// Display width of the photo on the page, in millimetres.
    pub photo_display_mm: f32,
    /// Paper size of the rendered resume.
    pub paper_size: PaperSize,
    /// Which detected face to crop around.
    pub face_selection: FaceSelection,
    /// Directory the finished resume is written to.
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            portrait_width: 413,
            portrait_height: 531,
            // ~1.2 inch, the reference display width.
            photo_display_mm: 30.5,
            paper_size: PaperSize::A4,
            face_selection: FaceSelection::First,
            output_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_portrait_is_passport_ratio() {
        let config = AppConfig::default();
        assert_eq!(config.portrait_width, 413);
        assert_eq!(config.portrait_height, 531);
        // 413:531 is 3.5:4.5 at ~118 px per physical unit.
        let ratio = config.portrait_width as f64 / config.portrait_height as f64;
        assert!((ratio - 3.5 / 4.5).abs() < 0.01);
    }

    #[test]
    fn default_selection_is_first() {
        assert_eq!(AppConfig::default().face_selection, FaceSelection::First);
    }
}
