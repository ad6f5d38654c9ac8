// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Face-detection seam for the photo normalizer.
//
// The normalizer consumes detection through the `FaceDetector` trait so the
// crop logic stays independent of any particular detector. `NullDetector`
// reports no faces (every photo then takes the centre-crop fallback); the
// model-backed `SeetaDetector` is available behind the `face` feature gate:
//
// ```toml
// vitae-document = { path = "crates/vitae-document", features = ["face"] }
// ```

use image::GrayImage;
use vitae_core::FaceBox;

/// A face-detection capability.
///
/// Given a single-channel luminance image, returns zero or more axis-aligned
/// bounding boxes in pixel coordinates. Detection is synchronous and has no
/// side effects beyond internal detector state.
pub trait FaceDetector {
    fn detect(&mut self, luma: &GrayImage) -> Vec<FaceBox>;
}

/// Detector that never finds a face.
///
/// Used when no detection model is available. The normalizer then always
/// takes its deterministic centre-crop fallback, so a resume is still
/// produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDetector;

impl FaceDetector for NullDetector {
    fn detect(&mut self, _luma: &GrayImage) -> Vec<FaceBox> {
        Vec::new()
    }
}

#[cfg(feature = "face")]
mod seeta {
    use std::path::{Path, PathBuf};

    use image::GrayImage;
    use tracing::{debug, info, instrument};
    use vitae_core::FaceBox;
    use vitae_core::error::VitaeError;

    use super::FaceDetector;

    /// Well-known filename of the SeetaFace frontal detection model.
    const MODEL_FILENAME: &str = "seeta_fd_frontal_v1.0.bin";

    /// Default directory for the cached detection model.
    ///
    /// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/vitae`,
    /// falling back to `~/.cache/vitae` when `XDG_CACHE_HOME` is unset.
    fn default_model_dir() -> PathBuf {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            PathBuf::from(xdg).join("vitae")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".cache").join("vitae")
        } else {
            // Last resort — current directory.
            PathBuf::from("vitae-models")
        }
    }

    /// Configuration for constructing a [`SeetaDetector`].
    #[derive(Debug, Clone)]
    pub struct DetectorConfig {
        /// Path to the SeetaFace frontal detection model (`.bin`).
        pub model_path: PathBuf,
    }

    impl Default for DetectorConfig {
        /// Returns a config pointing at the default model cache directory.
        fn default() -> Self {
            Self {
                model_path: default_model_dir().join(MODEL_FILENAME),
            }
        }
    }

    impl DetectorConfig {
        /// Create a config pointing at a specific model file.
        pub fn from_path(model: impl Into<PathBuf>) -> Self {
            Self {
                model_path: model.into(),
            }
        }

        /// Create a config with an explicit model directory.
        ///
        /// Expects the directory to contain `seeta_fd_frontal_v1.0.bin`.
        pub fn from_dir(dir: impl AsRef<Path>) -> Self {
            Self {
                model_path: dir.as_ref().join(MODEL_FILENAME),
            }
        }

        /// Verify that the model file exists and is readable.
        pub fn validate(&self) -> Result<(), VitaeError> {
            if !self.model_path.exists() {
                return Err(VitaeError::DetectorError(format!(
                    "face detection model not found at {}; download {} from \
                     <https://github.com/atomashpolskiy/rustface/tree/master/model>",
                    self.model_path.display(),
                    MODEL_FILENAME
                )));
            }
            Ok(())
        }
    }

    /// Face detector backed by the pure-Rust SeetaFace frontal model.
    ///
    /// Wraps the `rustface` detector with Vitae-specific error handling and
    /// logging. Sensitivity parameters are fixed — they are part of the
    /// pipeline's contract, not tunables.
    pub struct SeetaDetector {
        detector: Box<dyn rustface::Detector>,
    }

    impl SeetaDetector {
        /// Create a detector, loading the model from the path in `config`.
        ///
        /// Model loading is the expensive step — keep the detector around
        /// and call [`detect`](FaceDetector::detect) per photo.
        ///
        /// # Errors
        ///
        /// Returns [`VitaeError::DetectorError`] if the model file is missing
        /// or corrupt.
        #[instrument(skip_all, fields(model = %config.model_path.display()))]
        pub fn new(config: DetectorConfig) -> Result<Self, VitaeError> {
            config.validate()?;

            info!("Loading face detection model");
            let mut detector =
                rustface::create_detector(config.model_path.to_string_lossy().as_ref()).map_err(
                    |err| {
                        VitaeError::DetectorError(format!(
                            "failed to load face detection model from {}: {}",
                            config.model_path.display(),
                            err
                        ))
                    },
                )?;

            // Fixed sensitivity configuration.
            detector.set_min_face_size(20);
            detector.set_score_thresh(2.0);
            detector.set_pyramid_scale_factor(0.8);
            detector.set_slide_window_step(4, 4);

            info!("Face detector initialised");
            Ok(Self { detector })
        }

        /// Create a detector using the default model cache directory.
        ///
        /// Equivalent to `SeetaDetector::new(DetectorConfig::default())`.
        pub fn with_defaults() -> Result<Self, VitaeError> {
            Self::new(DetectorConfig::default())
        }
    }

    impl FaceDetector for SeetaDetector {
        #[instrument(skip_all, fields(width = luma.width(), height = luma.height()))]
        fn detect(&mut self, luma: &GrayImage) -> Vec<FaceBox> {
            let (width, height) = luma.dimensions();
            let source = rustface::ImageData::new(luma.as_raw(), width, height);
            let faces = self.detector.detect(&source);
            debug!(face_count = faces.len(), "Face detection complete");

            faces
                .iter()
                .filter_map(|face| {
                    let bbox = face.bbox();
                    // The detector can report boxes starting slightly outside
                    // the frame; shift them in and drop anything fully out.
                    let x = bbox.x().max(0) as u32;
                    let y = bbox.y().max(0) as u32;
                    if x >= width || y >= height {
                        return None;
                    }
                    Some(FaceBox {
                        x,
                        y,
                        width: bbox.width().min(width - x),
                        height: bbox.height().min(height - y),
                    })
                })
                .collect()
        }
    }

    /// Check whether the detection model exists in the default cache
    /// location.
    pub fn model_available() -> bool {
        DetectorConfig::default().model_path.exists()
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn default_config_points_to_cache_dir() {
            let config = DetectorConfig::default();
            let path = config.model_path.to_string_lossy();
            assert!(
                path.ends_with(MODEL_FILENAME),
                "model path should end with {MODEL_FILENAME}, got {path}"
            );
        }

        #[test]
        fn config_from_dir() {
            let config = DetectorConfig::from_dir("/tmp/face-models");
            assert_eq!(
                config.model_path,
                PathBuf::from("/tmp/face-models/seeta_fd_frontal_v1.0.bin")
            );
        }

        #[test]
        fn validate_missing_model() {
            let config = DetectorConfig::from_dir("/nonexistent/path/face-models");
            assert!(config.validate().is_err());
        }
    }
}

#[cfg(feature = "face")]
pub use seeta::{DetectorConfig, SeetaDetector, model_available};
