// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Photo normalizer — face-aware portrait cropping.
//
// Locates a face, pads the detection box, crops the original colour image
// and resizes to a fixed 3.5:4.5 portrait. When no face is found the crop
// falls back to a deterministic centre band. Once the source decodes, the
// normalizer always produces some photo.

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument};
use vitae_core::error::VitaeError;
use vitae_core::{FaceBox, FaceSelection};

use super::detector::FaceDetector;

/// Fraction of the face box height added above the crop.
const PAD_TOP: f64 = 0.5;
/// Fraction of the face box height added below the crop.
const PAD_BOTTOM: f64 = 0.5;
/// Fraction of the face box width added on each side of the crop.
const PAD_SIDE: f64 = 0.3;

/// Default portrait resolution (3.5:4.5 physical aspect).
pub const PORTRAIT_WIDTH: u32 = 413;
pub const PORTRAIT_HEIGHT: u32 = 531;

/// Photo normalization pipeline operating on a single in-memory image.
///
/// Construction is the only fallible step — an unreadable or undecodable
/// source fails immediately and produces no output. Normalization itself
/// always succeeds by falling back to the centre crop.
pub struct PhotoNormalizer {
    /// The source photo in its original colour space.
    image: DynamicImage,
    /// Which detected face to crop around.
    selection: FaceSelection,
    /// Target portrait resolution (width, height).
    target: (u32, u32),
}

impl PhotoNormalizer {
    // -- Construction ---------------------------------------------------------

    /// Load the source photo from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, VitaeError> {
        let image = image::open(path.as_ref()).map_err(|err| {
            VitaeError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(
            width = image.width(),
            height = image.height(),
            "Source photo loaded"
        );
        Ok(Self::from_dynamic(image))
    }

    /// Create a normalizer from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, VitaeError> {
        let image = image::load_from_memory(data).map_err(|err| {
            VitaeError::ImageError(format!("failed to decode photo: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Photo decoded from bytes"
        );
        Ok(Self::from_dynamic(image))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image,
            selection: FaceSelection::default(),
            target: (PORTRAIT_WIDTH, PORTRAIT_HEIGHT),
        }
    }

    /// Override the face-selection policy (default: first detected face).
    pub fn with_selection(mut self, selection: FaceSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Override the target portrait resolution.
    pub fn with_target(mut self, width: u32, height: u32) -> Self {
        self.target = (width.max(1), height.max(1));
        self
    }

    // -- Normalization --------------------------------------------------------

    /// Produce the fixed-resolution portrait crop.
    ///
    /// Detection runs on a luminance copy; the crop operates on the original
    /// colour image. Zero detected faces is not an error — the centre-crop
    /// fallback applies. The final resize ignores the crop's aspect ratio,
    /// an accepted lossy step.
    #[instrument(skip_all, fields(width = self.image.width(), height = self.image.height()))]
    pub fn normalize(self, detector: &mut dyn FaceDetector) -> NormalizedPhoto {
        let (img_w, img_h) = (self.image.width(), self.image.height());

        let luma = self.image.to_luma8();
        let faces = detector.detect(&luma);
        debug!(face_count = faces.len(), "Detection complete");

        let (x, y, w, h) = match self.selection.select(&faces, img_w, img_h) {
            Some(face) => {
                info!(
                    face.x,
                    face.y,
                    face.width,
                    face.height,
                    "Cropping around detected face"
                );
                padded_crop_rect(face, img_w, img_h)
            }
            None => {
                info!("No face detected — using centre-crop fallback");
                center_crop_rect(img_w, img_h)
            }
        };

        let cropped = self.image.crop_imm(x, y, w, h);
        let (target_w, target_h) = self.target;
        let portrait =
            cropped.resize_exact(target_w, target_h, image::imageops::FilterType::Lanczos3);

        debug!(target_w, target_h, "Portrait resize complete");
        NormalizedPhoto { image: portrait }
    }
}

/// Expand a face box by the fixed padding ratios and clamp the result to the
/// image bounds. Returns `(x, y, width, height)`.
fn padded_crop_rect(face: FaceBox, img_w: u32, img_h: u32) -> (u32, u32, u32, u32) {
    let pad_top = (face.height as f64 * PAD_TOP) as u32;
    let pad_bottom = (face.height as f64 * PAD_BOTTOM) as u32;
    let pad_side = (face.width as f64 * PAD_SIDE) as u32;

    let x1 = face.x.saturating_sub(pad_side).min(img_w.saturating_sub(1));
    let y1 = face.y.saturating_sub(pad_top).min(img_h.saturating_sub(1));
    let x2 = face
        .x
        .saturating_add(face.width)
        .saturating_add(pad_side)
        .min(img_w);
    let y2 = face
        .y
        .saturating_add(face.height)
        .saturating_add(pad_bottom)
        .min(img_h);

    (
        x1,
        y1,
        x2.saturating_sub(x1).max(1),
        y2.saturating_sub(y1).max(1),
    )
}

/// Centre-crop fallback: the vertical full extent of the image and the
/// horizontal middle band `[0.25w, 0.75w)`.
fn center_crop_rect(img_w: u32, img_h: u32) -> (u32, u32, u32, u32) {
    let x1 = (img_w as f64 * 0.25) as u32;
    let x2 = (img_w as f64 * 0.75) as u32;
    (x1, 0, x2.saturating_sub(x1).max(1), img_h.max(1))
}

/// The fixed-resolution portrait crop produced by the normalizer.
///
/// Owns its pixel buffer and is handed to the assembler by value — there is
/// no on-disk transient between the two pipeline stages, so nothing needs
/// cleaning up on any exit path.
#[derive(Debug, Clone)]
pub struct NormalizedPhoto {
    image: DynamicImage,
}

impl NormalizedPhoto {
    /// Portrait width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Portrait height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the photo and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// Encode as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, VitaeError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)
            .map_err(|err| VitaeError::ImageError(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, VitaeError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| VitaeError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the portrait to a file. The format is inferred from the file
    /// extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), VitaeError> {
        self.image.save(path.as_ref()).map_err(|err| {
            VitaeError::ImageError(format!(
                "failed to save photo to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

impl PartialEq for NormalizedPhoto {
    fn eq(&self, other: &Self) -> bool {
        self.image.width() == other.image.width()
            && self.image.height() == other.image.height()
            && self.image.as_bytes() == other.image.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::detector::{FaceDetector, NullDetector};
    use image::{GrayImage, Rgb, RgbImage};

    /// Detector stub returning a fixed set of boxes.
    struct FixedDetector(Vec<FaceBox>);

    impl FaceDetector for FixedDetector {
        fn detect(&mut self, _luma: &GrayImage) -> Vec<FaceBox> {
            self.0.clone()
        }
    }

    fn sample_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 120, 150])))
    }

    #[test]
    fn padded_rect_expands_by_fixed_ratios() {
        let face = FaceBox { x: 80, y: 80, width: 40, height: 40 };
        let (x, y, w, h) = padded_crop_rect(face, 200, 200);
        // 30% of 40 = 12 on each side; 50% of 40 = 20 above and below.
        assert_eq!((x, y), (68, 60));
        assert_eq!((w, h), (64, 80));
    }

    #[test]
    fn padded_rect_clamps_to_image_bounds() {
        let face = FaceBox { x: 2, y: 3, width: 50, height: 50 };
        let (x, y, w, h) = padded_crop_rect(face, 60, 60);
        assert_eq!((x, y), (0, 0));
        assert_eq!((w, h), (60, 60));

        // Never extends past the far edges either.
        let face = FaceBox { x: 40, y: 40, width: 30, height: 30 };
        let (x, y, w, h) = padded_crop_rect(face, 80, 80);
        assert!(x + w <= 80);
        assert!(y + h <= 80);
    }

    #[test]
    fn padded_rect_survives_out_of_range_boxes() {
        // A box a misbehaving detector might report.
        let face = FaceBox { x: 500, y: 500, width: 40, height: 40 };
        let (x, y, w, h) = padded_crop_rect(face, 100, 100);
        assert!(x < 100 && y < 100);
        assert!(w >= 1 && h >= 1);
        assert!(x + w <= 100 && y + h <= 100);
    }

    #[test]
    fn center_rect_selects_middle_band() {
        let (x, y, w, h) = center_crop_rect(100, 80);
        assert_eq!((x, y, w, h), (25, 0, 50, 80));

        // Odd widths truncate the same way the float formula does.
        let (x, _, w, _) = center_crop_rect(103, 80);
        assert_eq!(x, 25);
        assert_eq!(w, 52); // [25, 77)
    }

    #[test]
    fn face_path_produces_exact_target_resolution() {
        let normalizer = PhotoNormalizer::from_dynamic(sample_image(200, 200));
        let mut detector = FixedDetector(vec![FaceBox {
            x: 80,
            y: 60,
            width: 40,
            height: 50,
        }]);
        let photo = normalizer.normalize(&mut detector);
        assert_eq!((photo.width(), photo.height()), (413, 531));
    }

    #[test]
    fn fallback_path_produces_exact_target_resolution() {
        let normalizer = PhotoNormalizer::from_dynamic(sample_image(640, 480));
        let photo = normalizer.normalize(&mut NullDetector);
        assert_eq!((photo.width(), photo.height()), (413, 531));
    }

    #[test]
    fn first_face_wins_by_default() {
        // Two boxes with very different luminance regions; crop around the
        // first one and check the crop picked the expected region by colour.
        let mut img = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        for y in 20..60 {
            for x in 20..60 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let normalizer = PhotoNormalizer::from_dynamic(DynamicImage::ImageRgb8(img));
        let mut detector = FixedDetector(vec![
            FaceBox { x: 20, y: 20, width: 40, height: 40 },
            FaceBox { x: 120, y: 120, width: 60, height: 60 },
        ]);
        let photo = normalizer.normalize(&mut detector);
        // The centre of the portrait comes from the white square.
        let rgb = photo.as_dynamic().to_rgb8();
        let center = rgb.get_pixel(206, 265);
        assert!(center.0[0] > 200, "expected crop around the first face");
    }

    #[test]
    fn custom_target_resolution() {
        let normalizer =
            PhotoNormalizer::from_dynamic(sample_image(100, 100)).with_target(100, 120);
        let photo = normalizer.normalize(&mut NullDetector);
        assert_eq!((photo.width(), photo.height()), (100, 120));
    }

    #[test]
    fn tiny_source_still_normalizes() {
        let normalizer = PhotoNormalizer::from_dynamic(sample_image(1, 1));
        let photo = normalizer.normalize(&mut NullDetector);
        assert_eq!((photo.width(), photo.height()), (413, 531));
    }

    #[test]
    fn undecodable_bytes_fail() {
        let result = PhotoNormalizer::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(VitaeError::ImageError(_))));
    }

    #[test]
    fn missing_path_fails() {
        let result = PhotoNormalizer::open("/nonexistent/profile.jpg");
        assert!(matches!(result, Err(VitaeError::ImageError(_))));
    }

    #[test]
    fn png_round_trip() {
        let photo = PhotoNormalizer::from_dynamic(sample_image(50, 50))
            .normalize(&mut NullDetector);
        let bytes = photo.to_png_bytes().expect("encode");
        let reloaded = PhotoNormalizer::from_bytes(&bytes).expect("decode");
        assert_eq!(reloaded.image.width(), 413);
    }

    #[test]
    fn save_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("portrait.png");
        let photo = PhotoNormalizer::from_dynamic(sample_image(50, 50))
            .normalize(&mut NullDetector);
        photo.save(&path).expect("save");
        assert!(path.exists());
    }
}
