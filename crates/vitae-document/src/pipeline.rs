// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Pipeline orchestrator — raw input to persisted resume.
//
// Data flows one way: raw photo → normalizer → in-memory portrait →
// assembler → PDF bytes → named artifact. Strictly sequential, one unit of
// work per invocation, no shared mutable state between the stages.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};
use vitae_core::error::VitaeError;
use vitae_core::{AppConfig, ProfileRecord, resume_file_name};

use crate::doc::assembler::assemble;
use crate::doc::writer::PdfRenderer;
use crate::photo::detector::FaceDetector;
use crate::photo::normalizer::{NormalizedPhoto, PhotoNormalizer};

/// End-to-end resume generation.
pub struct ResumePipeline {
    config: AppConfig,
}

impl ResumePipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Pipeline with default settings (A4, 413×531 portrait, first face).
    pub fn with_defaults() -> Self {
        Self::new(AppConfig::default())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Generate a resume for `record`, optionally normalizing the photo at
    /// `photo_path`, and persist it under the configured output directory.
    ///
    /// An unreadable photo is not fatal: the resume renders with the
    /// placeholder token instead. The returned path is deterministic —
    /// the identity field with spaces replaced by underscores, plus the
    /// fixed `_Resume.pdf` suffix.
    #[instrument(skip_all, fields(name = record.full_name()))]
    pub fn generate(
        &self,
        record: &ProfileRecord,
        photo_path: Option<&Path>,
        detector: &mut dyn FaceDetector,
    ) -> Result<PathBuf, VitaeError> {
        let photo = photo_path.and_then(|path| self.normalize_photo(path, detector));

        let resume = assemble(record, photo);

        let mut renderer = PdfRenderer::new(self.config.paper_size);
        renderer.set_photo_display_mm(self.config.photo_display_mm);
        let name = record.full_name();
        if !name.is_empty() {
            renderer.set_title(name);
        }

        let out_path = self.config.output_dir.join(resume_file_name(name));
        renderer.write_to_file(&resume, &out_path)?;

        info!(path = %out_path.display(), "Resume saved");
        Ok(out_path)
    }

    /// Normalize the photo, absorbing failure into "no photo".
    fn normalize_photo(
        &self,
        path: &Path,
        detector: &mut dyn FaceDetector,
    ) -> Option<NormalizedPhoto> {
        match PhotoNormalizer::open(path) {
            Ok(normalizer) => Some(
                normalizer
                    .with_selection(self.config.face_selection)
                    .with_target(self.config.portrait_width, self.config.portrait_height)
                    .normalize(detector),
            ),
            Err(err) => {
                warn!(error = %err, "Photo unreadable — continuing without a photo");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::detector::NullDetector;
    use vitae_core::FieldValue;

    fn jane_doe() -> ProfileRecord {
        let mut record = ProfileRecord::new();
        record.insert("Full Name", FieldValue::scalar("Jane Doe"));
        record.insert("Email", FieldValue::scalar("jane@x.com"));
        record.insert("Skills", FieldValue::scalar("Rust"));
        record
    }

    fn pipeline_into(dir: &Path) -> ResumePipeline {
        let config = AppConfig {
            output_dir: dir.to_path_buf(),
            ..AppConfig::default()
        };
        ResumePipeline::new(config)
    }

    #[test]
    fn generates_deterministically_named_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_into(dir.path());

        let path = pipeline
            .generate(&jane_doe(), None, &mut NullDetector)
            .expect("generate");
        assert_eq!(path.file_name().unwrap(), "Jane_Doe_Resume.pdf");
        assert!(path.exists());
    }

    #[test]
    fn unreadable_photo_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_into(dir.path());

        let missing = dir.path().join("no-such-photo.jpg");
        let path = pipeline
            .generate(&jane_doe(), Some(&missing), &mut NullDetector)
            .expect("generate despite bad photo");
        assert!(path.exists());
    }

    #[test]
    fn readable_photo_is_normalized_and_embedded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_into(dir.path());

        let photo_path = dir.path().join("profile.png");
        image::RgbImage::from_fn(120, 160, |x, y| {
            image::Rgb([(x * 2) as u8, (y + 40) as u8, ((x + y) % 256) as u8])
        })
        .save(&photo_path)
        .expect("write sample photo");

        let path = pipeline
            .generate(&jane_doe(), Some(&photo_path), &mut NullDetector)
            .expect("generate");
        assert!(path.exists());
        // A resume with an embedded portrait is noticeably larger than the
        // text-only one.
        let with_photo = std::fs::metadata(&path).expect("metadata").len();
        std::fs::remove_file(&path).expect("cleanup");
        let without = pipeline
            .generate(&jane_doe(), None, &mut NullDetector)
            .expect("generate");
        let text_only = std::fs::metadata(&without).expect("metadata").len();
        assert!(with_photo > text_only);
    }

    #[test]
    fn blank_name_still_produces_an_artifact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pipeline = pipeline_into(dir.path());

        let record = ProfileRecord::new();
        let path = pipeline
            .generate(&record, None, &mut NullDetector)
            .expect("generate");
        assert_eq!(path.file_name().unwrap(), "Resume_Resume.pdf");
    }
}
