// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// vitae-document — Resume content pipeline for Vitae.
//
// Provides photo normalization (face-aware portrait cropping with a
// deterministic centre-crop fallback), document assembly (profile record to
// ordered block structure), PDF rendering, and the orchestrator tying the
// stages together.

pub mod doc;
pub mod photo;
pub mod pipeline;

// Re-export the primary types so callers can use `vitae_document::assemble` etc.
pub use doc::assembler::assemble;
pub use doc::blocks::{Block, HeaderBlock, RenderedDocument};
pub use doc::writer::PdfRenderer;
pub use photo::detector::{FaceDetector, NullDetector};
pub use photo::normalizer::{NormalizedPhoto, PhotoNormalizer};
pub use pipeline::ResumePipeline;

#[cfg(feature = "face")]
pub use photo::detector::{DetectorConfig, SeetaDetector};
