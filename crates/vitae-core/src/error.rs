// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Unified error types for Vitae.
//
// The taxonomy is deliberately shallow: once the source photo decodes and the
// record is well-formed, the pipeline favours producing a complete document
// over failing fast. Conditions like "no face found" or "field absent" are
// absorbed into fallback behaviour and never surface here.

use thiserror::Error;

/// Top-level error type for all Vitae operations.
#[derive(Debug, Error)]
pub enum VitaeError {
    // -- Photo errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("face detector unavailable: {0}")]
    DetectorError(String),

    // -- Document errors --
    #[error("PDF generation failed: {0}")]
    PdfError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VitaeError>;
