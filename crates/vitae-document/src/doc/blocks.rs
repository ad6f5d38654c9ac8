// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Block model for an assembled resume.
//
// A `RenderedDocument` is an ordered, append-only sequence of blocks. Block
// order equals the traversal order over the profile's sections; once pushed,
// a block is never mutated.

use vitae_core::TableRow;

use crate::photo::normalizer::NormalizedPhoto;

/// Placeholder token rendered when no photo was produced.
pub const NO_PHOTO_PLACEHOLDER: &str = "[No Photo]";

/// Column headers of the education table.
pub const TABLE_HEADER: [&str; 4] = ["Degree/Course", "Institution", "Year", "Grade/CGPA"];

/// The two-column identity block at the top of the resume.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderBlock {
    /// Identity field, rendered in large bold type.
    pub name: String,
    /// Contact lines in fixed order; only present values appear.
    pub contacts: Vec<String>,
    /// Normalized portrait, or `None` for the placeholder text.
    pub photo: Option<NormalizedPhoto>,
}

/// One block of the assembled document.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Two-column identity/photo header.
    Header(HeaderBlock),
    /// Uppercase section title, drawn with a bottom-border rule.
    Heading(String),
    /// Free-text block. `bulleted` renders the whole text as a single
    /// bullet-styled unit.
    Paragraph { text: String, bulleted: bool },
    /// Fixed four-column grid: a bold [`TABLE_HEADER`] row followed by the
    /// data rows, in order.
    Table { rows: Vec<TableRow> },
    /// Vertical gap.
    Spacer,
}

/// Ordered, append-only block sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    blocks: Vec<Block>,
}

impl RenderedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block. Blocks are never mutated or reordered afterwards.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// The blocks in append order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
