// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Document assembler — turns a profile record and an optional normalized
// photo into an ordered block structure.
//
// Pure function of its inputs. Absent fields are skipped, never errors:
// input completeness is not guaranteed by the free-form collection upstream.

use tracing::{debug, instrument};
use vitae_core::{FieldValue, HeaderField, ProfileRecord};

use crate::doc::blocks::{Block, HeaderBlock, RenderedDocument};
use crate::photo::normalizer::NormalizedPhoto;

/// Assemble the resume block structure.
///
/// Layout order is fixed: header, spacer, then one section per remaining
/// present field in record insertion order. Header fields never reappear as
/// sections.
#[instrument(skip_all, fields(field_count = record.len()))]
pub fn assemble(record: &ProfileRecord, photo: Option<NormalizedPhoto>) -> RenderedDocument {
    let mut doc = RenderedDocument::new();

    // Header: name and contact lines on the left, photo on the right.
    let mut contacts = Vec::new();
    for field in HeaderField::contact_fields() {
        let Some(value) = record.get(field.as_str()) else {
            continue;
        };
        if let FieldValue::Scalar(text) = value {
            if value.is_present() {
                contacts.push(text.clone());
            }
        }
    }
    doc.push(Block::Header(HeaderBlock {
        name: record.full_name().to_string(),
        contacts,
        photo,
    }));
    doc.push(Block::Spacer);

    // Dynamic sections, in insertion order.
    for (name, value) in record.iter() {
        if HeaderField::matches(name) || !value.is_present() {
            continue;
        }

        doc.push(Block::Heading(name.to_uppercase()));

        match value {
            FieldValue::Table(rows) => {
                doc.push(Block::Table { rows: rows.clone() });
                doc.push(Block::Spacer);
            }
            FieldValue::Scalar(text) => {
                // A newline anywhere makes the whole text one bullet-styled
                // unit, not one bullet per line.
                doc.push(Block::Paragraph {
                    text: text.clone(),
                    bulleted: text.contains('\n'),
                });
            }
        }
    }

    debug!(blocks = doc.len(), "Assembly complete");
    doc
}
