// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Core domain types for the Vitae resume builder.

use serde::{Deserialize, Serialize};

/// Reserved marker for a field the user left blank.
///
/// A field holding this marker (or the empty string) is treated as absent
/// for rendering purposes even though its key stays in the record.
pub const NOT_AVAILABLE: &str = "NA";

/// One row of the education table: degree, institution, year, grade.
pub type TableRow = [String; 4];

/// Value of a single profile field.
///
/// The closed set of variants turns the assembler's branch on structural
/// shape into an exhaustive match instead of a runtime shape check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free-form text. May hold the NA marker or be empty — both count as
    /// absent.
    Scalar(String),
    /// Ordered rows of four cells each (degree, institution, year, grade).
    Table(Vec<TableRow>),
}

impl FieldValue {
    /// Convenience constructor for scalar text.
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::Scalar(text.into())
    }

    /// Presence test: a scalar is present iff it is non-empty and not the NA
    /// marker; a table is present iff it has at least one row.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Scalar(text) => !text.is_empty() && text != NOT_AVAILABLE,
            Self::Table(rows) => !rows.is_empty(),
        }
    }
}

/// Profile fields that belong to the resume header and are therefore
/// excluded from dynamic section rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderField {
    FullName,
    Email,
    Phone,
    Address,
    LinkedIn,
}

impl HeaderField {
    /// Canonical field name as collected from the user.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Address => "Address",
            Self::LinkedIn => "LinkedIn",
        }
    }

    /// All header fields.
    pub const ALL: [HeaderField; 5] = [
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::Address,
        Self::LinkedIn,
    ];

    /// Contact fields in the fixed order they appear under the name.
    pub const fn contact_fields() -> [HeaderField; 4] {
        [Self::Email, Self::Phone, Self::Address, Self::LinkedIn]
    }

    /// Whether `name` denotes a header field.
    pub fn matches(name: &str) -> bool {
        Self::ALL.iter().any(|field| field.as_str() == name)
    }
}

/// An ordered mapping from field name to value.
///
/// Insertion order is preserved and significant: dynamic resume sections
/// render in exactly this order. Field names are unique — inserting an
/// existing name replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    fields: Vec<(String, FieldValue)>,
}

impl ProfileRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. Replacement keeps the field's original
    /// position.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The identity field, used for the header and the output file name.
    /// Empty when the field is missing or tabular.
    pub fn full_name(&self) -> &str {
        match self.get(HeaderField::FullName.as_str()) {
            Some(FieldValue::Scalar(text)) => text,
            _ => "",
        }
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Serialize the record to pretty-printed JSON for exchange.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a record from JSON produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Axis-aligned face bounding box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Centre point of the box.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Policy for choosing which detected face to crop around.
///
/// The reference behaviour is `First`: whatever box the detector returned
/// first, with no ranking. `Largest` and `MostCentered` are quality-oriented
/// alternatives behind the same seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceSelection {
    #[default]
    First,
    Largest,
    MostCentered,
}

impl FaceSelection {
    /// Pick a face from `faces` according to the policy. Returns `None` when
    /// no faces were detected.
    pub fn select(&self, faces: &[FaceBox], img_width: u32, img_height: u32) -> Option<FaceBox> {
        match self {
            Self::First => faces.first().copied(),
            Self::Largest => faces.iter().max_by_key(|f| f.area()).copied(),
            Self::MostCentered => {
                let image_center = (img_width as f64 / 2.0, img_height as f64 / 2.0);
                faces
                    .iter()
                    .min_by(|a, b| {
                        let da = dist_sq(a.center(), image_center);
                        let db = dist_sq(b.center(), image_center);
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .copied()
            }
        }
    }
}

fn dist_sq(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)
}

/// Standard paper sizes for the rendered resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    Letter,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::Letter => (216, 279),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Deterministic output file name for a resume: spaces in the identity field
/// become underscores, with a fixed suffix. A blank name falls back to
/// `Resume`, matching the header rendering.
pub fn resume_file_name(full_name: &str) -> String {
    let base = if full_name.is_empty() {
        "Resume"
    } else {
        full_name
    };
    format!("{}_Resume.pdf", base.replace(' ', "_"))
}
