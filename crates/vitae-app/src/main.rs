// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Vitae contributors
//
// Vitae — interactive resume builder.
//
// Entry point. Initialises logging, collects profile fields from the
// console, wires up the best available face detector, and runs the
// generation pipeline.

use std::io::{self, Write};
use std::path::PathBuf;

use vitae_core::{FieldValue, NOT_AVAILABLE, ProfileRecord};
use vitae_document::photo::detector::{FaceDetector, NullDetector};
use vitae_document::pipeline::ResumePipeline;

/// Scalar fields collected up front; the first is the identity field.
const STANDARD_FIELDS: [&str; 6] = [
    "Full Name",
    "Email",
    "Phone",
    "Address",
    "LinkedIn",
    "Objective",
];

/// Free-text sections collected after education.
const TEXT_FIELDS: [&str; 3] = ["Experience", "Skills", "Projects"];

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Vitae starting");

    println!("--- Vitae Resume Builder ---");

    let record = collect_profile();
    let photo_path = collect_photo_path();

    let mut detector = make_detector();
    let pipeline = ResumePipeline::with_defaults();

    match pipeline.generate(&record, photo_path.as_deref(), detector.as_mut()) {
        Ok(path) => println!("\nSuccess! Resume saved as: {}", path.display()),
        Err(err) => {
            tracing::error!(error = %err, "resume generation failed");
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Prompt for every profile field, preserving the collection order in the
/// record. Blank answers become the NA marker so the field keeps its slot.
fn collect_profile() -> ProfileRecord {
    let mut record = ProfileRecord::new();

    for field in STANDARD_FIELDS {
        let input = prompt(&format!("Enter {field}: "));
        record.insert(field, scalar_or_na(input));
    }

    // Education rows for the table section.
    println!("\n--- Education Details ---");
    let mut education = Vec::new();
    loop {
        let degree = prompt("Degree (e.g., B.Tech) [press Enter to finish education]: ");
        if degree.is_empty() {
            break;
        }
        let institution = prompt("Institution/University: ");
        let year = prompt("Year of Passing: ");
        let grade = prompt("Grade/Percentage: ");
        education.push([degree, institution, year, grade]);
        println!("---");
    }
    let education_value = if education.is_empty() {
        FieldValue::scalar(NOT_AVAILABLE)
    } else {
        FieldValue::Table(education)
    };
    record.insert("Education", education_value);

    println!("\n(Tip: for lists, type bullets yourself or just use new lines)");
    for field in TEXT_FIELDS {
        let input = prompt(&format!("Enter {field}: "));
        record.insert(field, scalar_or_na(input));
    }

    record
}

/// Ask for the photo path; `NA` or a blank answer means no photo.
fn collect_photo_path() -> Option<PathBuf> {
    let input = prompt("\nEnter path to your photo (e.g., profile.jpg) or 'NA': ");
    (!input.is_empty() && !input.eq_ignore_ascii_case(NOT_AVAILABLE)).then(|| PathBuf::from(input))
}

fn scalar_or_na(input: String) -> FieldValue {
    if input.is_empty() {
        FieldValue::scalar(NOT_AVAILABLE)
    } else {
        FieldValue::Scalar(input)
    }
}

/// Print `message` and read one trimmed line from stdin.
fn prompt(message: &str) -> String {
    print!("{message}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}

/// The model-backed detector when available, otherwise the null detector
/// (every photo then takes the centre-crop fallback).
fn make_detector() -> Box<dyn FaceDetector> {
    #[cfg(feature = "face")]
    {
        match vitae_document::photo::detector::SeetaDetector::with_defaults() {
            Ok(detector) => return Box::new(detector),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "face detector unavailable — photos will be centre-cropped"
                );
            }
        }
    }
    Box::new(NullDetector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_becomes_na() {
        assert_eq!(
            scalar_or_na(String::new()),
            FieldValue::scalar(NOT_AVAILABLE)
        );
        assert_eq!(
            scalar_or_na("Jane Doe".into()),
            FieldValue::scalar("Jane Doe")
        );
    }

    #[test]
    fn standard_fields_start_with_identity() {
        assert_eq!(STANDARD_FIELDS[0], "Full Name");
    }
}
