//! Documents generated by the console and stored against a patient

use crate::error::{ClientError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use birthcare_core::models::{Id, NewPatientDocument};
use birthcare_core::BabyBirthRecord;
use serde_json::json;
use std::fmt::Write;

/// Output of a renderer, before encoding for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub title: String,
    pub document_type: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    /// Payload for `/patient-documents/from-data`
    pub fn into_upload(
        self,
        patient_id: Id,
        admission_id: Option<Id>,
        metadata: serde_json::Value,
    ) -> NewPatientDocument {
        NewPatientDocument {
            patient_id,
            admission_id,
            title: self.title,
            document_type: self.document_type,
            content_type: self.content_type,
            content: STANDARD.encode(&self.bytes),
            metadata,
        }
    }
}

/// Turns a birth record into a document body
pub trait DocumentRenderer: Send + Sync {
    fn render_birth_record(&self, record: &BabyBirthRecord) -> Result<RenderedDocument>;
}

/// Plain-text summary sheet
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRenderer;

impl DocumentRenderer for SummaryRenderer {
    fn render_birth_record(&self, record: &BabyBirthRecord) -> Result<RenderedDocument> {
        let mut text = String::new();
        write_summary(&mut text, record).map_err(|e| ClientError::Render(e.to_string()))?;

        let title = if record.baby_count > 1 {
            format!(
                "Birth Details - Baby {} of {}",
                record.birth_order, record.baby_count
            )
        } else {
            "Birth Details".to_string()
        };

        Ok(RenderedDocument {
            title,
            document_type: "birth_details".to_string(),
            content_type: "text/plain".to_string(),
            bytes: text.into_bytes(),
        })
    }
}

fn write_summary(out: &mut String, record: &BabyBirthRecord) -> std::fmt::Result {
    let shared = &record.shared;
    let baby = &record.baby;
    let apgar = &record.apgar;

    writeln!(out, "BIRTH DETAILS")?;
    writeln!(out, "Baby {} of {}", record.birth_order, record.baby_count)?;
    writeln!(out, "Date of delivery: {}", shared.date_of_delivery)?;
    writeln!(out, "Time of delivery: {}", shared.time_of_delivery)?;
    writeln!(out, "Place of delivery: {}", shared.place_of_delivery)?;
    writeln!(out, "Attendant: {}", shared.attendant)?;
    if let Some(ref kind) = shared.type_of_delivery {
        writeln!(out, "Type of delivery: {}", kind)?;
    }
    if let Some(ref sex) = baby.sex {
        writeln!(out, "Sex: {}", sex)?;
    }
    if let Some(weight) = baby.weight_grams {
        writeln!(out, "Weight: {} g", weight)?;
    }
    if let Some(length) = baby.length_cm {
        writeln!(out, "Length: {} cm", length)?;
    }
    writeln!(
        out,
        "APGAR 1 min: {} ({})",
        apgar.one_minute_total,
        apgar.one_minute_interpretation.label()
    )?;
    writeln!(
        out,
        "APGAR 5 min: {} ({})",
        apgar.five_minutes_total,
        apgar.five_minutes_interpretation.label()
    )?;
    if let Some(ref remarks) = baby.remarks {
        writeln!(out, "Remarks: {}", remarks)?;
    }
    Ok(())
}

/// Metadata attached to a saved birth record
pub fn birth_record_metadata(record: &BabyBirthRecord) -> serde_json::Value {
    json!({
        "birth_order": record.birth_order,
        "baby_count": record.baby_count,
        "plurality": record.plurality,
        "apgar_one_minute_total": record.apgar.one_minute_total,
        "apgar_five_minutes_total": record.apgar.five_minutes_total,
    })
}
