//! Saving a multi-baby birth details form

use crate::client::ApiClient;
use crate::documents::{birth_record_metadata, DocumentRenderer};
use crate::error::ClientError;
use birthcare_core::birth_details::saved_message;
use birthcare_core::models::{Id, PatientDocument};
use birthcare_core::BirthDetailsForm;
use thiserror::Error;

#[derive(Debug)]
pub struct SaveOutcome {
    pub documents: Vec<PatientDocument>,
    pub message: String,
}

/// Saving stopped at the first failed baby
#[derive(Error, Debug)]
#[error("{error} ({saved} of {total} saved)")]
pub struct SaveFailure {
    /// Babies stored before the failure
    pub saved: usize,
    pub total: usize,
    #[source]
    pub error: ClientError,
}

impl SaveFailure {
    pub fn user_message(&self) -> String {
        if self.saved == 0 {
            self.error.user_message()
        } else {
            format!(
                "{} ({} of {} babies were saved)",
                self.error.user_message(),
                self.saved,
                self.total
            )
        }
    }
}

/// Render and save one document per baby, in birth order.
///
/// Scores and dates are sent as entered. The first failure aborts the
/// remaining babies. Nothing is retried.
pub async fn save_birth_details(
    client: &ApiClient,
    birthcare_id: Id,
    patient_id: Id,
    admission_id: Option<Id>,
    form: &BirthDetailsForm,
    renderer: &dyn DocumentRenderer,
) -> Result<SaveOutcome, SaveFailure> {
    let total = form.babies.len();
    let fail = |saved: usize, error: ClientError| SaveFailure {
        saved,
        total,
        error,
    };

    form.check_baby_count().map_err(|e| fail(0, e.into()))?;

    let mut documents = Vec::with_capacity(total);
    for record in form.records() {
        let rendered = renderer
            .render_birth_record(&record)
            .map_err(|e| fail(documents.len(), e))?;
        let upload = rendered.into_upload(patient_id, admission_id, birth_record_metadata(&record));
        let saved = client
            .save_patient_document(birthcare_id, &upload)
            .await
            .map_err(|e| fail(documents.len(), e))?;
        tracing::debug!(
            patient_id,
            birth_order = record.birth_order,
            document_id = saved.id,
            "Saved birth record"
        );
        documents.push(saved);
    }

    Ok(SaveOutcome {
        message: saved_message(documents.len()),
        documents,
    })
}
