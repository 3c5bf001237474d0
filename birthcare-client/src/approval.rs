//! Application review actions

use crate::client::ApiClient;
use crate::error::Result;
use birthcare_core::models::Id;
use birthcare_core::{ApprovalDecision, RejectionDialog};
use serde_json::Value;

/// Submit the rejection dialog for one application.
///
/// On failure the dialog stays open with the error and the entered reason.
pub async fn submit_rejection(
    client: &ApiClient,
    application_id: Id,
    dialog: &mut RejectionDialog,
) -> Result<Value> {
    let reason = dialog.begin_submit()?;
    match client
        .decide_application(application_id, ApprovalDecision::Reject, Some(&reason))
        .await
    {
        Ok(body) => {
            dialog.succeed();
            Ok(body)
        }
        Err(e) => {
            dialog.fail(e.user_message());
            Err(e)
        }
    }
}
