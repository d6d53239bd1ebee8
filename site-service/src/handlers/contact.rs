//! Quote-request handlers.

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::models::ContactRequest;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 1))]
    pub first_name: String,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub event_type: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub guests: Option<i32>,
    pub message: Option<String>,
}

/// POST /api/contact — persist a quote request, then notify the owner.
///
/// The notification is best-effort: the row is the visitor's primary
/// expectation, so a failed email is logged but never fails the request
/// and never rolls the stored row back.
pub async fn submit_contact_request(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    form.validate()?;

    let request = state
        .db
        .insert_contact_request(
            &form.first_name,
            form.last_name.as_deref(),
            &form.email,
            form.phone.as_deref(),
            form.event_type.as_deref(),
            form.event_date,
            form.guests,
            form.message.as_deref(),
        )
        .await?;

    notify_owner(&state, &form, request.id).await;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Votre demande a été envoyée avec succès !",
            "id": request.id,
        })),
    ))
}

/// GET /api/contact — admin listing of quote requests.
pub async fn list_contact_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactRequest>>, AppError> {
    Ok(Json(state.db.list_contact_requests().await?))
}

async fn notify_owner(state: &AppState, form: &ContactForm, request_id: i32) {
    let recipient = match state
        .db
        .get_setting(crate::models::setting::OWNER_EMAIL_KEY)
        .await
    {
        Ok(Some(recipient)) => recipient,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, request_id, "could not look up owner email for notification");
            return;
        }
    };

    let subject = format!("Nouvelle demande de devis de {}", form.first_name);
    if let Err(e) = state
        .email
        .send(&recipient, &subject, &build_notification_email(form))
        .await
    {
        tracing::warn!(error = %e, request_id, "quote notification email failed");
    }
}

fn build_notification_email(form: &ContactForm) -> String {
    let row = |label: &str, value: &str| {
        format!(
            r#"<tr><td style="padding:4px 12px 4px 0;color:#9E6B7B;">{label}</td><td>{value}</td></tr>"#
        )
    };

    let mut rows = String::new();
    rows.push_str(&row("Prénom", &form.first_name));
    if let Some(last_name) = &form.last_name {
        rows.push_str(&row("Nom", last_name));
    }
    rows.push_str(&row("Email", &form.email));
    if let Some(phone) = &form.phone {
        rows.push_str(&row("Téléphone", phone));
    }
    if let Some(event_type) = &form.event_type {
        rows.push_str(&row("Événement", event_type));
    }
    if let Some(event_date) = &form.event_date {
        rows.push_str(&row("Date", &event_date.to_string()));
    }
    if let Some(guests) = form.guests {
        rows.push_str(&row("Invités", &guests.to_string()));
    }
    if let Some(message) = &form.message {
        rows.push_str(&row("Message", message));
    }

    format!(
        r#"
    <div style="font-family:Arial,sans-serif;max-width:480px;margin:0 auto;">
      <h2 style="color:#7A4F5D;">Nouvelle demande de devis</h2>
      <table style="font-size:14px;color:#3A2E32;">{rows}</table>
    </div>
    "#
    )
}
