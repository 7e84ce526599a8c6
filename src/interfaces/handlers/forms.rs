use actix_web::{options, post, routes, web, HttpResponse};
use futures_util::StreamExt;

use crate::{
    entities::submission::FormKind,
    errors::FormError,
    use_cases::extractors::ClientContext,
    AppState,
};

#[post("/contact")]
pub async fn submit_contact(
    state: web::Data<AppState>,
    client: ClientContext,
    payload: web::Payload,
) -> Result<HttpResponse, FormError> {
    submit(FormKind::Contact, &state, client, payload).await
}

#[post("/donate-car")]
pub async fn submit_donate_car(
    state: web::Data<AppState>,
    client: ClientContext,
    payload: web::Payload,
) -> Result<HttpResponse, FormError> {
    submit(FormKind::VehicleDonation, &state, client, payload).await
}

#[routes]
#[options("/contact")]
#[options("/donate-car")]
pub async fn preflight(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Origin", state.config.allowed_origin.as_str()))
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
        .insert_header(("Access-Control-Max-Age", "86400"))
        .finish()
}

async fn submit(
    kind: FormKind,
    state: &AppState,
    client: ClientContext,
    payload: web::Payload,
) -> Result<HttpResponse, FormError> {
    state.forms.admit(kind, &client)?;

    if let Some(declared) = client.content_length {
        state.forms.check_size(kind, declared)?;
    }

    let body = read_capped(kind, payload).await?;
    let response = state.forms.accept(kind, &client, &body).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Reads the request body, giving up as soon as it passes the form's ceiling.
async fn read_capped(kind: FormKind, mut payload: web::Payload) -> Result<web::BytesMut, FormError> {
    let limit = kind.max_body_bytes();
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            tracing::error!(form = %kind, "Failed to read request body: {}", e);
            FormError::Internal {
                kind,
                detail: format!("failed to read request body: {}", e),
            }
        })?;

        if body.len() + chunk.len() > limit {
            tracing::warn!(form = %kind, limit, "Streamed body exceeded size ceiling");
            return Err(FormError::PayloadTooLarge);
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}
