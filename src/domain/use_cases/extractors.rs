use actix_web::{http::header, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::utils::get_client_ip::{client_key, get_client_ip};

/// Who sent a request, as far as the headers tell us.
/// Usage: Add `client: ClientContext` as a parameter to your handler function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientContext {
    /// Rate-limit bucket for this client.
    pub key: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// Declared `Content-Length`, if the client sent one.
    pub content_length: Option<usize>,
}

impl ClientContext {
    pub fn from_request_head(req: &HttpRequest) -> Self {
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let content_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<usize>().ok());

        ClientContext {
            key: client_key(req),
            ip: get_client_ip(req),
            user_agent,
            content_length,
        }
    }
}

impl FromRequest for ClientContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(ClientContext::from_request_head(req)))
    }
}
