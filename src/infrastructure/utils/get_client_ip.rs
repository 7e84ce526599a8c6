use actix_web::HttpRequest;

/// Bucket shared by every client whose address cannot be determined.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

/// First address in `X-Forwarded-For`, else `X-Real-IP`. `None` when neither is usable.
pub fn get_client_ip(req: &HttpRequest) -> Option<String> {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    forwarded.or_else(|| {
        req.headers()
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Rate-limit key for a request. Unidentified clients all share [`ANONYMOUS_CLIENT`].
pub fn client_key(req: &HttpRequest) -> String {
    match get_client_ip(req) {
        Some(ip) => urlencoding::encode(&ip).into_owned(),
        None => ANONYMOUS_CLIENT.to_string(),
    }
}
