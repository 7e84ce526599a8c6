use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, ResponseError,
};
use futures_util::future::{ok, Ready, LocalBoxFuture};
use std::{rc::Rc, task::{Context, Poll}};

use crate::{
    errors::FormError,
    limiter::rate_limiter::{RateLimitConfig, RateLimitDecision},
    utils::get_client_ip::client_key,
    AppState,
};

/// Applies the `READ` preset to GET requests. Form posts are limited by the
/// submission pipeline itself and pass through untouched.
pub struct ReadRateLimit;

impl<S> Transform<S, ServiceRequest> for ReadRateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ReadRateLimitService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ReadRateLimitService {
            service: Rc::new(service),
        })
    }
}

pub struct ReadRateLimitService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for ReadRateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            if *req.method() != Method::GET {
                return service.call(req).await;
            }

            let Some(state) = req.app_data::<web::Data<AppState>>() else {
                tracing::error!("AppState missing in rate limit middleware");
                return service.call(req).await;
            };

            let key = client_key(req.request());
            let decision = state
                .forms
                .limiter()
                .check_and_consume(&key, &RateLimitConfig::READ);

            if let RateLimitDecision::Rejected { retry_after_secs, limit, reset_at } = decision {
                tracing::warn!(client = %key, path = req.path(), "Read rate limit exceeded");
                let response = FormError::RateLimited { retry_after_secs, limit, reset_at }.error_response();
                return Ok(req.into_response(response));
            }

            service.call(req).await
        })
    }
}
