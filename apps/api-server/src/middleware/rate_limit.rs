//! Per-IP rate limiting middleware.
//!
//! One instance per endpoint class; keys are `class:ip` so the public
//! and authenticated classes count independently. Backend errors fail
//! open.

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use techlog_core::ports::RateLimiter;
use techlog_shared::ErrorResponse;

/// Rate limiting middleware factory.
#[derive(Clone)]
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    class: &'static str,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>, class: &'static str) -> Self {
        Self { limiter, class }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            class: self.class,
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    class: &'static str,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        let ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let key = format!("{}:{}", self.class, ip);

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(key = %key, "Rate limit exceeded");

                    let retry_after = result.reset_after.as_secs().max(1);
                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .insert_header(("X-RateLimit-Remaining", "0"))
                        .json(ErrorResponse::too_many_requests(format!(
                            "Try again in {retry_after} seconds"
                        )));

                    let (http_req, _payload) = req.into_parts();
                    return Ok(ServiceResponse::new(http_req, response).map_into_right_body());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter backend failed, failing open");
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use std::time::Duration;
    use techlog_infra::{FixedWindowRateLimiter, RateLimitConfig};

    async fn ok_handler() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    #[actix_rt::test]
    async fn requests_past_the_limit_get_429() {
        let limiter: Arc<dyn RateLimiter> = Arc::new(FixedWindowRateLimiter::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        }));

        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter, "public"))
                .route("/ping", web::get().to(ok_handler)),
        )
        .await;

        for _ in 0..2 {
            let res = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request())
                .await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            res.headers().get("X-RateLimit-Remaining").unwrap().as_bytes(),
            b"0"
        );
        assert!(res.headers().contains_key("Retry-After"));
    }
}
