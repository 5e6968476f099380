use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use actix_web::http::header::{HeaderName, HeaderValue};
use log::debug;
use uuid::Uuid;

use crate::telemetry::Telemetry;

/// Correlates access log lines, debug logs and responses
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tags every request with an `X-Request-ID`, logs request/response pairs
/// and mirrors them to the remote sink
pub struct RequestLogger {
    enable_debug_logging: bool,
    telemetry: Telemetry,
}

impl RequestLogger {
    pub fn new(enable_debug_logging: bool, telemetry: Telemetry) -> Self {
        Self {
            enable_debug_logging,
            telemetry,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggerMiddleware {
            service: Rc::new(service),
            enable_debug_logging: self.enable_debug_logging,
            telemetry: self.telemetry.clone(),
        })
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: Rc<S>,
    enable_debug_logging: bool,
    telemetry: Telemetry,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let enable_debug_logging = self.enable_debug_logging;
        let telemetry = self.telemetry.clone();

        // Keep a caller-supplied id, otherwise mint one for this request
        let supplied = req.headers().get(REQUEST_ID_HEADER).cloned();
        let request_id = match supplied {
            Some(value) => value,
            None => {
                let value = HeaderValue::from_str(&Uuid::new_v4().to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
                req.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value.clone());
                value
            }
        };

        let path = req.path().to_owned();
        let method = req.method().clone();
        let id = request_id.to_str().unwrap_or("-").to_owned();

        if enable_debug_logging {
            debug!("Processing request {}: {} {}", id, method, path);
        }
        telemetry.debug("middleware", format!("Request: {} {}", method, path));

        Box::pin(async move {
            let mut res = service.call(req).await?;
            let status = res.status();
            res.headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id);

            if enable_debug_logging {
                debug!("Response {}: {} {} - status: {}", id, method, path, status);
            }
            let line = format!("Response: {} {} - status: {}", method, path, status);
            if status.is_server_error() {
                telemetry.error("middleware", line);
            } else {
                telemetry.debug("middleware", line);
            }

            Ok(res)
        })
    }
}
