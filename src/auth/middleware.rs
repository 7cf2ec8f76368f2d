//! Authentication middleware for the HTTP API.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::{HeaderMap, Request, Response, StatusCode};
use futures::future::BoxFuture;
use http_body::Body as HttpBody;
use tower::{Layer, Service};

use super::{AuthContext, Authenticator};

/// Auth middleware layer.
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<Authenticator>,
}

impl AuthLayer {
    /// Create a new auth layer.
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: self.authenticator.clone(),
        }
    }
}

/// Auth middleware service.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
}

impl<S> AuthMiddleware<S> {
    fn extract_auth_context(&self, headers: &HeaderMap) -> AuthContext {
        let auth_header = headers.get("authorization").and_then(|v| v.to_str().ok());
        let api_key_header = headers.get("x-api-key").and_then(|v| v.to_str().ok());

        self.authenticator
            .authenticate(auth_header, api_key_header)
            .unwrap_or_else(|_| AuthContext::anonymous())
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
    ResBody: HttpBody + Default + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let auth_ctx = self.extract_auth_context(req.headers());

        if self.authenticator.is_enabled() && auth_ctx.anonymous {
            // Liveness stays reachable without credentials.
            let path = req.uri().path();
            if !matches!(path, "/health" | "/") {
                return Box::pin(async move {
                    let response = Response::builder()
                        .status(StatusCode::UNAUTHORIZED)
                        .header("WWW-Authenticate", "Bearer")
                        .body(ResBody::default())
                        .unwrap();
                    Ok(response)
                });
            }
        }

        // Make the identity available to handlers.
        req.extensions_mut().insert(auth_ctx);

        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);

        Box::pin(async move { inner.call(req).await })
    }
}
