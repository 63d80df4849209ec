//! HTTPS enforcement.

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::chain::{Flow, Interceptor};
use crate::context::RequestContext;
use crate::response::found;

/// Header set by TLS-terminating proxies. Behind several proxies it holds a
/// comma-separated list whose first entry is the client-facing scheme.
pub const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Redirects `http` requests to the same URL over `https`.
///
/// The scheme is read from the request URI when it is absolute, otherwise
/// from `X-Forwarded-Proto`. Requests whose scheme cannot be determined pass
/// through.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequireTls;

fn request_scheme(req: &Request) -> Option<String> {
    req.uri().scheme_str().map(str::to_string).or_else(|| {
        req.headers()
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
    })
}

fn request_host(req: &Request) -> Option<String> {
    req.uri()
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            req.headers()
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
}

#[async_trait]
impl Interceptor for RequireTls {
    async fn intercept(&self, ctx: RequestContext, req: Request) -> Flow {
        if request_scheme(&req).as_deref() != Some("http") {
            return Flow::Continue(ctx, req);
        }

        let Some(host) = request_host(&req) else {
            tracing::warn!(uri = %req.uri(), "plain http request without host");
            return Flow::Halt(
                ctx,
                (StatusCode::BAD_REQUEST, "https required").into_response(),
            );
        };

        let path = req
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        let target = format!("https://{host}{path}");
        tracing::debug!(%target, "redirecting to https");
        Flow::Halt(ctx, found(&target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    async fn run(req: Request) -> Flow {
        RequireTls.intercept(RequestContext::new(), req).await
    }

    fn location(flow: Flow) -> String {
        match flow {
            Flow::Halt(_, response) => {
                assert_eq!(response.status(), StatusCode::FOUND);
                response.headers()[header::LOCATION]
                    .to_str()
                    .expect("ascii")
                    .to_string()
            }
            Flow::Continue(..) => panic!("expected redirect"),
        }
    }

    #[tokio::test]
    async fn absolute_http_uri_redirects_to_https() {
        let req = axum::http::Request::builder()
            .uri("http://stop.example.net/admin?x=1")
            .body(Body::empty())
            .expect("request");
        assert_eq!(location(run(req).await), "https://stop.example.net/admin?x=1");
    }

    #[tokio::test]
    async fn forwarded_http_redirects_using_host_header() {
        let req = axum::http::Request::builder()
            .uri("/home")
            .header(header::HOST, "stop.example.net")
            .header(FORWARDED_PROTO, "http")
            .body(Body::empty())
            .expect("request");
        assert_eq!(location(run(req).await), "https://stop.example.net/home");
    }

    #[tokio::test]
    async fn proxy_chain_uses_first_forwarded_scheme() {
        let plain = axum::http::Request::builder()
            .uri("/home")
            .header(header::HOST, "stop.example.net")
            .header(FORWARDED_PROTO, "http, https")
            .body(Body::empty())
            .expect("request");
        assert_eq!(location(run(plain).await), "https://stop.example.net/home");

        let secure = axum::http::Request::builder()
            .uri("/home")
            .header(header::HOST, "stop.example.net")
            .header(FORWARDED_PROTO, "HTTPS , http")
            .body(Body::empty())
            .expect("request");
        assert!(matches!(run(secure).await, Flow::Continue(..)));
    }

    #[tokio::test]
    async fn https_and_unknown_schemes_pass() {
        let https = axum::http::Request::builder()
            .uri("https://stop.example.net/")
            .body(Body::empty())
            .expect("request");
        assert!(matches!(run(https).await, Flow::Continue(..)));

        let unknown = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .expect("request");
        assert!(matches!(run(unknown).await, Flow::Continue(..)));
    }
}
