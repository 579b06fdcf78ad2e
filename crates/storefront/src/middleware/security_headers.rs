//! Security headers middleware for XSS, clickjacking, and isolation protection.

use axum::{
    extract::Request,
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the CSP for a response.
///
/// Product and brand images are hosted wherever the backend says, so `img-src`
/// allows any https origin. Inline scripts need the request's nonce.
fn content_security_policy(nonce: Option<&CspNonce>) -> String {
    let script_src = nonce.map_or_else(
        || "'self'".to_string(),
        |n| format!("'self' {}", n.source()),
    );
    format!(
        "default-src 'none'; \
         script-src {script_src}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

fn insert_static(headers: &mut HeaderMap, name: &'static str, value: &'static str) {
    headers.insert(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    );
}

/// Add security headers to all responses.
///
/// Dynamic pages are never cached because they carry the visitor's cart and
/// account state. Static assets set their own `Cache-Control` and keep it.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let request_nonce = request.extensions().get::<CspNonce>().cloned();
    let mut response = next.run(request).await;
    let nonce = request_nonce.or_else(|| response.extensions().get::<CspNonce>().cloned());

    let headers = response.headers_mut();
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&content_security_policy(nonce.as_ref())) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid CSP header value"),
    }

    insert_static(
        headers,
        "permissions-policy",
        "camera=(), geolocation=(), microphone=(), payment=(), usb=(), interest-cohort=()",
    );

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    insert_static(headers, "cross-origin-opener-policy", "same-origin");
    insert_static(headers, "cross-origin-resource-policy", "same-origin");
    insert_static(headers, "x-dns-prefetch-control", "off");

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_includes_nonce() {
        let nonce = CspNonce::generate();
        let csp = content_security_policy(Some(&nonce));
        assert!(csp.contains(&format!("script-src 'self' 'nonce-{nonce}'")));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_csp_without_nonce_allows_only_self_scripts() {
        let csp = content_security_policy(None);
        assert!(csp.contains("script-src 'self';"));
        assert!(!csp.contains("nonce-"));
    }
}
