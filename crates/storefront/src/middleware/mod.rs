//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP with nonce, framing, sniffing)
//! 5. CSP nonce (generate per-request nonce for inline scripts)
//! 6. Session layer (tower-sessions with in-memory store)
//! 7. Session expiry (sign out when the backend rejects the token)
//! 8. Rate limiting (governor, on `/auth` and `/cart` only)

pub mod auth;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AuthContext, OptionalAuth, RequireAdmin, RequireAuth, set_current_user};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{auth_rate_limiter, cart_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, expire_session_middleware};
