//! Middleware for request logging and rate limiting.

pub mod logging;
pub mod rate_limit;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{body::Body, extract::ConnectInfo, http::Request};

pub use logging::request_logging;
pub use rate_limit::{rate_limit_middleware, RateLimitConfig, RateLimitLayer};

/// Identify the caller by peer address. `X-Forwarded-For` is only read
/// when there is no peer (in-process callers), since clients can set it
/// to anything.
pub fn client_key(request: &Request<Body>) -> IpAddr {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_key_prefers_peer_over_forwarded_header() {
        let peer: SocketAddr = "198.51.100.2:5555".parse().unwrap();
        let mut request = Request::builder()
            .uri("/api/signals")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(client_key(&request), peer.ip());
    }

    #[test]
    fn test_client_key_without_peer() {
        let request = Request::builder()
            .uri("/api/signals")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "203.0.113.7".parse::<IpAddr>().unwrap());

        let request = Request::builder()
            .uri("/api/signals")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
}
