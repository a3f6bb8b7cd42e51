//! Client address extractor

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;

/// Peers allowed to report the client address through forwarding headers
/// (`server.trusted_proxies`). Installed as a request extension.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<Vec<IpAddr>>);

impl TrustedProxies {
    pub fn new(proxies: Vec<IpAddr>) -> Self {
        Self(Arc::new(proxies))
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(ip)
    }
}

/// Best-known address of the caller.
///
/// The peer address of the TCP connection, unless that peer is a trusted
/// proxy: then the first entry of `X-Forwarded-For`, then `X-Real-IP`.
/// `None` without a peer address (e.g. in-process tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    fn from_parts(parts: &Parts) -> Option<IpAddr> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())?;

        let trusted = parts
            .extensions
            .get::<TrustedProxies>()
            .is_some_and(|proxies| proxies.contains(&peer));
        if !trusted {
            return Some(peer);
        }

        let header_ip = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        header_ip("x-forwarded-for")
            .or_else(|| header_ip("x-real-ip"))
            .or(Some(peer))
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(Self::from_parts(parts)))
    }
}
