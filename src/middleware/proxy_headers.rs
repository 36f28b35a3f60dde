use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Peers whose `X-Forwarded-*` headers are believed.
#[derive(Clone, Debug, Default)]
pub struct TrustedProxies {
    any: bool,
    addrs: Vec<IpAddr>,
}

impl TrustedProxies {
    /// Parses a comma-separated list of IPs; `*` trusts every peer.
    pub fn parse(list: &str) -> Self {
        let mut trusted = Self::default();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if entry == "*" {
                trusted.any = true;
            } else if let Ok(ip) = entry.parse::<IpAddr>() {
                trusted.addrs.push(ip);
            } else {
                tracing::warn!(entry, "Ignoring unparsable FORWARDED_ALLOW_IPS entry");
            }
        }
        trusted
    }

    pub fn trusts(&self, peer: Option<IpAddr>) -> bool {
        self.any || peer.is_some_and(|ip| self.addrs.contains(&ip))
    }
}

/// Where a request really came from, after proxy headers are applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInfo {
    pub addr: Option<IpAddr>,
    pub scheme: String,
}

pub fn resolve_client(trusted: &TrustedProxies, peer: Option<IpAddr>, headers: &HeaderMap) -> ClientInfo {
    let direct = ClientInfo {
        addr: peer,
        scheme: "http".to_string(),
    };
    if !trusted.trusts(peer) {
        return direct;
    }

    let forwarded_for = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    let forwarded_proto = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| matches!(v.as_str(), "http" | "https" | "ws" | "wss"));

    ClientInfo {
        addr: forwarded_for.or(peer),
        scheme: forwarded_proto.unwrap_or(direct.scheme),
    }
}

pub async fn proxy_headers(
    State(trusted): State<Arc<TrustedProxies>>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let client = resolve_client(&trusted, peer, req.headers());
    req.extensions_mut().insert(client);

    next.run(req).await
}
