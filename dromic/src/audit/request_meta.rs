//! Client metadata captured for the activity log.

use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};
use serde_json::{Value, json};
use std::{
    convert::Infallible,
    net::{IpAddr, Ipv6Addr},
};

/// Who is calling, as far as the request headers tell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestMeta {
    /// `None` when the forwarded address does not parse
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub accept_language: Option<String>,
    pub referer: Option<String>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        // First hop of x-forwarded-for, then x-real-ip, then loopback
        let raw_ip = header(headers, "x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next().map(|ip| ip.trim().to_string()))
            .filter(|ip| !ip.is_empty())
            .or_else(|| header(headers, "x-real-ip"));

        let ip_address = match raw_ip {
            Some(raw) => raw.parse().ok(),
            None => Some(IpAddr::V6(Ipv6Addr::LOCALHOST)),
        };

        Self {
            ip_address,
            user_agent: header(headers, "user-agent"),
            accept_language: header(headers, "accept-language"),
            referer: header(headers, "referer"),
        }
    }

    /// Device string stored alongside each entry.
    pub fn device_info(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn browser_info(&self) -> Value {
        json!({
            "user_agent": self.user_agent.as_deref().unwrap_or("Unknown"),
            "accept_language": self.accept_language.as_deref().unwrap_or("Unknown"),
            "referer": self.referer.as_deref().unwrap_or("Direct"),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let meta = RequestMeta::from_headers(&headers(&[
            ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]));
        assert_eq!(meta.ip_address, Some("203.0.113.9".parse().unwrap()));
    }

    #[test]
    fn test_falls_back_to_real_ip_then_loopback() {
        let meta = RequestMeta::from_headers(&headers(&[("x-real-ip", "198.51.100.4")]));
        assert_eq!(meta.ip_address, Some("198.51.100.4".parse().unwrap()));

        let meta = RequestMeta::from_headers(&HeaderMap::new());
        assert_eq!(meta.ip_address, Some("::1".parse().unwrap()));
    }

    #[test]
    fn test_unparsable_address_is_dropped() {
        let meta = RequestMeta::from_headers(&headers(&[("x-forwarded-for", "unknown")]));
        assert_eq!(meta.ip_address, None);
    }

    #[test]
    fn test_browser_info_defaults() {
        let meta = RequestMeta::from_headers(&headers(&[("user-agent", "Mozilla/5.0")]));
        let info = meta.browser_info();
        assert_eq!(info["user_agent"], "Mozilla/5.0");
        assert_eq!(info["accept_language"], "Unknown");
        assert_eq!(info["referer"], "Direct");
        assert_eq!(meta.device_info(), "Mozilla/5.0");
    }
}
