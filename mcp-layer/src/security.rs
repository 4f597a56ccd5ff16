use http::HeaderMap;

pub const REQUIRED_PROTOCOL_VERSION: &str = "2025-06-18";
pub const FALLBACK_PROTOCOL_VERSION: &str = "2025-03-26";
pub const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";

/// Which browser origins may talk to the endpoint. Requests without an
/// `Origin` header (CLI agents, SDK clients) are accepted unless an explicit
/// list is configured.
#[derive(Clone, Debug, Default)]
pub enum AllowedOrigins {
    /// localhost, 127.0.0.1 and [::1] on any port.
    #[default]
    Loopback,
    /// Exact origins, e.g. `https://agent.example.com`.
    List(Vec<String>),
    Any,
}

pub fn is_origin_allowed(h: &HeaderMap, allow: &AllowedOrigins) -> bool {
    let origin = h.get(http::header::ORIGIN).and_then(|v| v.to_str().ok());
    match (allow, origin) {
        (AllowedOrigins::Any, _) => true,
        (AllowedOrigins::Loopback, None) => true,
        (AllowedOrigins::Loopback, Some(o)) => is_loopback_origin(o),
        (AllowedOrigins::List(_), None) => false,
        (AllowedOrigins::List(list), Some(o)) => list.iter().any(|allowed| allowed == o),
    }
}

fn is_loopback_origin(origin: &str) -> bool {
    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    let host = if let Some(v6) = rest.strip_prefix('[') {
        match v6.split_once(']') {
            Some((addr, port)) if port.is_empty() || port.starts_with(':') => addr,
            _ => return false,
        }
    } else {
        rest.split(':').next().unwrap_or_default()
    };
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

#[derive(Clone, Copy, Debug)]
pub enum VersionPolicy {
    Strict(&'static str),
    AllowFallback { required: &'static str, fallback: &'static str },
}

impl Default for VersionPolicy {
    fn default() -> Self {
        VersionPolicy::AllowFallback {
            required: REQUIRED_PROTOCOL_VERSION,
            fallback: FALLBACK_PROTOCOL_VERSION,
        }
    }
}

pub fn has_valid_protocol_version_with(h: &HeaderMap, policy: &VersionPolicy) -> bool {
    let header = h.get(PROTOCOL_VERSION_HEADER).and_then(|v| v.to_str().ok());
    match policy {
        VersionPolicy::Strict(req) => header == Some(*req),
        VersionPolicy::AllowFallback { required, fallback } => match header {
            Some(v) => v == *required || v == *fallback,
            None => true, // allow missing: treat as fallback
        },
    }
}

#[derive(Clone, Debug, Default)]
pub enum Auth {
    #[default]
    None,
    Bearer { token: String },
}

pub fn is_authorized(h: &HeaderMap, auth: &Auth) -> bool {
    match auth {
        Auth::None => true,
        Auth::Bearer { token } => h
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .is_some_and(|presented| presented == token),
    }
}
