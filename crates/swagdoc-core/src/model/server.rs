use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A server variable for URL templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    pub default: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

/// A server URL definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariable>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Server {
            url: url.into(),
            description: None,
            variables: IndexMap::new(),
        }
    }
}

/// Swagger 2.0 transfer protocol (`schemes` entries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferScheme {
    Http,
    Https,
    Ws,
    Wss,
}

impl TransferScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferScheme::Http => "http",
            TransferScheme::Https => "https",
            TransferScheme::Ws => "ws",
            TransferScheme::Wss => "wss",
        }
    }

    /// Scheme implied by a server URL. URLs without `://` or with any other
    /// scheme imply none.
    pub fn from_url(url: &str) -> Option<TransferScheme> {
        let (prefix, _) = url.split_once("://")?;
        match prefix.to_ascii_lowercase().as_str() {
            "http" => Some(TransferScheme::Http),
            "https" => Some(TransferScheme::Https),
            "ws" => Some(TransferScheme::Ws),
            "wss" => Some(TransferScheme::Wss),
            _ => None,
        }
    }
}

fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}

/// Host portion of a server URL: everything before the first `/` once the
/// scheme is removed.
pub fn host_from_url(url: &str) -> Option<String> {
    let host = strip_scheme(url).split('/').next().unwrap_or_default();
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// Base path of a server URL: the segments after the host, re-joined and
/// prefixed with `/`.
pub fn base_path_from_url(url: &str) -> Option<String> {
    let segments: Vec<&str> = strip_scheme(url).split('/').skip(1).collect();
    if segments.is_empty() {
        None
    } else {
        Some(format!("/{}", segments.join("/")))
    }
}

/// Distinct schemes implied by the server list, in first-seen order.
pub fn schemes_from_servers(servers: &[Server]) -> Vec<TransferScheme> {
    let mut schemes = Vec::new();
    for scheme in servers.iter().filter_map(|s| TransferScheme::from_url(&s.url)) {
        if !schemes.contains(&scheme) {
            schemes.push(scheme);
        }
    }
    schemes
}

/// Rebuild the server list from Swagger 2.0 `schemes`, `host` and `basePath`.
pub fn servers_from_parts(
    schemes: &[TransferScheme],
    host: Option<&str>,
    base_path: Option<&str>,
) -> Vec<Server> {
    let host = host.unwrap_or_default();
    let base_path = base_path.unwrap_or_default();

    if schemes.is_empty() {
        if host.is_empty() && base_path.is_empty() {
            return Vec::new();
        }
        return vec![Server::new(format!("{host}{base_path}"))];
    }

    schemes
        .iter()
        .map(|scheme| Server::new(format!("{}://{host}{base_path}", scheme.as_str())))
        .collect()
}
