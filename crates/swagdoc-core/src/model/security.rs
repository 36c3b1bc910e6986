use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A security scheme type. `basic` is Swagger 2.0, `http` and
/// `openIdConnect` are OpenAPI 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "oauth2")]
    OAuth2,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "openIdConnect")]
    OpenIdConnect,
}

/// Location of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// Swagger 2.0 single OAuth2 flow name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuth2Flow {
    Implicit,
    Password,
    Application,
    AccessCode,
}

/// OpenAPI 3 OAuth2 flows configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
}

impl OAuthFlows {
    /// The first configured flow with its Swagger 2.0 name.
    pub fn first(&self) -> Option<(OAuth2Flow, &OAuthFlow)> {
        [
            (OAuth2Flow::Implicit, &self.implicit),
            (OAuth2Flow::Password, &self.password),
            (OAuth2Flow::Application, &self.client_credentials),
            (OAuth2Flow::AccessCode, &self.authorization_code),
        ]
        .into_iter()
        .find_map(|(kind, flow)| flow.as_ref().map(|f| (kind, f)))
    }

    pub fn single(kind: OAuth2Flow, flow: OAuthFlow) -> Self {
        let mut flows = OAuthFlows::default();
        match kind {
            OAuth2Flow::Implicit => flows.implicit = Some(flow),
            OAuth2Flow::Password => flows.password = Some(flow),
            OAuth2Flow::Application => flows.client_credentials = Some(flow),
            OAuth2Flow::AccessCode => flows.authorization_code = Some(flow),
        }
        flows
    }
}

/// A single OAuth2 flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OAuthFlow {
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(rename = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

/// A security scheme definition holding the fields of both versions. The
/// projection masks whichever set the target version does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,

    // Swagger 2.0 single-flow fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<OAuth2Flow>,

    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl SecurityScheme {
    pub fn new(scheme_type: SecuritySchemeType) -> Self {
        SecurityScheme {
            scheme_type,
            description: None,
            name: None,
            location: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
            flow: None,
            authorization_url: None,
            token_url: None,
            scopes: IndexMap::new(),
            extensions: IndexMap::new(),
        }
    }

    pub fn api_key(name: impl Into<String>, location: ApiKeyLocation) -> Self {
        SecurityScheme {
            name: Some(name.into()),
            location: Some(location),
            ..SecurityScheme::new(SecuritySchemeType::ApiKey)
        }
    }

    /// OpenAPI 3 view of this scheme: `basic` becomes `http`/`basic` and a
    /// Swagger 2.0 single flow becomes a `flows` object.
    pub fn to_openapi3(&self) -> SecurityScheme {
        let mut scheme = self.clone();
        if scheme.scheme_type == SecuritySchemeType::Basic {
            scheme.scheme_type = SecuritySchemeType::Http;
            scheme.scheme.get_or_insert_with(|| "basic".to_string());
        }
        if scheme.flows.is_none() {
            if let Some(kind) = scheme.flow {
                let flow = OAuthFlow {
                    authorization_url: scheme.authorization_url.clone(),
                    token_url: scheme.token_url.clone(),
                    refresh_url: None,
                    scopes: scheme.scopes.clone(),
                };
                scheme.flows = Some(OAuthFlows::single(kind, flow));
            }
        }
        scheme
    }

    /// Swagger 2.0 view of this scheme: `http`/`basic` becomes `basic` and the
    /// first OpenAPI 3 flow fills the single-flow fields.
    pub fn to_swagger2(&self) -> SecurityScheme {
        let mut scheme = self.clone();
        if scheme.scheme_type == SecuritySchemeType::Http
            && scheme
                .scheme
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("basic"))
        {
            scheme.scheme_type = SecuritySchemeType::Basic;
        }
        if scheme.flow.is_none() {
            if let Some((kind, flow)) = self.flows.as_ref().and_then(OAuthFlows::first) {
                scheme.flow = Some(kind);
                scheme.authorization_url = flow.authorization_url.clone();
                scheme.token_url = flow.token_url.clone();
                scheme.scopes = flow.scopes.clone();
            }
        }
        scheme
    }
}

/// A security requirement: map of scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
