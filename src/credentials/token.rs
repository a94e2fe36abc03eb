use serde::Deserialize;

/// Token endpoint response; only the access token is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<TokenValue>,
}

/// Access tokens arrive either as a bare string or wrapped in an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    Plain(String),
    Wrapped {
        #[serde(default, alias = "access_token")]
        token: Option<String>,
    },
}

impl TokenValue {
    /// The usable token string, if non-empty.
    pub fn into_string(self) -> Option<String> {
        let token = match self {
            TokenValue::Plain(token) => Some(token),
            TokenValue::Wrapped { token } => token,
        };
        token.filter(|t| !t.trim().is_empty())
    }
}

impl TokenResponse {
    pub fn into_token(self) -> Option<String> {
        self.access_token.and_then(TokenValue::into_string)
    }
}
