use crate::providers::types::ApiKey;
use reqwest_middleware::RequestBuilder;

/// How a backend expects its credential to be attached.
#[derive(Clone)]
pub enum AuthStrategy {
    Bearer(ApiKey),
    ApiKeyHeader {
        header_name: &'static str,
        key: ApiKey,
    },
    None,
}

impl AuthStrategy {
    #[must_use]
    pub const fn bearer(key: ApiKey) -> Self {
        Self::Bearer(key)
    }

    #[must_use]
    pub const fn anthropic(key: ApiKey) -> Self {
        Self::ApiKeyHeader {
            header_name: "x-api-key",
            key,
        }
    }

    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(key) => {
                request.header("Authorization", format!("Bearer {}", key.as_str()))
            }
            Self::ApiKeyHeader { header_name, key } => request.header(*header_name, key.as_str()),
            Self::None => request,
        }
    }
}

impl std::fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(key) => f.debug_tuple("Bearer").field(key).finish(),
            Self::ApiKeyHeader { header_name, key } => f
                .debug_struct("ApiKeyHeader")
                .field("header_name", header_name)
                .field("key", key)
                .finish(),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_key() {
        let auth = AuthStrategy::bearer(ApiKey::new("sk-live-0123456789"));
        let debug = format!("{auth:?}");
        assert!(debug.starts_with("Bearer"));
        assert!(!debug.contains("0123456789"));
    }

    #[test]
    fn test_anthropic_header_name() {
        let AuthStrategy::ApiKeyHeader { header_name, .. } =
            AuthStrategy::anthropic(ApiKey::new("k"))
        else {
            panic!("Expected ApiKeyHeader variant");
        };
        assert_eq!(header_name, "x-api-key");
    }
}
