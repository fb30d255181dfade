use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of an already-authenticated identity.
///
/// Deserializes straight from a JWT payload. Lookups only ever read strings:
/// array claims yield their first string element, every other JSON type is
/// treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityClaims(Map<String, Value>);

impl IdentityClaims {
    /// Build a claim set from name/value string pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }

    /// First string value recorded under `name`.
    pub fn find_first(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            Value::String(s) => Some(s.as_str()),
            Value::Array(values) => values.iter().find_map(Value::as_str),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_first_string() {
        let claims = IdentityClaims::from_pairs([("email", "a@domain.com")]);
        assert_eq!(claims.find_first("email"), Some("a@domain.com"));
        assert_eq!(claims.find_first("upn"), None);
    }

    #[test]
    fn test_find_first_array_and_non_string() {
        let claims: IdentityClaims = serde_json::from_value(json!({
            "roles": [1, "admin", "reader"],
            "exp": 1700000000,
            "email_verified": true,
        }))
        .unwrap();

        assert_eq!(claims.find_first("roles"), Some("admin"));
        assert_eq!(claims.find_first("exp"), None);
        assert_eq!(claims.find_first("email_verified"), None);
        assert!(claims.contains("exp"));
    }
}
