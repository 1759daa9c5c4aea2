use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registered employee. Extra registration fields are kept as sent.
///
/// Older user files accepted any body, so every field may be missing on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_legacy_user_loads_and_keeps_extra_fields() {
        let user: User = serde_json::from_value(json!({ "name": "old", "email": "o@x", "dept": 3 }))
            .unwrap();
        assert_eq!(user.password, "");
        assert_eq!(user.extra["dept"], 3);
    }
}
