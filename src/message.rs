/// Messages between the popup and the background tracker
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request sent with `chrome.runtime.sendMessage`, e.g.
/// `{"action": "getTabData"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetTabData,
}

impl Request {
    /// Messages this crate does not understand come back as `None`; other
    /// listeners may still answer them.
    pub fn parse(message: Value) -> Option<Request> {
        serde_json::from_value(message).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_get_tab_data() {
        assert_eq!(Request::parse(json!({"action": "getTabData"})), Some(Request::GetTabData));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Request::parse(json!({"action": "clearHistory"})), None);
        assert_eq!(Request::parse(json!("getTabData")), None);
        assert_eq!(Request::parse(Value::Null), None);
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_value(Request::GetTabData).unwrap(), json!({"action": "getTabData"}));
    }
}
