// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use serde::{Deserialize, Serialize};

/// Body of a POST request. Every entry in `data` becomes one upload job.
/// Missing fields decode to their zero values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PayloadCollection {
    #[serde(rename = "version")]
    pub windows_version: String,
    pub token: String,
    #[serde(rename = "data")]
    pub payloads: Vec<Payload>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Payload {
    pub waza: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_collection() {
        let json = r#"{"version":"10.0","token":"abc","data":[{"waza":1},{"waza":2}]}"#;
        let collection: PayloadCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.windows_version, "10.0");
        assert_eq!(collection.token, "abc");
        assert_eq!(
            collection.payloads,
            vec![Payload { waza: 1 }, Payload { waza: 2 }]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let json = r#"{"version":"10.0","token":"abc"}"#;
        let collection: PayloadCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.token, "abc");
        assert!(collection.payloads.is_empty());

        let empty: PayloadCollection = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, PayloadCollection::default());

        let json = r#"{"data":[{"waza":1},{}]}"#;
        let collection: PayloadCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.windows_version, "");
        assert_eq!(
            collection.payloads,
            vec![Payload { waza: 1 }, Payload { waza: 0 }]
        );
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(serde_json::from_str::<PayloadCollection>(r#"{"data": "#).is_err());
        assert!(serde_json::from_str::<PayloadCollection>(r#"{"data": 5}"#).is_err());
    }
}
