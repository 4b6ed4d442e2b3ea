use serde::{Deserialize, Serialize};

/// Whether a category classifies videos or courses.
/// Stored explicitly on the document so lookups never probe two collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Video,
    Course,
}

/// Category document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub kind: CategoryKind,
    pub name: String,
}

/// Category as exposed by the API
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: String,
    pub kind: CategoryKind,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CategoryKind::Video).unwrap(), "\"video\"");
        assert_eq!(serde_json::to_string(&CategoryKind::Course).unwrap(), "\"course\"");
    }

    #[test]
    fn test_kind_deserializes_from_query_value() {
        let kind: CategoryKind = serde_json::from_str("\"course\"").unwrap();
        assert_eq!(kind, CategoryKind::Course);
    }
}
