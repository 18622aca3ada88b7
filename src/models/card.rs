use serde::{Deserialize, Deserializer, Serialize};

/// Card priority bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Med,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Med => "Med",
            Priority::Low => "Low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "med" | "medium" => Some(Priority::Med),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Deal status flags (NDA signed, technical review done, JAA signed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Flags {
    pub nda: bool,
    pub tech: bool,
    pub jaa: bool,
}

/// Card model - one tracked deal/country occupying exactly one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub country: String,
    /// Deal face value. Treated as 0 for aggregation when absent.
    #[serde(
        default,
        deserialize_with = "lenient_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    /// Due date as an ISO date string (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub flags: Flags,
}

impl Card {
    /// Create a new card with a fresh id
    pub fn new(country: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            country: country.to_string(),
            value: None,
            owner: None,
            org: None,
            priority: None,
            next_action: None,
            due: None,
            links: None,
            notes: None,
            flags: Flags::default(),
        }
    }
}

/// Accept numbers, numeric strings, or null for card values.
/// Anything non-numeric is coerced to None rather than rejecting the payload.
fn lenient_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_conversion() {
        assert_eq!(Priority::High.as_str(), "High");
        assert_eq!(Priority::from_str("high"), Some(Priority::High));
        assert_eq!(Priority::from_str("Medium"), Some(Priority::Med));
        assert_eq!(Priority::from_str("LOW"), Some(Priority::Low));
        assert_eq!(Priority::from_str("urgent"), None);
    }

    #[test]
    fn test_card_creation() {
        let card = Card::new("Brazil");
        assert_eq!(card.country, "Brazil");
        assert!(!card.id.is_empty());
        assert!(card.value.is_none());
        assert!(!card.flags.nda);
    }

    #[test]
    fn test_card_uses_camel_case_keys() {
        let mut card = Card::new("Japan");
        card.next_action = Some("Send proposal".to_string());
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("nextAction"));
        assert!(!json.contains("next_action"));
    }

    #[test]
    fn test_card_value_coercion() {
        let card: Card =
            serde_json::from_str(r#"{"id":"c1","country":"Chile","value":"2500"}"#).unwrap();
        assert_eq!(card.value, Some(2500.0));

        let card: Card =
            serde_json::from_str(r#"{"id":"c1","country":"Chile","value":"n/a"}"#).unwrap();
        assert_eq!(card.value, None);

        let card: Card =
            serde_json::from_str(r#"{"id":"c1","country":"Chile","value":null}"#).unwrap();
        assert_eq!(card.value, None);
    }

    #[test]
    fn test_card_missing_flags_default_false() {
        let card: Card = serde_json::from_str(r#"{"id":"c1","country":"Peru"}"#).unwrap();
        assert_eq!(card.flags, Flags::default());
    }
}
