// CLI parsing utilities for card field tokens

use crate::cli::error::{validate_due, validate_value};
use crate::models::{Card, Priority};

/// Parsed card arguments from command line (`field=value` tokens plus
/// `+flag`/`-flag` toggles). An empty value (`field=`) clears the field.
#[derive(Debug, Default)]
pub struct ParsedCardArgs {
    pub stage: Option<String>,
    pub value: Option<String>,
    pub owner: Option<String>,
    pub org: Option<String>,
    pub priority: Option<String>,
    pub next_action: Option<String>,
    pub due: Option<String>,
    pub links: Option<String>,
    pub notes: Option<String>,
    pub flags_add: Vec<String>,
    pub flags_remove: Vec<String>,
}

/// Valid field names (exact match only)
const FIELD_NAMES: &[&str] = &[
    "stage", "value", "owner", "org", "priority", "next", "due", "links", "notes",
];

/// Valid flag names for +flag / -flag tokens
const FLAG_NAMES: &[&str] = &["nda", "tech", "jaa"];

/// Parse card argument tokens (e.g. `value=1200 owner=Ana +nda`)
pub fn parse_card_args(args: &[String]) -> Result<ParsedCardArgs, String> {
    let mut parsed = ParsedCardArgs::default();

    for token in args {
        if let Some(flag) = token.strip_prefix('+') {
            let flag = flag.to_lowercase();
            if !FLAG_NAMES.contains(&flag.as_str()) {
                return Err(unknown_flag(&flag));
            }
            parsed.flags_add.push(flag);
        } else if let Some(flag) = token.strip_prefix('-') {
            let flag = flag.to_lowercase();
            if !FLAG_NAMES.contains(&flag.as_str()) {
                return Err(unknown_flag(&flag));
            }
            parsed.flags_remove.push(flag);
        } else if let Some(eq_pos) = token.find('=') {
            let field = token[..eq_pos].to_lowercase();
            let value = token[eq_pos + 1..].to_string();
            let slot = match field.as_str() {
                "stage" => &mut parsed.stage,
                "value" => &mut parsed.value,
                "owner" => &mut parsed.owner,
                "org" => &mut parsed.org,
                "priority" => &mut parsed.priority,
                "next" => &mut parsed.next_action,
                "due" => &mut parsed.due,
                "links" => &mut parsed.links,
                "notes" => &mut parsed.notes,
                _ => {
                    return Err(format!(
                        "Unrecognized field name '{}'. Valid fields: {}",
                        field,
                        FIELD_NAMES.join(", ")
                    ))
                }
            };
            *slot = Some(value);
        } else {
            return Err(format!(
                "Unrecognized token '{}'. Use field=value, +flag, or -flag.",
                token
            ));
        }
    }

    Ok(parsed)
}

fn unknown_flag(flag: &str) -> String {
    format!(
        "Unrecognized flag '{}'. Valid flags: {}",
        flag,
        FLAG_NAMES.join(", ")
    )
}

/// Apply parsed field tokens to a card. Fields are validated before any of
/// them are applied, so a bad token leaves the card untouched.
pub fn apply_card_args(card: &mut Card, parsed: &ParsedCardArgs) -> Result<(), String> {
    // Validate everything up front
    let value = match parsed.value.as_deref() {
        Some("") | Some("none") => Some(None),
        Some(v) => Some(Some(validate_value(v)?)),
        None => None,
    };
    let priority = match parsed.priority.as_deref() {
        Some("") | Some("none") => Some(None),
        Some(p) => Some(Some(Priority::from_str(p).ok_or_else(|| {
            format!("Invalid priority: '{}'. Use High, Med, or Low.", p)
        })?)),
        None => None,
    };
    let due = match parsed.due.as_deref() {
        Some("") | Some("none") => Some(None),
        Some(d) => {
            validate_due(d)?;
            Some(Some(d.to_string()))
        }
        None => None,
    };

    if let Some(v) = value {
        card.value = v;
    }
    if let Some(p) = priority {
        card.priority = p;
    }
    if let Some(d) = due {
        card.due = d;
    }
    apply_text(&mut card.owner, &parsed.owner);
    apply_text(&mut card.org, &parsed.org);
    apply_text(&mut card.next_action, &parsed.next_action);
    apply_text(&mut card.links, &parsed.links);
    apply_text(&mut card.notes, &parsed.notes);

    for flag in &parsed.flags_add {
        set_flag(card, flag, true);
    }
    for flag in &parsed.flags_remove {
        set_flag(card, flag, false);
    }

    Ok(())
}

fn apply_text(slot: &mut Option<String>, parsed: &Option<String>) {
    match parsed.as_deref() {
        Some("") | Some("none") => *slot = None,
        Some(v) => *slot = Some(v.to_string()),
        None => {}
    }
}

fn set_flag(card: &mut Card, flag: &str, on: bool) {
    match flag {
        "nda" => card.flags.nda = on,
        "tech" => card.flags.tech = on,
        "jaa" => card.flags.jaa = on,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_field_tokens() {
        let parsed =
            parse_card_args(&args(&["value=1200", "owner=Ana", "stage=Proposal", "+nda"])).unwrap();
        assert_eq!(parsed.value.as_deref(), Some("1200"));
        assert_eq!(parsed.owner.as_deref(), Some("Ana"));
        assert_eq!(parsed.stage.as_deref(), Some("Proposal"));
        assert_eq!(parsed.flags_add, vec!["nda"]);
    }

    #[test]
    fn test_parse_rejects_unknown_field() {
        let err = parse_card_args(&args(&["county=Brazil"])).unwrap_err();
        assert!(err.contains("Unrecognized field name 'county'"));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(parse_card_args(&args(&["+urgent"])).is_err());
        assert!(parse_card_args(&args(&["bare-token"])).is_err());
    }

    #[test]
    fn test_apply_sets_and_clears_fields() {
        let mut card = Card::new("Brazil");
        let parsed = parse_card_args(&args(&[
            "value=1200",
            "priority=high",
            "due=2026-09-01",
            "next=Send proposal",
            "+nda",
            "+tech",
        ]))
        .unwrap();
        apply_card_args(&mut card, &parsed).unwrap();
        assert_eq!(card.value, Some(1200.0));
        assert_eq!(card.priority, Some(Priority::High));
        assert_eq!(card.due.as_deref(), Some("2026-09-01"));
        assert_eq!(card.next_action.as_deref(), Some("Send proposal"));
        assert!(card.flags.nda && card.flags.tech && !card.flags.jaa);

        let parsed = parse_card_args(&args(&["value=", "priority=none", "-nda"])).unwrap();
        apply_card_args(&mut card, &parsed).unwrap();
        assert_eq!(card.value, None);
        assert_eq!(card.priority, None);
        assert!(!card.flags.nda);
        assert!(card.flags.tech, "untouched flags keep their state");
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut card = Card::new("Brazil");
        let parsed = parse_card_args(&args(&["owner=Ana", "value=lots"])).unwrap();
        let err = apply_card_args(&mut card, &parsed).unwrap_err();
        assert!(err.contains("Invalid value"));
        assert_eq!(card.owner, None, "bad token leaves the card untouched");
    }

    #[test]
    fn test_apply_rejects_bad_due_date() {
        let mut card = Card::new("Brazil");
        let parsed = parse_card_args(&args(&["due=someday"])).unwrap();
        assert!(apply_card_args(&mut card, &parsed).is_err());
    }
}
