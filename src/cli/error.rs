// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing resources, etc.
/// Internal failures (exit code 2) propagate as errors and are rendered
/// with their cause chain in main.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate a deal value (non-negative number)
pub fn validate_value(value_str: &str) -> Result<f64, String> {
    value_str
        .parse::<f64>()
        .map_err(|_| format!("Invalid value: '{}'. Value must be a number.", value_str))
        .and_then(|v| {
            if v.is_finite() && v >= 0.0 {
                Ok(v)
            } else {
                Err(format!("Invalid value: {}. Value must be non-negative.", v))
            }
        })
}

/// Validate a win probability (percent, 0-100)
pub fn validate_prob(prob_str: &str) -> Result<f64, String> {
    prob_str
        .parse::<f64>()
        .map_err(|_| format!("Invalid probability: '{}'. Probability must be a number.", prob_str))
        .and_then(|p| {
            if p.is_finite() && (0.0..=100.0).contains(&p) {
                Ok(p)
            } else {
                Err(format!(
                    "Invalid probability: {}. Probability must be between 0 and 100.",
                    prob_str
                ))
            }
        })
}

/// Validate a WIP cap (positive integer)
pub fn validate_wip(wip_str: &str) -> Result<i64, String> {
    wip_str
        .parse::<i64>()
        .map_err(|_| format!("Invalid WIP cap: '{}'. WIP cap must be a number.", wip_str))
        .and_then(|w| {
            if w > 0 {
                Ok(w)
            } else {
                Err(format!("Invalid WIP cap: {}. WIP cap must be positive.", w))
            }
        })
}

/// Validate a due date (YYYY-MM-DD)
pub fn validate_due(due_str: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(due_str, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            format!(
                "Invalid due date: '{}'. Due dates use the YYYY-MM-DD format.",
                due_str
            )
        })
}
