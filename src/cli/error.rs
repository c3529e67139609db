// Error handling utilities for consistent error messages and exit codes

use std::process;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing leads or agents, refused moves.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exit with an internal error (exit code 2)
/// Internal errors are for database failures and other system problems.
pub fn internal_error(message: &str) -> ! {
    eprintln!("Internal error: {}", message);
    process::exit(2);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate that a lead ID is valid (positive integer)
pub fn validate_lead_id(id_str: &str) -> Result<i64, String> {
    id_str.trim().parse::<i64>()
        .map_err(|_| format!("Invalid lead ID: '{}'. Lead ID must be a number.", id_str))
        .and_then(|id| {
            if id > 0 {
                Ok(id)
            } else {
                Err(format!("Invalid lead ID: {}. Lead ID must be positive.", id))
            }
        })
}

/// Validate phone format: digits plus common separators, at least one digit
pub fn validate_phone(phone: &str) -> Result<(), String> {
    validate_non_empty(phone, "Phone")?;
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.');
    if phone.chars().all(allowed) && phone.chars().any(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(format!("Invalid phone number: '{}'. Use digits, spaces, and + - ( ) . only.", phone))
    }
}

/// Parse a comma-separated list of lead IDs and ranges ("1,3,5-7")
pub fn parse_lead_id_list(input: &str) -> Result<Vec<i64>, String> {
    let mut ids = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((start, end)) = part.split_once('-') {
            let start = validate_lead_id(start)?;
            let end = validate_lead_id(end)?;
            if start > end {
                return Err(format!("Invalid lead ID range: {}-{}. Start must not exceed end.", start, end));
            }
            ids.extend(start..=end);
        } else {
            ids.push(validate_lead_id(part)?);
        }
    }
    if ids.is_empty() {
        return Err("No lead IDs given".to_string());
    }
    Ok(ids)
}
