use crate::core::error::ValidationError;
use crate::core::types::RecordChange;

pub(crate) const EDITABLE_RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "CNAME", "MX", "NS", "PTR", "SRV", "TXT", "CAA", "SPF", "SOA", "NAPTR", "DS",
    "DNSKEY",
];

/// Allowed record types for a record currently of type `current`. A type outside
/// the allow-list is appended so the form can still show it.
pub(crate) fn record_type_options(current: &str) -> Vec<String> {
    let mut options: Vec<String> = EDITABLE_RECORD_TYPES
        .iter()
        .map(|t| t.to_string())
        .collect();
    let current = current.trim().to_uppercase();
    if !current.is_empty() && !options.contains(&current) {
        options.push(current);
    }
    options
}

/// Splits form input on newlines and commas; blank entries are dropped.
pub(crate) fn parse_record_values(input: &str) -> Vec<String> {
    input
        .split(['\n', ','])
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn parse_ttl(input: &str) -> Result<i64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingTtl);
    }
    match trimmed.parse::<i64>() {
        Ok(ttl) if ttl > 0 => Ok(ttl),
        _ => Err(ValidationError::InvalidTtl(trimmed.to_string())),
    }
}

pub(crate) fn validate_record_input(
    record_type: &str,
    values_input: &str,
    ttl_input: &str,
) -> Result<RecordChange, ValidationError> {
    let record_type = record_type.trim();
    if record_type.is_empty() {
        return Err(ValidationError::MissingType);
    }
    let values = parse_record_values(values_input);
    if values.is_empty() {
        return Err(ValidationError::NoValues);
    }
    let ttl = parse_ttl(ttl_input)?;
    Ok(RecordChange {
        record_type: record_type.to_string(),
        ttl,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_values_splits_and_drops_blanks() {
        assert_eq!(
            parse_record_values(" 10.0.0.1 ,\n\n10.0.0.2,, \n 10.0.0.3 "),
            vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]
        );
        assert!(parse_record_values(" , \n ").is_empty());
    }

    #[test]
    fn test_ttl_rejections() {
        assert_matches!(parse_ttl("0"), Err(ValidationError::InvalidTtl(_)));
        assert_matches!(parse_ttl("-5"), Err(ValidationError::InvalidTtl(_)));
        assert_matches!(parse_ttl("abc"), Err(ValidationError::InvalidTtl(_)));
        assert_matches!(parse_ttl("  "), Err(ValidationError::MissingTtl));
        assert_eq!(parse_ttl(" 300 "), Ok(300));
    }

    #[test]
    fn test_validate_accepts_well_formed_input() {
        let change = validate_record_input("A", "1.2.3.4", "300").unwrap();
        assert_eq!(change.record_type, "A");
        assert_eq!(change.ttl, 300);
        assert_eq!(change.values, vec!["1.2.3.4"]);
    }

    #[test]
    fn test_validate_checks_type_then_values_then_ttl() {
        assert_eq!(
            validate_record_input(" ", "", "x"),
            Err(ValidationError::MissingType)
        );
        assert_eq!(
            validate_record_input("A", ",", "x"),
            Err(ValidationError::NoValues)
        );
        assert_matches!(
            validate_record_input("A", "1.2.3.4", "x"),
            Err(ValidationError::InvalidTtl(_))
        );
    }

    #[test]
    fn test_type_options_append_unknown_current_type() {
        let options = record_type_options("A");
        assert_eq!(options.len(), EDITABLE_RECORD_TYPES.len());

        let options = record_type_options("https");
        assert_eq!(options.last().map(String::as_str), Some("HTTPS"));
    }
}
