//! SPDX license expression handling for generated elements.
//!
//! Uses the `spdx` crate in lax mode so common non-standard spellings
//! (`Apache2`, `/` for `OR`) are accepted; anything that still fails to parse
//! is written as `NOASSERTION`.

pub const NOASSERTION: &str = "NOASSERTION";
pub const NONE: &str = "NONE";

/// True if `expr` parses as an SPDX license expression.
#[must_use]
pub fn is_valid_expression(expr: &str) -> bool {
    let expr = expr.trim();
    !expr.is_empty() && spdx::Expression::parse_mode(expr, spdx::ParseMode::LAX).is_ok()
}

/// License value to write into a document.
#[must_use]
pub fn license_or_noassertion(expr: Option<&str>) -> String {
    match expr.map(str::trim) {
        Some(value) if value == NOASSERTION || value == NONE => value.to_string(),
        Some(value) if is_valid_expression(value) => value.to_string(),
        Some(value) if !value.is_empty() => {
            tracing::debug!(license = value, "unparsable license expression");
            NOASSERTION.to_string()
        }
        _ => NOASSERTION.to_string(),
    }
}

/// License value read back from a document; `NOASSERTION` means absent.
#[must_use]
pub fn license_from_document(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NOASSERTION)
        .map(str::to_string)
}

/// Copyright value to write into a document.
#[must_use]
pub fn copyright_or_noassertion(text: Option<&str>) -> String {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(NOASSERTION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_expressions_pass_through() {
        assert_eq!(license_or_noassertion(Some("MIT")), "MIT");
        assert_eq!(
            license_or_noassertion(Some("MIT OR Apache-2.0")),
            "MIT OR Apache-2.0"
        );
        assert_eq!(license_or_noassertion(Some("NONE")), "NONE");
    }

    #[test]
    fn test_invalid_or_missing_become_noassertion() {
        assert_eq!(license_or_noassertion(None), NOASSERTION);
        assert_eq!(license_or_noassertion(Some("")), NOASSERTION);
        assert_eq!(license_or_noassertion(Some("(((")), NOASSERTION);
    }

    #[test]
    fn test_read_back() {
        assert_eq!(license_from_document(Some("NOASSERTION")), None);
        assert_eq!(license_from_document(Some("MIT")), Some("MIT".to_string()));
        assert_eq!(copyright_or_noassertion(Some("  ")), NOASSERTION);
    }
}
