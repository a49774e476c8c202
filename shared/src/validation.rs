//! Validation utilities for the Warehouse Inventory Management Platform

use thiserror::Error;
use validator::ValidationErrors;

/// A field-level validation failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{field}: {message}")]
    Invalid { field: String, message: String },
}

impl ValidationError {
    /// Name of the first offending field
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingFields(fields) => fields.first().map(String::as_str),
            ValidationError::Invalid { field, .. } => Some(field),
        }
    }
}

/// Convert snake_case struct field names to the camelCase used on the wire
pub fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Collapse `validator` errors into a single failure.
///
/// Missing required fields are reported together; otherwise the first
/// failing field (in name order) and its message are reported.
pub fn summarize(errors: &ValidationErrors) -> ValidationError {
    let field_errors = errors.field_errors();
    let mut fields: Vec<&str> = field_errors.keys().copied().collect();
    fields.sort_unstable();

    let missing: Vec<String> = fields
        .iter()
        .filter(|f| {
            field_errors[**f]
                .iter()
                .any(|e| e.code.as_ref() == "required")
        })
        .map(|f| to_camel_case(f))
        .collect();

    if !missing.is_empty() {
        return ValidationError::MissingFields(missing);
    }

    match fields.first() {
        Some(field) => {
            let message = field_errors[*field]
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid value".to_string());
            ValidationError::Invalid {
                field: to_camel_case(field),
                message,
            }
        }
        None => ValidationError::Invalid {
            field: "body".to_string(),
            message: "Invalid request".to_string(),
        },
    }
}

/// Normalize a product name for storage and comparison
pub fn normalize_product_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IntakeOrderInput;
    use validator::Validate;

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("shelf_life_days"), "shelfLifeDays");
        assert_eq!(to_camel_case("quantity"), "quantity");
    }

    #[test]
    fn test_summarize_missing_fields() {
        let input: IntakeOrderInput = serde_json::from_str("{}").unwrap();
        let err = summarize(&input.validate().unwrap_err());
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "productName".to_string(),
                "quantity".to_string(),
                "shelfLifeDays".to_string(),
                "warehouseId".to_string(),
            ])
        );
        assert_eq!(err.field(), Some("productName"));
    }

    #[test]
    fn test_summarize_range_error() {
        let input: IntakeOrderInput = serde_json::from_str(
            r#"{"productName": "Milk", "quantity": 0, "shelfLifeDays": 5,
                "warehouseId": "7f1c3c9e-6f57-4d43-9d47-0a4f3c2b1a10"}"#,
        )
        .unwrap();
        let err = summarize(&input.validate().unwrap_err());
        assert_eq!(
            err,
            ValidationError::Invalid {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            }
        );
    }

    #[test]
    fn test_normalize_product_name() {
        assert_eq!(normalize_product_name("  Fresh   Milk "), "Fresh Milk");
    }
}
