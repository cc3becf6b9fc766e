//! Validation Module - Field validation for inbound patient payloads
//!
//! Validators run against the raw JSON body at the API boundary, before a
//! record is constructed, and report every failing field at once.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)*$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^$|^[0-9+\-() ]{6,20}$").unwrap();
    static ref PATIENT_VALIDATOR: ObjectValidator = ObjectValidator::new()
        .field(FieldValidator::new("id").integer())
        .field(
            FieldValidator::new("firstName")
                .not_blank()
                .message("First name is required"),
        )
        .field(
            FieldValidator::new("lastName")
                .not_blank()
                .message("Last name is required"),
        )
        .field(FieldValidator::new("address").text().max_length(500))
        .field(FieldValidator::new("city").text())
        .field(FieldValidator::new("state").text())
        .field(FieldValidator::new("zipCode").text())
        .field(
            FieldValidator::new("phoneNumber")
                .text()
                .pattern(&PHONE_RE)
                .message("Invalid phone number format"),
        )
        .field(
            FieldValidator::new("email")
                .text()
                .email()
                .message("Invalid email format"),
        );
}

/// Validation result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { valid: true, errors: vec![] }
    }

    pub fn fail(errors: Vec<ValidationError>) -> Self {
        Self { valid: false, errors }
    }

    pub fn extend(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
            self.errors.extend(other.errors);
        }
    }

    /// Convert into a `Result`, keeping the field errors on failure
    pub fn into_result(self) -> Result<(), Vec<ValidationError>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validation error
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Validation rule
#[derive(Clone, Debug)]
pub enum ValidationRule {
    /// Must be a string containing at least one non-whitespace character
    NotBlank,
    /// Must be a string or null
    Text,
    /// Must be an integer or null
    Integer,
    /// Maximum length in characters
    MaxLength(usize),
    Pattern(Regex),
    /// Empty strings pass; anything else must look like `local@domain.tld`
    Email,
}

/// Field validator
pub struct FieldValidator {
    field: String,
    rules: Vec<ValidationRule>,
    message: Option<String>,
}

impl FieldValidator {
    pub fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            rules: vec![],
            message: None,
        }
    }

    pub fn not_blank(mut self) -> Self {
        self.rules.push(ValidationRule::NotBlank);
        self
    }

    pub fn text(mut self) -> Self {
        self.rules.push(ValidationRule::Text);
        self
    }

    pub fn integer(mut self) -> Self {
        self.rules.push(ValidationRule::Integer);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.rules.push(ValidationRule::MaxLength(len));
        self
    }

    pub fn pattern(mut self, pattern: &Regex) -> Self {
        self.rules.push(ValidationRule::Pattern(pattern.clone()));
        self
    }

    pub fn email(mut self) -> Self {
        self.rules.push(ValidationRule::Email);
        self
    }

    /// Override the message reported for format failures of this field
    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn validate(&self, value: &Value) -> ValidationResult {
        // First failing rule wins, later rules assume earlier ones held
        for rule in &self.rules {
            if let Some(error) = self.check_rule(rule, value) {
                return ValidationResult::fail(vec![error]);
            }
        }
        ValidationResult::ok()
    }

    fn check_rule(&self, rule: &ValidationRule, value: &Value) -> Option<ValidationError> {
        match rule {
            ValidationRule::NotBlank => match value.as_str() {
                Some(s) if !s.trim().is_empty() => None,
                _ => Some(self.error("not_blank", "must not be blank")),
            },
            ValidationRule::Text => {
                if value.is_null() || value.is_string() {
                    None
                } else {
                    Some(self.type_error("type", "must be a string"))
                }
            }
            ValidationRule::Integer => {
                if value.is_null() || value.is_i64() {
                    None
                } else {
                    Some(self.type_error("type", "must be an integer"))
                }
            }
            ValidationRule::MaxLength(len) => {
                let s = value.as_str()?;
                if s.chars().count() > *len {
                    Some(self.type_error("max_length", &format!("Maximum length is {}", len)))
                } else {
                    None
                }
            }
            ValidationRule::Pattern(re) => {
                let s = value.as_str()?;
                if re.is_match(s) {
                    None
                } else {
                    Some(self.error("pattern", "Value does not match pattern"))
                }
            }
            ValidationRule::Email => {
                let s = value.as_str()?;
                if s.is_empty() || EMAIL_RE.is_match(s) {
                    None
                } else {
                    Some(self.error("email", "Invalid email format"))
                }
            }
        }
    }

    fn error(&self, code: &str, default_message: &str) -> ValidationError {
        ValidationError {
            field: self.field.clone(),
            code: code.to_string(),
            message: self.message.clone().unwrap_or_else(|| default_message.to_string()),
        }
    }

    // Shape errors keep their own wording regardless of the field message
    fn type_error(&self, code: &str, message: &str) -> ValidationError {
        ValidationError {
            field: self.field.clone(),
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

/// Object validator
pub struct ObjectValidator {
    validators: Vec<FieldValidator>,
}

impl ObjectValidator {
    pub fn new() -> Self {
        Self { validators: vec![] }
    }

    pub fn field(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validate(&self, obj: &Value) -> ValidationResult {
        if !obj.is_object() {
            return ValidationResult::fail(vec![ValidationError {
                field: "body".to_string(),
                code: "type".to_string(),
                message: "Request body must be a JSON object".to_string(),
            }]);
        }

        let mut result = ValidationResult::ok();
        for validator in &self.validators {
            let value = obj.get(&validator.field).unwrap_or(&Value::Null);
            result.extend(validator.validate(value));
        }
        result
    }
}

impl Default for ObjectValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate an inbound patient payload (create or update)
pub fn validate_patient(body: &Value) -> ValidationResult {
    PATIENT_VALIDATOR.validate(body)
}
