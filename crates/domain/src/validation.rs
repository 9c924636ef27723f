//! Todo / ユーザードキュメントのスキーマ検証
//!
//! 固定のフィールド表に対して型・必須・形式を確認し、違反はすべて
//! `ValidationErrors` にまとめて返す。

use crate::todo::fields;
use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

const NAME_MAX_CHARS: usize = 200;
const USERNAME_MAX_CHARS: usize = 64;
const PASSWORD_MIN_CHARS: usize = 8;

/// 1 件の制約違反
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {} violation(s)", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// 前後の空白を除いて空でない文字列
    NonBlank { max_chars: usize },
    /// 最低文字数のある文字列
    Secret { min_chars: usize },
    Boolean,
    Uuid,
    Timestamp,
    Email,
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: false,
    }
}

const TODO_SCHEMA: &[FieldRule] = &[
    required(fields::TODO_ID, FieldKind::Uuid),
    required(fields::OWNER_ID, FieldKind::NonBlank { max_chars: 256 }),
    required(
        fields::NAME,
        FieldKind::NonBlank {
            max_chars: NAME_MAX_CHARS,
        },
    ),
    required(fields::IS_COMPLETE, FieldKind::Boolean),
    required(fields::CREATED, FieldKind::Timestamp),
];

const USER_SCHEMA: &[FieldRule] = &[
    required("userID", FieldKind::NonBlank { max_chars: 256 }),
    required(
        "username",
        FieldKind::NonBlank {
            max_chars: USERNAME_MAX_CHARS,
        },
    ),
    required(
        "password",
        FieldKind::Secret {
            min_chars: PASSWORD_MIN_CHARS,
        },
    ),
    optional("email", FieldKind::Email),
];

/// 組み立て済みの Todo ドキュメントを検証する
pub fn validate_todo(candidate: &Value) -> Result<(), ValidationErrors> {
    validate(TODO_SCHEMA, candidate)
}

/// ユーザードキュメントを検証する
pub fn validate_user(candidate: &Value) -> Result<(), ValidationErrors> {
    validate(USER_SCHEMA, candidate)
}

pub fn is_valid_todo(candidate: &Value) -> bool {
    validate_todo(candidate).is_ok()
}

pub fn is_valid_user(candidate: &Value) -> bool {
    validate_user(candidate).is_ok()
}

fn validate(schema: &[FieldRule], candidate: &Value) -> Result<(), ValidationErrors> {
    let Some(object) = candidate.as_object() else {
        return Err(ValidationErrors {
            violations: vec![FieldViolation::new("$", "must be a JSON object")],
        });
    };

    let mut violations = Vec::new();

    for rule in schema {
        match object.get(rule.name) {
            None if rule.required => {
                violations.push(FieldViolation::new(rule.name, "is required"));
            }
            None => {}
            Some(value) => {
                if let Some(message) = check_kind(rule.kind, value) {
                    violations.push(FieldViolation::new(rule.name, message));
                }
            }
        }
    }

    for key in object.keys() {
        if !schema.iter().any(|rule| rule.name == key) {
            violations.push(FieldViolation::new(key, "unknown field"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { violations })
    }
}

fn check_kind(kind: FieldKind, value: &Value) -> Option<String> {
    if let FieldKind::Boolean = kind {
        return (!value.is_boolean()).then(|| "must be a boolean".to_string());
    }

    let Some(text) = value.as_str() else {
        return Some("must be a string".to_string());
    };

    match kind {
        FieldKind::NonBlank { max_chars } => {
            if text.trim().is_empty() {
                Some("must not be empty".to_string())
            } else if text.chars().count() > max_chars {
                Some(format!("must be at most {max_chars} characters"))
            } else {
                None
            }
        }
        FieldKind::Secret { min_chars } => (text.chars().count() < min_chars)
            .then(|| format!("must be at least {min_chars} characters")),
        FieldKind::Uuid => Uuid::parse_str(text)
            .is_err()
            .then(|| "must be a UUID".to_string()),
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(text)
            .is_err()
            .then(|| "must be an ISO-8601 timestamp".to_string()),
        FieldKind::Email => (!text.contains('@') || text.starts_with('@') || text.ends_with('@'))
            .then(|| "must be an email address".to_string()),
        FieldKind::Boolean => None,
    }
}
