use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for published listings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Identifier wrapper for platform members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub String);

/// The three listing kinds published through the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    Vehicle,
    FreightLane,
    JobPosting,
}

impl ListingKind {
    pub const ALL: [ListingKind; 3] = [
        ListingKind::Vehicle,
        ListingKind::FreightLane,
        ListingKind::JobPosting,
    ];

    /// Stable URL/path segment for the kind.
    pub const fn segment(self) -> &'static str {
        match self {
            ListingKind::Vehicle => "vehicles",
            ListingKind::FreightLane => "freights",
            ListingKind::JobPosting => "jobs",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "vehicles" => Some(ListingKind::Vehicle),
            "freights" => Some(ListingKind::FreightLane),
            "jobs" => Some(ListingKind::JobPosting),
            _ => None,
        }
    }

    /// The field schema governing drafts of this kind.
    pub const fn schema(self) -> &'static KindSchema {
        match self {
            ListingKind::Vehicle => &VEHICLE_SCHEMA,
            ListingKind::FreightLane => &FREIGHT_SCHEMA,
            ListingKind::JobPosting => &JOB_SCHEMA,
        }
    }
}

/// Expected representation of a single schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    Date,
}

impl FieldType {
    pub const fn label(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Date => "date",
        }
    }
}

/// Name and type of one known field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Text,
    }
}

const fn integer(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Integer,
    }
}

const fn decimal(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Decimal,
    }
}

const fn date(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        field_type: FieldType::Date,
    }
}

/// Field table for one listing kind: which fields exist, which are required.
///
/// All three kinds share the same draft/record shape; only these tables
/// differ. Contact fields are not listed here — they are uniform across
/// kinds and carried as dedicated draft fields because disclosure filtering
/// treats them specially.
#[derive(Debug)]
pub struct KindSchema {
    pub kind: ListingKind,
    pub required: &'static [FieldSpec],
    pub optional: &'static [FieldSpec],
}

pub static VEHICLE_SCHEMA: KindSchema = KindSchema {
    kind: ListingKind::Vehicle,
    required: &[text("title"), text("brand"), text("model"), integer("year")],
    optional: &[decimal("price"), text("description"), text("location")],
};

pub static FREIGHT_SCHEMA: KindSchema = KindSchema {
    kind: ListingKind::FreightLane,
    required: &[
        text("title"),
        text("origin_city"),
        text("destination_city"),
        text("cargo_type"),
    ],
    optional: &[
        decimal("weight"),
        decimal("price"),
        date("departure_date"),
        text("description"),
        text("vehicle_type"),
    ],
};

pub static JOB_SCHEMA: KindSchema = KindSchema {
    kind: ListingKind::JobPosting,
    required: &[
        text("title"),
        text("company_name"),
        text("job_type"),
        text("location"),
    ],
    optional: &[
        decimal("salary_min"),
        decimal("salary_max"),
        text("description"),
        text("requirements"),
    ],
};

impl KindSchema {
    pub fn spec_of(&self, name: &str) -> Option<&FieldSpec> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|spec| spec.name == name)
    }

    /// Check a draft against this table.
    ///
    /// Required fields must be present (and non-blank for text fields),
    /// every supplied field must be known, and values must match the
    /// declared type.
    pub fn validate(&self, draft: ListingDraft) -> Result<ValidatedDraft, ValidationError> {
        for (name, value) in &draft.fields {
            let spec = self
                .spec_of(name)
                .ok_or_else(|| ValidationError::UnknownField {
                    field: name.clone(),
                })?;
            if !value.matches(spec.field_type) {
                return Err(ValidationError::WrongType {
                    field: name.clone(),
                    expected: spec.field_type.label(),
                });
            }
        }

        for spec in self.required {
            match draft.fields.get(spec.name) {
                None => return Err(ValidationError::MissingRequired { field: spec.name }),
                Some(FieldValue::Text(value)) if value.trim().is_empty() => {
                    return Err(ValidationError::BlankRequired { field: spec.name })
                }
                Some(_) => {}
            }
        }

        Ok(ValidatedDraft(draft))
    }
}

/// Typed value for one schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
}

impl FieldValue {
    fn matches(&self, field_type: FieldType) -> bool {
        matches!(
            (self, field_type),
            (FieldValue::Text(_), FieldType::Text)
                | (FieldValue::Integer(_), FieldType::Integer)
                | (FieldValue::Decimal(_), FieldType::Decimal)
                | (FieldValue::Date(_), FieldType::Date)
        )
    }
}

/// Caller-supplied listing content, before validation.
///
/// Updates replace the whole field map: an optional field absent from the
/// draft ends up unset on the record, not "unchanged". Callers resend full
/// state on edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl ListingDraft {
    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_text(self, name: &str, value: &str) -> Self {
        self.with_field(name, FieldValue::Text(value.to_string()))
    }
}

/// A draft that has passed its kind's schema check.
///
/// Repositories only accept validated drafts, so a record can never be
/// persisted with a missing required field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft(ListingDraft);

impl ValidatedDraft {
    pub fn draft(&self) -> &ListingDraft {
        &self.0
    }

    pub fn into_draft(self) -> ListingDraft {
        self.0
    }
}

/// Field-level rejection of a draft. Surfaced to the caller, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{field}' is missing")]
    MissingRequired { field: &'static str },
    #[error("required field '{field}' is blank")]
    BlankRequired { field: &'static str },
    #[error("unknown field '{field}' for this listing kind")]
    UnknownField { field: String },
    #[error("field '{field}' must be a {expected} value")]
    WrongType { field: String, expected: &'static str },
}

impl ValidationError {
    /// The offending field name, for field-level messages.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingRequired { field } => field,
            ValidationError::BlankRequired { field } => field,
            ValidationError::UnknownField { field } => field,
            ValidationError::WrongType { field, .. } => field,
        }
    }
}

/// A stored listing. `active=false` is terminal for default retrieval: the
/// row persists for audit but never reappears in `list_active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub owner: MemberId,
    pub kind: ListingKind,
    pub fields: BTreeMap<String, FieldValue>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl ListingRecord {
    /// Apply an update draft: whole-map replacement of content fields.
    /// Identity, lifecycle, and creation timestamp are untouched.
    pub fn apply(&mut self, draft: ValidatedDraft) {
        let draft = draft.into_draft();
        self.fields = draft.fields;
        self.contact_phone = draft.contact_phone;
        self.contact_email = draft.contact_email;
    }
}
