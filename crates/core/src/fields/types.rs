//! Field set types.

use serde::{Deserialize, Serialize};

use crate::extraction::{Confidence, ExtractionResult, ExtractionSource};

/// The five identity fields the operator reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    CompanyName,
    ShareCode,
    DobDay,
    DobMonth,
    DobYear,
}

impl FieldName {
    pub const ALL: [FieldName; 5] = [
        FieldName::CompanyName,
        FieldName::ShareCode,
        FieldName::DobDay,
        FieldName::DobMonth,
        FieldName::DobYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::CompanyName => "company_name",
            FieldName::ShareCode => "share_code",
            FieldName::DobDay => "dob_day",
            FieldName::DobMonth => "dob_month",
            FieldName::DobYear => "dob_year",
        }
    }

    /// Whether the extraction service populates this field.
    pub fn is_extracted(&self) -> bool {
        !matches!(self, FieldName::CompanyName)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The reviewable record driving the run.
///
/// Every field is always present as a (possibly empty) trimmed string.
/// Confidence and source travel with the extraction-sourced fields and are
/// only replaced by the next successful extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    pub company_name: String,
    pub share_code: String,
    pub dob_day: String,
    pub dob_month: String,
    pub dob_year: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub source: ExtractionSource,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a field. Never fails: unset fields read as "".
    pub fn value(&self, field: FieldName) -> &str {
        match field {
            FieldName::CompanyName => &self.company_name,
            FieldName::ShareCode => &self.share_code,
            FieldName::DobDay => &self.dob_day,
            FieldName::DobMonth => &self.dob_month,
            FieldName::DobYear => &self.dob_year,
        }
    }

    fn slot(&mut self, field: FieldName) -> &mut String {
        match field {
            FieldName::CompanyName => &mut self.company_name,
            FieldName::ShareCode => &mut self.share_code,
            FieldName::DobDay => &mut self.dob_day,
            FieldName::DobMonth => &mut self.dob_month,
            FieldName::DobYear => &mut self.dob_year,
        }
    }

    /// Set a single field, trimming the value.
    pub fn set(&mut self, field: FieldName, value: &str) {
        *self.slot(field) = value.trim().to_string();
    }

    /// Apply an operator edit. Only fields present in the edit change.
    pub fn apply_edit(&mut self, edit: &FieldEdit) {
        for (field, value) in edit.entries() {
            self.set(field, value);
        }
    }

    /// Overwrite the extraction-sourced fields with a fresh result.
    ///
    /// `company_name` is operator-only and is left untouched.
    pub fn apply_extraction(&mut self, result: &ExtractionResult) {
        self.set(FieldName::ShareCode, &result.share_code);
        self.set(FieldName::DobDay, &result.dob_day);
        self.set(FieldName::DobMonth, &result.dob_month);
        self.set(FieldName::DobYear, &result.dob_year);
        self.confidence = result.confidence;
        self.source = result.source.clone();
    }

    /// Fields that are empty after trimming.
    pub fn missing(&self) -> Vec<FieldName> {
        FieldName::ALL
            .into_iter()
            .filter(|f| self.value(*f).trim().is_empty())
            .collect()
    }
}

/// Partial update to the field set, as sent by the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldEdit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob_month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob_year: Option<String>,
}

impl FieldEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: FieldName, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            FieldName::CompanyName => self.company_name = value,
            FieldName::ShareCode => self.share_code = value,
            FieldName::DobDay => self.dob_day = value,
            FieldName::DobMonth => self.dob_month = value,
            FieldName::DobYear => self.dob_year = value,
        }
        self
    }

    /// The (field, value) pairs carried by this edit.
    pub fn entries(&self) -> impl Iterator<Item = (FieldName, &str)> {
        [
            (FieldName::CompanyName, self.company_name.as_deref()),
            (FieldName::ShareCode, self.share_code.as_deref()),
            (FieldName::DobDay, self.dob_day.as_deref()),
            (FieldName::DobMonth, self.dob_month.as_deref()),
            (FieldName::DobYear, self.dob_year.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// Validated request for the automation service.
///
/// Only constructible through [`super::validate_for_run`], so holding one
/// proves all five fields were non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRequest {
    company_name: String,
    share_code: String,
    dob_day: String,
    dob_month: String,
    dob_year: String,
}

impl RunRequest {
    pub(super) fn from_validated(fields: &FieldSet) -> Self {
        Self {
            company_name: fields.company_name.trim().to_string(),
            share_code: fields.share_code.trim().to_string(),
            dob_day: fields.dob_day.trim().to_string(),
            dob_month: fields.dob_month.trim().to_string(),
            dob_year: fields.dob_year.trim().to_string(),
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn share_code(&self) -> &str {
        &self.share_code
    }

    pub fn dob_day(&self) -> &str {
        &self.dob_day
    }

    pub fn dob_month(&self) -> &str {
        &self.dob_month
    }

    pub fn dob_year(&self) -> &str {
        &self.dob_year
    }
}
