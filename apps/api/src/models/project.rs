use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A filmmaker's project as submitted by the client, before validation.
///
/// Every field is optional at this stage so that a missing field can be reported
/// by name instead of surfacing as an opaque deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectSubmission {
    pub project_title: Option<String>,
    pub project_location: Option<String>,
    pub project_type: Option<String>,
    pub project_desc: Option<String>,
    pub project_stage: Option<String>,
    pub amount_requested: Option<AmountValue>,
    pub currency: Option<String>,
    pub support_needed: Option<Vec<String>>,
}

/// Form clients send the requested amount either as text or as a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Text(String),
    Number(serde_json::Number),
}

impl AmountValue {
    fn into_text(self) -> String {
        match self {
            AmountValue::Text(s) => s.trim().to_string(),
            AmountValue::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required field: {0}")]
pub struct MissingField(pub &'static str);

/// A validated project record. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub title: String,
    pub location: String,
    pub category: String,
    pub description: String,
    pub stage: String,
    pub amount: String,
    pub currency: String,
    pub support_needed: Vec<String>,
}

impl ProjectRecord {
    /// Support needs as a single comma-separated phrase.
    pub fn needs(&self) -> String {
        self.support_needed.join(", ")
    }

    /// `"{currency} {amount}"`, as shown in the budget chip and the prompt.
    pub fn budget(&self) -> String {
        format!("{} {}", self.currency, self.amount)
    }
}

impl ProjectSubmission {
    /// Checks the required fields in declaration order and returns the first one
    /// that is absent, blank, or (for `support_needed`) an empty list.
    pub fn validate(self) -> Result<ProjectRecord, MissingField> {
        let amount = self
            .amount_requested
            .map(AmountValue::into_text)
            .filter(|s| !s.is_empty());

        Ok(ProjectRecord {
            title: required(self.project_title, "project_title")?,
            location: required(self.project_location, "project_location")?,
            category: required(self.project_type, "project_type")?,
            description: required(self.project_desc, "project_desc")?,
            stage: required(self.project_stage, "project_stage")?,
            amount: amount.ok_or(MissingField("amount_requested"))?,
            currency: required(self.currency, "currency")?,
            support_needed: required_list(self.support_needed, "support_needed")?,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, MissingField> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(MissingField(name))
}

fn required_list(
    value: Option<Vec<String>>,
    name: &'static str,
) -> Result<Vec<String>, MissingField> {
    let items: Vec<String> = value
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        Err(MissingField(name))
    } else {
        Ok(items)
    }
}

#[cfg(test)]
pub(crate) fn sample_project() -> ProjectRecord {
    ProjectRecord {
        title: "Salt Roads".into(),
        location: "Portugal".into(),
        category: "Documentary".into(),
        description: "A feature documentary following salt harvesters on the Algarve coast.".into(),
        stage: "Development".into(),
        amount: "50000".into(),
        currency: "EUR".into(),
        support_needed: vec!["Development grant".into(), "Co-production".into()],
    }
}
