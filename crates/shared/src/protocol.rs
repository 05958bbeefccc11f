use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{parse_wire_date, PrescriptionId};

/// List-item projection returned by the paginated listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionSummary {
    pub id: PrescriptionId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub prescription_date: String,
}

impl PrescriptionSummary {
    pub fn prescription_day(&self) -> Option<NaiveDate> {
        parse_wire_date(&self.prescription_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: PrescriptionId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub prescription_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_visit_date: Option<String>,
}

impl Prescription {
    pub fn prescription_day(&self) -> Option<NaiveDate> {
        parse_wire_date(&self.prescription_date)
    }

    pub fn next_visit_day(&self) -> Option<NaiveDate> {
        self.next_visit_date.as_deref().and_then(parse_wire_date)
    }
}

/// Pagination envelope; the remaining Spring `Page` fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
}

/// Single-entity responses arrive either wrapped as `{message, data}` or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityEnvelope<T> {
    Wrapped {
        #[serde(default)]
        message: Option<String>,
        data: T,
    },
    Bare(T),
}

impl<T> EntityEnvelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data, .. } => data,
            Self::Bare(data) => data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPrescriptionsQuery {
    pub page: u32,
    pub size: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub prescription_date: NaiveDate,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_visit_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionEdit {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_visit_date: Option<NaiveDate>,
}

/// Acknowledgement body for create, edit and delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}

/// Row of the day-wise report; `date` is formatted `dd-mm-yyyy` by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

impl DailyCount {
    pub fn day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%d-%m-%Y").ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
}
