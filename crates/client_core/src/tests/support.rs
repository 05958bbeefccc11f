use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    domain::PrescriptionId,
    protocol::{
        ApiMessage, DailyCount, ListPrescriptionsQuery, NewPrescription, Page, Prescription,
        PrescriptionEdit, PrescriptionSummary,
    },
};
use tokio::sync::oneshot;

use crate::{backend::ClientResult, error::ClientError, PrescriptionBackend};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn summary(id: i64) -> PrescriptionSummary {
    PrescriptionSummary {
        id: PrescriptionId(id),
        name: format!("patient {id}"),
        age: 30 + id as u32 % 40,
        gender: if id % 2 == 0 { "female" } else { "male" }.to_string(),
        prescription_date: "2024-06-03T08:30:00".to_string(),
    }
}

pub fn page_of(ids: std::ops::Range<i64>, total_pages: u32) -> Page<PrescriptionSummary> {
    Page {
        content: ids.map(summary).collect(),
        total_pages,
    }
}

pub fn detail(id: i64) -> Prescription {
    let row = summary(id);
    Prescription {
        id: row.id,
        name: row.name,
        age: row.age,
        gender: row.gender,
        prescription_date: row.prescription_date,
        diagnosis: Some("seasonal flu".to_string()),
        medicines: Some("paracetamol".to_string()),
        next_visit_date: None,
    }
}

/// In-memory backend whose list responses can be held back per page.
#[derive(Default)]
pub struct FakeBackend {
    pub list_calls: Mutex<Vec<ListPrescriptionsQuery>>,
    pages: Mutex<HashMap<u32, Page<PrescriptionSummary>>>,
    gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    prescriptions: Mutex<HashMap<PrescriptionId, Prescription>>,
    fail_status: Option<u16>,
}

impl FakeBackend {
    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_page(self, page: u32, body: Page<PrescriptionSummary>) -> Self {
        self.pages.lock().expect("pages").insert(page, body);
        self
    }

    pub fn with_prescription(self, prescription: Prescription) -> Self {
        self.prescriptions
            .lock()
            .expect("prescriptions")
            .insert(prescription.id, prescription);
        self
    }

    /// The response for `page` is withheld until the returned sender fires.
    pub fn hold_page(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().expect("gates").insert(page, rx);
        tx
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.lock().expect("calls").len()
    }

    fn failure(&self, url: &str) -> Option<ClientError> {
        self.fail_status
            .map(|status| ClientError::from_status(url, status, r#"{"message":"boom"}"#))
    }
}

#[async_trait]
impl PrescriptionBackend for FakeBackend {
    async fn login(&self, username: &str, _password: &str) -> ClientResult<String> {
        Ok(format!("token-for-{username}"))
    }

    async fn list_prescriptions(
        &self,
        query: &ListPrescriptionsQuery,
    ) -> ClientResult<Page<PrescriptionSummary>> {
        self.list_calls.lock().expect("calls").push(query.clone());
        let gate = self.gates.lock().expect("gates").remove(&query.page);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if let Some(err) = self.failure("/api/v1/prescription") {
            return Err(err);
        }
        Ok(self
            .pages
            .lock()
            .expect("pages")
            .get(&query.page)
            .cloned()
            .unwrap_or(Page {
                content: Vec::new(),
                total_pages: 0,
            }))
    }

    async fn get_prescription(&self, id: PrescriptionId) -> ClientResult<Prescription> {
        let url = format!("/api/v1/prescription/{id}");
        if let Some(err) = self.failure(&url) {
            return Err(err);
        }
        self.prescriptions
            .lock()
            .expect("prescriptions")
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::from_status(url, 404, r#"{"message":"not found"}"#))
    }

    async fn create_prescription(&self, _body: &NewPrescription) -> ClientResult<ApiMessage> {
        Ok(ApiMessage {
            message: "Prescription Created".to_string(),
        })
    }

    async fn update_prescription(
        &self,
        _id: PrescriptionId,
        _body: &PrescriptionEdit,
    ) -> ClientResult<ApiMessage> {
        Ok(ApiMessage {
            message: "Prescription Updated".to_string(),
        })
    }

    async fn delete_prescription(&self, _id: PrescriptionId) -> ClientResult<ApiMessage> {
        Ok(ApiMessage {
            message: "Prescription Deleted".to_string(),
        })
    }

    async fn daily_counts(&self) -> ClientResult<Vec<DailyCount>> {
        Ok(Vec::new())
    }
}
