//! Backend commands queued from UI to backend worker.

use client_core::{FetchRequest, Route};
use shared::{
    domain::PrescriptionId,
    protocol::{NewPrescription, PrescriptionEdit},
};

#[derive(Debug)]
pub enum BackendCommand {
    Login {
        username: String,
        password: String,
    },
    Logout,
    FetchPrescriptions(FetchRequest),
    /// The list view went away; its outstanding fetch is no longer wanted.
    CancelPrescriptionFetch,
    ResolveRoute {
        navigation: u64,
        route: Route,
    },
    LoadOverview,
    CreatePrescription(NewPrescription),
    UpdatePrescription {
        id: PrescriptionId,
        edit: PrescriptionEdit,
    },
    DeletePrescription {
        id: PrescriptionId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::FetchPrescriptions(_) => "fetch_prescriptions",
            Self::CancelPrescriptionFetch => "cancel_prescription_fetch",
            Self::ResolveRoute { .. } => "resolve_route",
            Self::LoadOverview => "load_overview",
            Self::CreatePrescription(_) => "create_prescription",
            Self::UpdatePrescription { .. } => "update_prescription",
            Self::DeletePrescription { .. } => "delete_prescription",
        }
    }
}
