//! Path ↔ route mapping, the session guard, and pre-fetching of route data.

use std::fmt;

use shared::{domain::PrescriptionId, protocol::Prescription};
use thiserror::Error;
use tracing::{info, warn};

use crate::{backend::PrescriptionBackend, error::ClientError, session::AuthSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Overview,
    PrescriptionList,
    PrescriptionDetail(PrescriptionId),
    EditPrescription(PrescriptionId),
    CreatePrescription,
    Login,
}

impl Route {
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
        let not_found = || RouteError::NotFound {
            path: path.to_string(),
        };

        match segments.as_slice() {
            [] => Ok(Self::Overview),
            ["prescription"] => Ok(Self::PrescriptionList),
            ["prescription", id] => parse_id(id)
                .map(Self::PrescriptionDetail)
                .ok_or_else(not_found),
            ["edit-prescription", id] => parse_id(id)
                .map(Self::EditPrescription)
                .ok_or_else(not_found),
            ["create-prescription"] => Ok(Self::CreatePrescription),
            ["login"] => Ok(Self::Login),
            _ => Err(not_found()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Overview => "/".to_string(),
            Self::PrescriptionList => "/prescription".to_string(),
            Self::PrescriptionDetail(id) => format!("/prescription/{id}"),
            Self::EditPrescription(id) => format!("/edit-prescription/{id}"),
            Self::CreatePrescription => "/create-prescription".to_string(),
            Self::Login => "/login".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::PrescriptionList => "All Prescriptions",
            Self::PrescriptionDetail(_) => "Prescription Details",
            Self::EditPrescription(_) => "Edit Prescription",
            Self::CreatePrescription => "Create Prescription",
            Self::Login => "Login",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_id(raw: &str) -> Option<PrescriptionId> {
    raw.parse::<i64>().ok().map(PrescriptionId)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow(Route),
    /// Sign in first; `then` is where to go afterwards.
    RedirectToLogin { then: Route },
}

pub fn guard(route: Route, session: &AuthSession) -> GuardOutcome {
    if !route.requires_auth() || session.is_authenticated() {
        GuardOutcome::Allow(route)
    } else {
        info!(route = %route, "router: unauthenticated, redirecting to login");
        GuardOutcome::RedirectToLogin { then: route }
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no page at {path}")]
    NotFound { path: String },
    #[error("sign in to open {route}")]
    Unauthenticated { route: Route },
    #[error("prescription {id} does not exist")]
    MissingEntity { id: PrescriptionId },
    #[error("failed to load prescription {id}: {source}")]
    Load {
        id: PrescriptionId,
        #[source]
        source: ClientError,
    },
}

/// A route whose data is ready for the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRoute {
    Overview,
    PrescriptionList,
    PrescriptionDetail(Prescription),
    EditPrescription(Prescription),
    CreatePrescription,
    Login,
}

impl ResolvedRoute {
    pub fn route(&self) -> Route {
        match self {
            Self::Overview => Route::Overview,
            Self::PrescriptionList => Route::PrescriptionList,
            Self::PrescriptionDetail(p) => Route::PrescriptionDetail(p.id),
            Self::EditPrescription(p) => Route::EditPrescription(p.id),
            Self::CreatePrescription => Route::CreatePrescription,
            Self::Login => Route::Login,
        }
    }
}

/// Guards `route` and loads whatever it needs before the view takes over.
pub async fn resolve_route(
    route: Route,
    session: &AuthSession,
    backend: &dyn PrescriptionBackend,
) -> Result<ResolvedRoute, RouteError> {
    if let GuardOutcome::RedirectToLogin { then } = guard(route, session) {
        return Err(RouteError::Unauthenticated { route: then });
    }

    let resolved = match route {
        Route::Overview => ResolvedRoute::Overview,
        Route::PrescriptionList => ResolvedRoute::PrescriptionList,
        Route::CreatePrescription => ResolvedRoute::CreatePrescription,
        Route::Login => ResolvedRoute::Login,
        Route::PrescriptionDetail(id) => {
            ResolvedRoute::PrescriptionDetail(load_prescription(route, id, backend).await?)
        }
        Route::EditPrescription(id) => {
            ResolvedRoute::EditPrescription(load_prescription(route, id, backend).await?)
        }
    };
    Ok(resolved)
}

async fn load_prescription(
    route: Route,
    id: PrescriptionId,
    backend: &dyn PrescriptionBackend,
) -> Result<Prescription, RouteError> {
    match backend.get_prescription(id).await {
        Ok(prescription) => Ok(prescription),
        Err(err) if err.is_not_found() => {
            warn!(id = id.0, "router: prescription not found");
            Err(RouteError::MissingEntity { id })
        }
        Err(err) if err.requires_reauth() => {
            warn!(id = id.0, "router: session rejected while loading prescription");
            Err(RouteError::Unauthenticated { route })
        }
        Err(source) => {
            warn!(id = id.0, "router: failed to load prescription: {source}");
            Err(RouteError::Load { id, source })
        }
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
