//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ClientError, ResolvedRoute, RouteError};
use shared::{
    domain::PrescriptionId,
    error::ErrorCode,
    protocol::{DailyCount, Page, PrescriptionSummary},
};

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    LoginOk,
    LoggedOut,
    PrescriptionsLoaded {
        generation: u64,
        result: Result<Page<PrescriptionSummary>, ClientError>,
    },
    RouteResolved {
        navigation: u64,
        result: Result<ResolvedRoute, RouteError>,
    },
    OverviewLoaded(Vec<DailyCount>),
    /// `id` is set for edits; creations land back on the list.
    PrescriptionSaved {
        id: Option<PrescriptionId>,
        message: String,
    },
    PrescriptionDeleted {
        id: PrescriptionId,
        message: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    NotFound,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Login,
    ListPrescriptions,
    LoadRoute,
    SavePrescription,
    DeletePrescription,
    Overview,
}

pub fn classify_login_failure(error: &UiError) -> String {
    match error.category() {
        UiErrorCategory::Auth => "Invalid username or password.".to_string(),
        UiErrorCategory::Transport => {
            "Server unreachable; check the API URL/network and retry sign-in.".to_string()
        }
        _ => format!("Login/API error: {}", error.message()),
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client(context: UiErrorContext, error: &ClientError) -> Self {
        let category = match error {
            ClientError::Transport { .. } => UiErrorCategory::Transport,
            ClientError::Decode { .. } | ClientError::InvalidUrl(_) => UiErrorCategory::Validation,
            _ => match error.code() {
                Some(ErrorCode::Unauthorized | ErrorCode::Forbidden) => UiErrorCategory::Auth,
                Some(ErrorCode::NotFound) => UiErrorCategory::NotFound,
                Some(ErrorCode::Validation | ErrorCode::Conflict) => UiErrorCategory::Validation,
                Some(ErrorCode::Internal) => UiErrorCategory::Transport,
                _ => UiErrorCategory::Unknown,
            },
        };
        Self {
            category,
            context,
            message: error.to_string(),
        }
    }

    pub fn from_route(error: &RouteError) -> Self {
        match error {
            RouteError::Load { source, .. } => {
                let mut classified = Self::from_client(UiErrorContext::LoadRoute, source);
                classified.message = error.to_string();
                classified
            }
            RouteError::Unauthenticated { .. } => Self {
                category: UiErrorCategory::Auth,
                context: UiErrorContext::LoadRoute,
                message: error.to_string(),
            },
            RouteError::NotFound { .. } | RouteError::MissingEntity { .. } => Self {
                category: UiErrorCategory::NotFound,
                context: UiErrorContext::LoadRoute,
                message: error.to_string(),
            },
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("session expired")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("404") || message_lower.contains("not found") {
            UiErrorCategory::NotFound
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("required")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
