//! UI-agnostic core of the prescription desk: REST backend, session,
//! list query state machine, router and render models.

pub mod backend;
pub mod config;
pub mod error;
pub mod form;
pub mod list;
pub mod query;
pub mod router;
pub mod session;
pub mod view;

pub use backend::{ClientResult, HttpBackend, PrescriptionBackend};
pub use config::{load_settings, ClientSettings};
pub use error::ClientError;
pub use form::{FormError, FormField, PrescriptionForm};
pub use list::{Completion, ListController, ListDriver};
pub use query::{on_state_change, FetchRequest, ListIntent, QueryState};
pub use router::{guard, resolve_route, GuardOutcome, ResolvedRoute, Route, RouteError};
pub use session::{AuthSession, TokenStatus};
pub use view::{render_list, render_overview, ListBody, ListViewModel};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
