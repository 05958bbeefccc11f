//! Navigation state transitions: guard, in-flight resolution tracking, and
//! the post-login return target.

use client_core::{guard, AuthSession, GuardOutcome, Route};

/// What the shell has to do after a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavStep {
    /// Ask the backend to resolve `route`; the answer carries `navigation`.
    Resolve { navigation: u64, route: Route },
    ShowLogin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingNavigation {
    id: u64,
    route: Route,
}

#[derive(Debug)]
pub struct Navigator {
    current: Route,
    pending: Option<PendingNavigation>,
    next_id: u64,
    after_login: Option<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Route::Login,
            pending: None,
            next_id: 0,
            after_login: None,
        }
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn pending_route(&self) -> Option<Route> {
        self.pending.map(|pending| pending.route)
    }

    pub fn request(&mut self, route: Route, session: &AuthSession) -> NavStep {
        match guard(route, session) {
            GuardOutcome::RedirectToLogin { then } => {
                self.redirect_to_login(then);
                NavStep::ShowLogin
            }
            GuardOutcome::Allow(route) => {
                self.next_id += 1;
                self.pending = Some(PendingNavigation {
                    id: self.next_id,
                    route,
                });
                NavStep::Resolve {
                    navigation: self.next_id,
                    route,
                }
            }
        }
    }

    /// Drops any pending resolution and remembers `then` for after sign-in.
    pub fn redirect_to_login(&mut self, then: Route) {
        self.pending = None;
        self.current = Route::Login;
        if then != Route::Login {
            self.after_login = Some(then);
        }
    }

    /// Accepts a resolution result only when it answers the latest request.
    /// The shell then shows the route's page, or its error view.
    pub fn settle(&mut self, navigation: u64) -> bool {
        match self.pending {
            Some(pending) if pending.id == navigation => {
                self.pending = None;
                self.current = pending.route;
                true
            }
            _ => {
                tracing::debug!(navigation, "dropping superseded route resolution");
                false
            }
        }
    }

    pub fn take_after_login(&mut self) -> Route {
        self.after_login.take().unwrap_or(Route::Overview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::PrescriptionId;

    #[test]
    fn signed_out_request_redirects_and_remembers_target() {
        let session = AuthSession::new();
        let mut nav = Navigator::new();

        let target = Route::PrescriptionDetail(PrescriptionId(4));
        assert_eq!(nav.request(target, &session), NavStep::ShowLogin);
        assert_eq!(nav.current(), Route::Login);
        assert_eq!(nav.take_after_login(), target);
        assert_eq!(nav.take_after_login(), Route::Overview);
    }

    #[test]
    fn only_latest_resolution_is_accepted() {
        let session = AuthSession::with_token("opaque");
        let mut nav = Navigator::new();

        let NavStep::Resolve { navigation: first, .. } =
            nav.request(Route::PrescriptionList, &session)
        else {
            panic!("expected resolve");
        };
        let NavStep::Resolve {
            navigation: second,
            route,
        } = nav.request(Route::Overview, &session)
        else {
            panic!("expected resolve");
        };
        assert_eq!(route, Route::Overview);
        assert_eq!(nav.pending_route(), Some(Route::Overview));

        assert!(!nav.settle(first));
        assert_eq!(nav.current(), Route::Login);
        assert!(nav.settle(second));
        assert_eq!(nav.current(), Route::Overview);
        assert_eq!(nav.pending_route(), None);
    }

    #[test]
    fn settled_navigation_is_not_accepted_twice() {
        let session = AuthSession::with_token("opaque");
        let mut nav = Navigator::new();
        let NavStep::Resolve { navigation, .. } =
            nav.request(Route::EditPrescription(PrescriptionId(9)), &session)
        else {
            panic!("expected resolve");
        };
        assert!(nav.settle(navigation));
        assert_eq!(nav.current(), Route::EditPrescription(PrescriptionId(9)));
        assert!(!nav.settle(navigation));
    }

    #[test]
    fn login_redirect_cancels_pending_resolution() {
        let session = AuthSession::with_token("opaque");
        let mut nav = Navigator::new();
        let NavStep::Resolve { navigation, .. } = nav.request(Route::CreatePrescription, &session)
        else {
            panic!("expected resolve");
        };

        nav.redirect_to_login(Route::CreatePrescription);
        assert!(!nav.settle(navigation));
        assert_eq!(nav.current(), Route::Login);
        assert_eq!(nav.take_after_login(), Route::CreatePrescription);
    }
}
