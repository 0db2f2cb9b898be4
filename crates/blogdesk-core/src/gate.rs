//! Route-level access gating
//!
//! Every navigation asks the gate whether the requested view may run. The gate reads the
//! credential store on each call and never caches a decision, so a credential that expired
//! (or was revoked by the server) between two navigations is noticed on the next one.

use crate::session::CredentialStore;
use crate::types::ResourceId;
use tracing::{debug, warn};

/// Whether a usable credential is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// A non-expired credential is stored
    Authenticated,
    /// No credential, or only an expired one
    Unauthenticated,
}

/// Screens of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in screen
    Login,
    /// Dashboard landing page
    Home,
    /// Blog list
    Blogs,
    /// Blog create form
    NewBlog,
    /// Blog edit form
    EditBlog(ResourceId),
    /// Contact leads
    Contacts,
    /// Scheduled calls
    ScheduledCalls,
    /// Admin account management
    Settings,
}

impl Route {
    /// Routes reachable only while signed out
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// URL path of the screen
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Home => "/".to_string(),
            Self::Blogs => "/blog".to_string(),
            Self::NewBlog => "/add-blog".to_string(),
            Self::EditBlog(id) => format!("/add-blog/{id}"),
            Self::Contacts => "/contact".to_string(),
            Self::ScheduledCalls => "/schedule-list".to_string(),
            Self::Settings => "/settings".to_string(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Gate decision for a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<V> {
    /// Render the requested view
    Allow(V),
    /// Navigate elsewhere instead
    Redirect(Route),
}

impl<V> Gate<V> {
    /// The view, if allowed
    pub fn allowed(self) -> Option<V> {
        match self {
            Self::Allow(view) => Some(view),
            Self::Redirect(_) => None,
        }
    }

    /// Whether the gate redirected
    pub const fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }
}

/// Private-view policy: signed-out visitors go to the login screen
pub fn guard_private<V>(state: AuthState, view: V) -> Gate<V> {
    match state {
        AuthState::Authenticated => Gate::Allow(view),
        AuthState::Unauthenticated => Gate::Redirect(Route::Login),
    }
}

/// Public-view policy: signed-in users are sent home instead of seeing login again
pub fn guard_public<V>(state: AuthState, view: V) -> Gate<V> {
    match state {
        AuthState::Authenticated => Gate::Redirect(Route::Home),
        AuthState::Unauthenticated => Gate::Allow(view),
    }
}

/// Applies the access policies against a credential store
#[derive(Debug, Clone)]
pub struct AccessGate<S> {
    store: S,
}

impl<S: CredentialStore> AccessGate<S> {
    /// Gate reading from `store`
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying credential store
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current authentication state, read fresh from the store
    pub fn state(&self) -> AuthState {
        match self.store.current() {
            Ok(Some(_)) => AuthState::Authenticated,
            Ok(None) => AuthState::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "Credential store unreadable; treating as signed out");
                AuthState::Unauthenticated
            }
        }
    }

    /// Allow `view` only with a credential present
    pub fn guard_private<V>(&self, view: V) -> Gate<V> {
        guard_private(self.state(), view)
    }

    /// Allow `view` only without a credential present
    pub fn guard_public<V>(&self, view: V) -> Gate<V> {
        guard_public(self.state(), view)
    }

    /// Resolve a navigation to `route`, applying the policy that matches it
    pub fn navigate(&self, route: Route) -> Gate<Route> {
        let decision = if route.is_public() {
            self.guard_public(route.clone())
        } else {
            self.guard_private(route.clone())
        };
        if let Gate::Redirect(target) = &decision {
            debug!(requested = %route, redirect = %target, "Navigation redirected");
        }
        decision
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{Credential, MemoryCredentialStore};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    fn signed_in() -> MemoryCredentialStore {
        MemoryCredentialStore::with_credential(Credential::issue("tok", 7, Utc::now()))
    }

    #[rstest]
    #[case(Route::Home)]
    #[case(Route::Blogs)]
    #[case(Route::NewBlog)]
    #[case(Route::EditBlog("42".to_string()))]
    #[case(Route::Contacts)]
    #[case(Route::ScheduledCalls)]
    #[case(Route::Settings)]
    fn test_private_routes_redirect_to_login_when_signed_out(#[case] route: Route) {
        let gate = AccessGate::new(MemoryCredentialStore::new());
        assert_eq!(gate.navigate(route), Gate::Redirect(Route::Login));
    }

    #[rstest]
    #[case(Route::Home)]
    #[case(Route::EditBlog("42".to_string()))]
    #[case(Route::Settings)]
    fn test_private_routes_render_when_signed_in(#[case] route: Route) {
        let gate = AccessGate::new(signed_in());
        assert_eq!(gate.navigate(route.clone()), Gate::Allow(route));
    }

    #[test]
    fn test_login_redirects_home_when_signed_in() {
        let gate = AccessGate::new(signed_in());
        assert_eq!(gate.navigate(Route::Login), Gate::Redirect(Route::Home));

        let gate = AccessGate::new(MemoryCredentialStore::new());
        assert_eq!(gate.navigate(Route::Login), Gate::Allow(Route::Login));
    }

    #[test]
    fn test_decision_is_not_cached() {
        let store = signed_in();
        let gate = AccessGate::new(store.clone());
        assert_eq!(gate.state(), AuthState::Authenticated);

        store.clear().unwrap();
        assert_eq!(gate.navigate(Route::Blogs), Gate::Redirect(Route::Login));
    }

    #[test]
    fn test_expired_credential_counts_as_signed_out() {
        let issued = Utc::now() - Duration::days(8);
        let gate = AccessGate::new(MemoryCredentialStore::with_credential(Credential::issue(
            "tok", 7, issued,
        )));
        assert_eq!(gate.state(), AuthState::Unauthenticated);
        assert!(gate.guard_private(()).is_redirect());
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::EditBlog("123".to_string()).path(), "/add-blog/123");
        assert_eq!(Route::ScheduledCalls.to_string(), "/schedule-list");
        assert!(Route::Login.is_public());
        assert!(!Route::Home.is_public());
    }

    fn any_state() -> impl Strategy<Value = AuthState> {
        prop_oneof![
            Just(AuthState::Authenticated),
            Just(AuthState::Unauthenticated)
        ]
    }

    proptest! {
        #[test]
        fn prop_policies_are_complementary(state in any_state(), view in any::<u8>()) {
            let private = guard_private(state, view);
            let public = guard_public(state, view);

            prop_assert_eq!(private.is_redirect(), state == AuthState::Unauthenticated);
            prop_assert_eq!(public.is_redirect(), state == AuthState::Authenticated);
            prop_assert_ne!(private.is_redirect(), public.is_redirect());
        }
    }
}
