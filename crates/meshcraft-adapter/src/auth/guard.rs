/*
[INPUT]:  Navigation target and current session
[OUTPUT]: Allow / redirect-to-login decision
[POS]:    Auth layer - route guard evaluated before showing protected screens
[UPDATE]: When screens are added or their sign-in requirement changes
*/

use super::SessionManager;

/// Screens the app can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Gallery,
    ModelDetail(String),
    Create,
    Printers,
    PrinterDetail(String),
    Profile,
    Login,
}

impl Route {
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Create | Route::Printers | Route::PrinterDetail(_) | Route::Profile
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Send the user to login, then back to `return_to`
    RedirectToLogin { return_to: Route },
}

pub fn guard(route: &Route, session: &SessionManager) -> GuardDecision {
    if route.requires_auth() && !session.is_authenticated() {
        GuardDecision::RedirectToLogin {
            return_to: route.clone(),
        }
    } else {
        GuardDecision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes_allowed_signed_out() {
        let session = SessionManager::new();
        assert_eq!(guard(&Route::Gallery, &session), GuardDecision::Allow);
        assert_eq!(
            guard(&Route::ModelDetail("m1".into()), &session),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_protected_route_redirects_signed_out() {
        let session = SessionManager::new();
        assert_eq!(
            guard(&Route::PrinterDetail("d1".into()), &session),
            GuardDecision::RedirectToLogin {
                return_to: Route::PrinterDetail("d1".into())
            }
        );
    }

    #[test]
    fn test_protected_route_allowed_signed_in() {
        let session = SessionManager::new();
        session.set_token("t".to_string(), Some(60), None);
        assert_eq!(guard(&Route::Printers, &session), GuardDecision::Allow);
    }
}
