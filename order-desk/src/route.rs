//! Navigation targets
//!
//! Where the desk sends the user after login, logout, an auth failure or a
//! successful submission.

use sales_client::{Role, UserProfile};
use std::fmt;

const RETURN_TO: &str = "returnTo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Login page, optionally carrying the intended destination
    Login { return_to: Option<String> },
    Dashboard,
    SalesDashboard,
    DistributorDashboard,
    OrderList,
    CreateOrder,
}

impl Route {
    /// Login redirect that brings the user back to `return_to`
    pub fn login_redirect(return_to: impl Into<String>) -> Self {
        Self::Login {
            return_to: Some(return_to.into()),
        }
    }

    /// Landing dashboard for a role
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::SalesPerson => Self::SalesDashboard,
            _ => Self::DistributorDashboard,
        }
    }

    /// Where to go after logging in: the saved destination if it is a known
    /// page, otherwise the user's dashboard
    pub fn after_login(user: &UserProfile, destination: Option<&str>) -> Self {
        destination
            .and_then(Self::from_path)
            .filter(|route| !matches!(route, Self::Login { .. }))
            .unwrap_or_else(|| Self::dashboard_for(user.role))
    }

    /// Page shown after an order was created
    pub fn after_submit() -> Self {
        Self::OrderList
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login { return_to: None } => "/login".to_string(),
            Self::Login {
                return_to: Some(target),
            } => format!("/login?{RETURN_TO}={}", urlencoding::encode(target)),
            Self::Dashboard => "/dashboard".to_string(),
            Self::SalesDashboard => "/sales/dashboard".to_string(),
            Self::DistributorDashboard => "/distributor/dashboard".to_string(),
            Self::OrderList => "/sales/orders".to_string(),
            Self::CreateOrder => "/sales/orders/create".to_string(),
        }
    }

    /// Parses a path produced by [`Route::path`]
    pub fn from_path(path: &str) -> Option<Self> {
        let (base, query) = match path.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (path, None),
        };
        let route = match base.trim_end_matches('/') {
            "/login" => {
                let return_to = query
                    .into_iter()
                    .flat_map(|q| q.split('&'))
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(key, _)| *key == RETURN_TO)
                    .and_then(|(_, value)| urlencoding::decode(value).ok())
                    .map(|value| value.into_owned());
                Self::Login { return_to }
            }
            "/dashboard" => Self::Dashboard,
            "/sales/dashboard" => Self::SalesDashboard,
            "/distributor/dashboard" => Self::DistributorDashboard,
            "/sales/orders" => Self::OrderList,
            "/sales/orders/create" => Self::CreateOrder,
            _ => return None,
        };
        Some(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> UserProfile {
        UserProfile {
            id: 1,
            username: "vishal".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone_number: String::new(),
            address: String::new(),
            role,
            is_active: true,
            distributor: None,
        }
    }

    #[test]
    fn test_login_redirect_is_encoded() {
        let route = Route::login_redirect("/sales/orders/create?step=2");
        assert_eq!(
            route.path(),
            "/login?returnTo=%2Fsales%2Forders%2Fcreate%3Fstep%3D2"
        );
        assert_eq!(Route::from_path(&route.path()), Some(route));
    }

    #[test]
    fn test_role_dashboards() {
        assert_eq!(
            Route::after_login(&user(Role::SalesPerson), None),
            Route::SalesDashboard
        );
        assert_eq!(
            Route::after_login(&user(Role::Distributor), None),
            Route::DistributorDashboard
        );
        assert_eq!(
            Route::after_login(&user(Role::Other), Some("/nowhere")),
            Route::DistributorDashboard
        );
    }

    #[test]
    fn test_saved_destination_wins() {
        assert_eq!(
            Route::after_login(&user(Role::SalesPerson), Some("/sales/orders/create")),
            Route::CreateOrder
        );
        assert_eq!(
            Route::after_login(&user(Role::SalesPerson), Some("/login?returnTo=%2Fsales")),
            Route::SalesDashboard
        );
    }
}
