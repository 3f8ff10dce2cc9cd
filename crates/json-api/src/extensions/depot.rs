//! Depot helper extensions.

use std::any::Any;

use qrewards_app::{auth::Principal, domain::users::records::UserUuid};
use salvo::prelude::{Depot, StatusError};

const PRINCIPAL_DEPOT_KEY: &str = "principal";

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_principal(&mut self, principal: Principal);

    fn principal_or_401(&self) -> Result<Principal, StatusError>;

    /// The signed-in user; admin sessions are refused.
    fn user_or_403(&self) -> Result<UserUuid, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.insert(PRINCIPAL_DEPOT_KEY, principal);
    }

    fn principal_or_401(&self) -> Result<Principal, StatusError> {
        self.get::<Principal>(PRINCIPAL_DEPOT_KEY)
            .copied()
            .map_err(|_missing| StatusError::unauthorized())
    }

    fn user_or_403(&self) -> Result<UserUuid, StatusError> {
        self.principal_or_401()?
            .user()
            .ok_or_else(|| StatusError::forbidden().brief("User session required"))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn missing_principal_is_unauthorized() {
        let depot = Depot::new();

        let result = depot.principal_or_401();

        assert!(
            result.is_err_and(|error| error.code == salvo::http::StatusCode::UNAUTHORIZED),
            "expected 401"
        );
    }

    #[test]
    fn admin_principal_is_not_a_user() {
        let mut depot = Depot::new();

        depot.insert_principal(Principal::Admin);

        let result = depot.user_or_403();

        assert!(
            result.is_err_and(|error| error.code == salvo::http::StatusCode::FORBIDDEN),
            "expected 403"
        );
    }

    #[test]
    fn user_principal_resolves_its_uuid() {
        let user = UserUuid::from_uuid(Uuid::nil());
        let mut depot = Depot::new();

        depot.insert_principal(Principal::User(user));

        assert_eq!(depot.user_or_403().ok(), Some(user));
    }
}
