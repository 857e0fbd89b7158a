// src/services/auth_service.rs
//
// Stateless authentication decision logic over the injected repository
// capability. The service encodes the decision order; persistence and
// admin bootstrapping belong to the repository.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::repositories::{AuthRepository, UserRecord};

/// Authentication mode. Anything that is not "signup" is a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    SignUp,
}

impl AuthMode {
    pub fn parse(mode: &str) -> AuthMode {
        if mode == "signup" {
            AuthMode::SignUp
        } else {
            AuthMode::Login
        }
    }
}

/// Presentation-boundary auth outcome. `role` is empty on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResult {
    pub success: bool,
    pub message: String,
    pub role: String,
}

impl AuthResult {
    fn granted(message: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            role: role.into(),
        }
    }

    fn denied(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            role: String::new(),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub struct AuthService {
    repository: Option<Arc<dyn AuthRepository>>,
}

impl AuthService {
    pub fn new(repository: Option<Arc<dyn AuthRepository>>) -> Self {
        Self { repository }
    }

    /// Decision order: required fields, then signup password match, then
    /// repository presence, then dispatch. Repository-level failures come
    /// back as the same generic denial as a plain mismatch, so the result
    /// never reveals whether an identifier exists.
    pub fn authenticate(
        &self,
        mode: AuthMode,
        identifier: &str,
        password: &str,
        confirm_password: &str,
    ) -> AuthResult {
        if is_blank(identifier) || is_blank(password) {
            return AuthResult::denied("Please fill in all required fields.");
        }

        if mode == AuthMode::SignUp && password != confirm_password {
            return AuthResult::denied("Passwords do not match.");
        }

        let Some(repository) = &self.repository else {
            return AuthResult::denied("Auth backend unavailable.");
        };

        match mode {
            AuthMode::SignUp => match repository.create_user(identifier, password) {
                Ok(Some(user)) => AuthResult::granted("Account created.", user.role.to_string()),
                Ok(None) => AuthResult::denied("Unable to create account."),
                Err(e) => {
                    log::warn!("signup failed for repository reasons: {}", e);
                    AuthResult::denied("Unable to create account.")
                }
            },
            AuthMode::Login => match repository.find_user(identifier, password) {
                Ok(Some(user)) => AuthResult::granted(
                    format!("Authenticated as {}", user.role),
                    user.role.to_string(),
                ),
                Ok(None) => AuthResult::denied("Invalid credentials."),
                Err(e) => {
                    log::warn!("login failed for repository reasons: {}", e);
                    AuthResult::denied("Invalid credentials.")
                }
            },
        }
    }

    /// Admin listing of all accounts, newest first.
    pub fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        match &self.repository {
            Some(repository) => repository.list_users(),
            None => Err(AppError::Other("Auth backend unavailable".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::repositories::{AuthUser, MockAuthRepository};

    fn service_with(repository: MockAuthRepository) -> AuthService {
        AuthService::new(Some(Arc::new(repository)))
    }

    #[test]
    fn test_blank_fields_fail_before_the_repository() {
        // No repository wired: a repository touch would fail differently.
        let service = AuthService::new(None);

        let result = service.authenticate(AuthMode::Login, "  ", "pw", "");
        assert_eq!(result.message, "Please fill in all required fields.");

        let result = service.authenticate(AuthMode::SignUp, "user@example.com", "   ", "   ");
        assert_eq!(result.message, "Please fill in all required fields.");
    }

    #[test]
    fn test_signup_password_mismatch_fails_regardless_of_identifier() {
        let service = AuthService::new(None);

        let result = service.authenticate(AuthMode::SignUp, "anything", "pw1", "pw2");
        assert!(!result.success);
        assert_eq!(result.message, "Passwords do not match.");
    }

    #[test]
    fn test_missing_repository_is_a_distinct_failure() {
        let service = AuthService::new(None);

        let result = service.authenticate(AuthMode::Login, "user@example.com", "pw", "");
        assert_eq!(result.message, "Auth backend unavailable.");
    }

    #[test]
    fn test_signup_success_grants_user_role() {
        let mut repository = MockAuthRepository::new();
        repository.expect_create_user().returning(|identifier, _| {
            Ok(Some(AuthUser {
                identifier: identifier.to_string(),
                role: Role::User,
            }))
        });

        let result =
            service_with(repository).authenticate(AuthMode::SignUp, "new@example.com", "pw", "pw");

        assert!(result.success);
        assert_eq!(result.message, "Account created.");
        assert_eq!(result.role, "user");
    }

    #[test]
    fn test_signup_rejection_is_generic() {
        let mut repository = MockAuthRepository::new();
        repository.expect_create_user().returning(|_, _| Ok(None));

        let result =
            service_with(repository).authenticate(AuthMode::SignUp, "taken@example.com", "pw", "pw");

        assert!(!result.success);
        assert_eq!(result.message, "Unable to create account.");
    }

    #[test]
    fn test_login_success_reports_role() {
        let mut repository = MockAuthRepository::new();
        repository.expect_find_user().returning(|identifier, _| {
            Ok(Some(AuthUser {
                identifier: identifier.to_string(),
                role: Role::Admin,
            }))
        });

        let result = service_with(repository).authenticate(AuthMode::Login, "admin", "admin1234", "");

        assert!(result.success);
        assert_eq!(result.message, "Authenticated as admin");
        assert_eq!(result.role, "admin");
    }

    #[test]
    fn test_login_failure_does_not_reveal_identifier_existence() {
        let mut repository = MockAuthRepository::new();
        repository.expect_find_user().returning(|_, _| Ok(None));

        let result = service_with(repository).authenticate(AuthMode::Login, "ghost", "pw", "");

        assert!(!result.success);
        assert_eq!(result.message, "Invalid credentials.");
        assert_eq!(result.role, "");
    }

    #[test]
    fn test_unknown_mode_is_treated_as_login() {
        assert_eq!(AuthMode::parse("signup"), AuthMode::SignUp);
        assert_eq!(AuthMode::parse("login"), AuthMode::Login);
        assert_eq!(AuthMode::parse(""), AuthMode::Login);
        assert_eq!(AuthMode::parse("reset"), AuthMode::Login);
    }
}
