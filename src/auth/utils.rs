use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::user::UserRole,
};

pub fn require_role(claims: &Claims, allowed: &[UserRole]) -> AppResult<()> {
    if !allowed.contains(&claims.role) {
        return Err(AppError::Unauthorized(format!(
            "Role '{}' cannot perform this action",
            claims.role.as_str()
        )));
    }
    Ok(())
}

/// Research managers see every class; everyone else only their own.
pub fn require_class_member(claims: &Claims, experiment_id: &str, class_id: &str) -> AppResult<()> {
    if claims.role == UserRole::ResearchManager {
        return Ok(());
    }
    match claims.class_scope() {
        Some((e, c)) if e == experiment_id && c == class_id => Ok(()),
        Some(_) => Err(AppError::Unauthorized(
            "You can only access your own class".to_string(),
        )),
        None => Err(AppError::MissingContext(
            "Session has no class; sign in again".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_claims(role: UserRole, class: Option<(&str, &str)>) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            username: "user".to_string(),
            role,
            experiment_id: class.map(|(e, _)| e.to_string()),
            class_id: class.map(|(_, c)| c.to_string()),
            iat: 0,
            exp: 9999999999,
        }
    }

    #[test]
    fn test_require_role() {
        let claims = create_test_claims(UserRole::Teacher, Some(("exp1", "classA")));
        assert!(require_role(&claims, &[UserRole::Teacher, UserRole::ResearchManager]).is_ok());
        assert!(require_role(&claims, &[UserRole::ResearchManager]).is_err());
    }

    #[test]
    fn test_require_class_member_own_class() {
        let claims = create_test_claims(UserRole::Student, Some(("exp1", "classA")));
        assert!(require_class_member(&claims, "exp1", "classA").is_ok());
        assert!(matches!(
            require_class_member(&claims, "exp1", "classB"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_require_class_member_manager_bypass() {
        let claims = create_test_claims(UserRole::ResearchManager, None);
        assert!(require_class_member(&claims, "exp9", "anything").is_ok());
    }

    #[test]
    fn test_require_class_member_without_class() {
        let claims = create_test_claims(UserRole::Teacher, None);
        assert!(matches!(
            require_class_member(&claims, "exp1", "classA"),
            Err(AppError::MissingContext(_))
        ));
    }
}
