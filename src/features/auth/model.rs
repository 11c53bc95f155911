use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::ROLE_OFFICIAL;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    /// Display name carried by the token, used as the reporter name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check if user is official (can review and verify reports)
    pub fn is_official(&self) -> bool {
        self.has_role(ROLE_OFFICIAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_checks() {
        let user = AuthenticatedUser {
            sub: "u-1".to_string(),
            name: None,
            roles: vec![ROLE_OFFICIAL.to_string()],
        };
        assert!(user.is_official());
        assert!(!user.has_role("citizen"));
        assert!(!user.has_role("super_admin"));
    }
}
