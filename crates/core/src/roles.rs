//! Well-known roles and the authoring permission rules built on them.
//!
//! Role names must match the `chk_users_role` constraint in
//! `20260301000001_create_geography_and_users.sql`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_GENERAL_MANAGER: &str = "general_manager";
pub const ROLE_PROVINCE_MANAGER: &str = "province_manager";
pub const ROLE_DISTRICT_MANAGER: &str = "district_manager";
pub const ROLE_EXAM_CENTER_MANAGER: &str = "exam_center_manager";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[
    ROLE_GENERAL_MANAGER,
    ROLE_PROVINCE_MANAGER,
    ROLE_DISTRICT_MANAGER,
    ROLE_EXAM_CENTER_MANAGER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    GeneralManager,
    ProvinceManager,
    DistrictManager,
    ExamCenterManager,
}

impl Role {
    /// Parse a role string from the database or a token claim.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_GENERAL_MANAGER => Ok(Self::GeneralManager),
            ROLE_PROVINCE_MANAGER => Ok(Self::ProvinceManager),
            ROLE_DISTRICT_MANAGER => Ok(Self::DistrictManager),
            ROLE_EXAM_CENTER_MANAGER => Ok(Self::ExamCenterManager),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: {VALID_ROLES:?}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GeneralManager => ROLE_GENERAL_MANAGER,
            Self::ProvinceManager => ROLE_PROVINCE_MANAGER,
            Self::DistrictManager => ROLE_DISTRICT_MANAGER,
            Self::ExamCenterManager => ROLE_EXAM_CENTER_MANAGER,
        }
    }

    /// Roles allowed to create and edit form definitions.
    pub fn is_author(self) -> bool {
        matches!(self, Self::GeneralManager | Self::ProvinceManager)
    }

    /// The super-role may edit any form created by the authoring tier.
    pub fn is_super(self) -> bool {
        self == Self::GeneralManager
    }

    /// Roles whose audience membership is narrowed by `target_districts`.
    pub fn is_district_scoped(self) -> bool {
        matches!(self, Self::DistrictManager | Self::ExamCenterManager)
    }

    /// Roles that may move submissions through the review lifecycle.
    pub fn is_reviewer(self) -> bool {
        self.is_author()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether `user` may edit (and review) a form created by
/// `created_by` holding `created_by_role` at creation time.
pub fn can_edit_form(
    user_id: DbId,
    user_role: Role,
    created_by: DbId,
    created_by_role: Role,
) -> bool {
    if !user_role.is_author() {
        return false;
    }
    if user_id == created_by {
        return true;
    }
    user_role.is_super() && created_by_role.is_author()
}

/// Same as [`can_edit_form`] but returns a `Forbidden` error on refusal.
pub fn ensure_can_edit_form(
    user_id: DbId,
    user_role: Role,
    created_by: DbId,
    created_by_role: Role,
) -> Result<(), CoreError> {
    if can_edit_form(user_id, user_role, created_by, created_by_role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the form's creator or a general manager may modify this form".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_from_str_valid() {
        for name in VALID_ROLES {
            let role = Role::from_str_db(name).unwrap();
            assert_eq!(role.as_str(), *name);
        }
    }

    #[test]
    fn role_from_str_invalid() {
        assert!(Role::from_str_db("admin").is_err());
        assert!(Role::from_str_db("").is_err());
    }

    #[test]
    fn only_managers_author() {
        assert!(Role::GeneralManager.is_author());
        assert!(Role::ProvinceManager.is_author());
        assert!(!Role::DistrictManager.is_author());
        assert!(!Role::ExamCenterManager.is_author());
    }

    #[test]
    fn owner_can_edit_own_form() {
        assert!(can_edit_form(7, Role::ProvinceManager, 7, Role::ProvinceManager));
    }

    #[test]
    fn province_manager_cannot_edit_others_form() {
        assert!(!can_edit_form(7, Role::ProvinceManager, 8, Role::ProvinceManager));
        assert!(!can_edit_form(7, Role::ProvinceManager, 8, Role::GeneralManager));
    }

    #[test]
    fn general_manager_edits_any_authoring_tier_form() {
        assert!(can_edit_form(1, Role::GeneralManager, 8, Role::ProvinceManager));
        assert!(can_edit_form(1, Role::GeneralManager, 2, Role::GeneralManager));
    }

    #[test]
    fn target_roles_never_edit() {
        assert!(!can_edit_form(5, Role::DistrictManager, 5, Role::DistrictManager));
        assert!(ensure_can_edit_form(5, Role::ExamCenterManager, 1, Role::GeneralManager).is_err());
    }
}
