//! Audience resolution: does a form apply to a given user?
//!
//! The same predicate backs both the form listing for target users and the
//! authorization check of a submission attempt.

use serde::{Deserialize, Serialize};

use crate::form::{AudienceTarget, FormStatus};
use crate::roles::Role;
use crate::types::DbId;

/// Attributes of the exam center a user manages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamCenterAttributes {
    pub gender: Option<String>,
    pub period: Option<String>,
    pub organization_type: Option<String>,
}

/// Everything the resolver needs to know about a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAudience {
    pub user_id: DbId,
    pub role: Role,
    pub district_id: Option<DbId>,
    pub exam_center: Option<ExamCenterAttributes>,
}

/// Pure targeting check, ignoring the definition status.
pub fn resolve(target: &AudienceTarget, user: &UserAudience) -> bool {
    if !target.roles.contains(&user.role) {
        return false;
    }

    if !target.districts.is_empty() && user.role.is_district_scoped() {
        match user.district_id {
            Some(district) if target.districts.contains(&district) => {}
            _ => return false,
        }
    }

    if user.role == Role::ExamCenterManager {
        let center = user.exam_center.as_ref();
        let axes = [
            (&target.gender, center.and_then(|c| c.gender.as_ref())),
            (&target.period, center.and_then(|c| c.period.as_ref())),
            (
                &target.organization_type,
                center.and_then(|c| c.organization_type.as_ref()),
            ),
        ];
        for (wanted, actual) in axes {
            if let Some(wanted) = wanted {
                if actual != Some(wanted) {
                    return false;
                }
            }
        }
    }

    true
}

/// Full visibility check: targeting plus `status = active`.
pub fn is_visible(status: FormStatus, target: &AudienceTarget, user: &UserAudience) -> bool {
    status == FormStatus::Active && resolve(target, user)
}
