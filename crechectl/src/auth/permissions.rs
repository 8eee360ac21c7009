//! Role checks and creche scoping for the admin API.
//!
//! `admin` and `staff` see every creche; `creche_manager` is pinned to its own `creche_id`. Only
//! `admin` manages users.

use crate::{
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::{CrecheId, Role},
};

pub fn require_admin(user: &CurrentUser, action: &'static str, resource: &str) -> Result<()> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            action,
            resource: resource.to_string(),
        })
    }
}

/// Platform staff (admin or staff) only, e.g. creating creches.
pub fn require_platform_staff(user: &CurrentUser, action: &'static str, resource: &str) -> Result<()> {
    match user.role {
        Role::Admin | Role::Staff => Ok(()),
        Role::CrecheManager => Err(Error::InsufficientPermissions {
            action,
            resource: resource.to_string(),
        }),
    }
}

/// Resolve the creche filter a list request may use.
///
/// Platform staff get whatever they asked for (possibly no filter). A creche manager always gets
/// their own creche; asking for another one is forbidden.
pub fn scoped_creche_filter(user: &CurrentUser, requested: Option<CrecheId>) -> Result<Option<CrecheId>> {
    match user.role {
        Role::Admin | Role::Staff => Ok(requested),
        Role::CrecheManager => {
            let own = user.creche_id.ok_or_else(|| Error::InsufficientPermissions {
                action: "read",
                resource: "creche data (no creche assigned)".to_string(),
            })?;
            match requested {
                Some(other) if other != own => Err(Error::InsufficientPermissions {
                    action: "read",
                    resource: format!("creche {other}"),
                }),
                _ => Ok(Some(own)),
            }
        }
    }
}

/// Check a single creche-owned row (or a write targeting a creche) is visible to the user.
pub fn ensure_creche_access(user: &CurrentUser, creche_id: CrecheId, action: &'static str) -> Result<()> {
    match user.role {
        Role::Admin | Role::Staff => Ok(()),
        Role::CrecheManager if user.creche_id == Some(creche_id) => Ok(()),
        Role::CrecheManager => Err(Error::InsufficientPermissions {
            action,
            resource: format!("creche {creche_id}"),
        }),
    }
}
