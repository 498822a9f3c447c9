//! List service - owner lists and share links

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::auth::{Action, Principal, ShareRole, ShareToken};
use crate::db::lists::{self, DEFAULT_LIST_COLOR};
use crate::db::{ListRow, ListSummary, TaskDb};
use crate::lifecycle::normalize_title;
use crate::types::BoggaError;

/// Body of a list creation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// A share token resolved to its list, once, at the boundary
#[derive(Debug, Clone)]
pub struct ResolvedShare {
    pub list: ListRow,
    pub principal: Principal,
}

/// Owner list management
pub struct ListService {
    db: Arc<TaskDb>,
}

impl ListService {
    pub fn new(db: Arc<TaskDb>) -> Self {
        Self { db }
    }

    /// Lists of an owner with open/total counts
    pub fn list(&self, principal: &Principal) -> Result<Vec<ListSummary>, BoggaError> {
        let owner_id = principal.require_owner(Action::BrowseLists)?;
        self.db
            .with_conn(|conn| lists::list_lists_for_owner(conn, owner_id))
    }

    pub fn create(
        &self,
        principal: &Principal,
        request: CreateListRequest,
    ) -> Result<ListSummary, BoggaError> {
        let owner_id = principal.require_owner(Action::CreateList)?;
        let title = normalize_title(request.title.as_deref())?;
        let color = request
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_LIST_COLOR);

        let list = self
            .db
            .with_conn(|conn| lists::create_list(conn, owner_id, &title, color))?;
        info!(list_id = %list.id, "List created");

        Ok(ListSummary {
            list,
            open_count: 0,
            total_count: 0,
        })
    }

    /// Delete an owned list and, by cascade, its tasks
    pub fn delete(&self, principal: &Principal, list_id: &str) -> Result<(), BoggaError> {
        let owner_id = principal.require_owner(Action::DeleteList)?;
        let deleted = self
            .db
            .with_conn(|conn| lists::delete_list(conn, list_id, owner_id))?;
        if !deleted {
            return Err(BoggaError::not_found());
        }
        info!(list_id, "List deleted");
        Ok(())
    }

    /// Mint a share link, replacing any previous one
    pub fn share(
        &self,
        principal: &Principal,
        list_id: &str,
        role: ShareRole,
    ) -> Result<ShareToken, BoggaError> {
        let owner_id = principal.require_owner(Action::ManageShare)?;
        let token = ShareToken::generate(role);
        let updated = self.db.with_conn(|conn| {
            lists::set_share_token(conn, list_id, owner_id, Some(token.value()))
        })?;
        if !updated {
            return Err(BoggaError::not_found());
        }
        info!(list_id, role = %role, "Share link created");
        Ok(token)
    }

    /// Revoke the share link of an owned list
    pub fn revoke(&self, principal: &Principal, list_id: &str) -> Result<(), BoggaError> {
        let owner_id = principal.require_owner(Action::ManageShare)?;
        let updated = self
            .db
            .with_conn(|conn| lists::set_share_token(conn, list_id, owner_id, None))?;
        if !updated {
            return Err(BoggaError::not_found());
        }
        info!(list_id, "Share link revoked");
        Ok(())
    }

    /// Resolve a share token from a request path
    pub fn resolve_share(&self, raw_token: &str) -> Result<ResolvedShare, BoggaError> {
        let token = ShareToken::parse(raw_token);
        let list = self
            .db
            .with_conn(|conn| lists::find_list_by_share_token(conn, token.value()))?
            .ok_or_else(BoggaError::not_found)?;

        Ok(ResolvedShare {
            principal: Principal::Share {
                list_id: list.id.clone(),
                role: token.role(),
            },
            list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users;

    fn service() -> (ListService, Principal) {
        let db = Arc::new(TaskDb::open_in_memory().unwrap());
        let user_id = db
            .with_conn(|conn| users::create_user(conn, "digest", "Bogga"))
            .unwrap()
            .id;
        (ListService::new(db), Principal::Owner { user_id })
    }

    fn intruder() -> Principal {
        Principal::Owner {
            user_id: "intruder".into(),
        }
    }

    fn request(title: &str, color: Option<&str>) -> CreateListRequest {
        CreateListRequest {
            title: Some(title.into()),
            color: color.map(String::from),
        }
    }

    #[test]
    fn test_create_defaults() {
        let (svc, owner) = service();
        let created = svc.create(&owner, request("  Groceries ", None)).unwrap();
        assert_eq!(created.list.title, "Groceries");
        assert_eq!(created.list.color, DEFAULT_LIST_COLOR);
        assert_eq!(created.open_count, 0);

        let err = svc.create(&owner, request("   ", None)).unwrap_err();
        assert_eq!(err.public_message(), "Missing title");
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let (svc, owner) = service();
        let err = svc.delete(&owner, "missing").unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_share_roles_resolve() {
        let (svc, owner) = service();
        let list = svc.create(&owner, request("Shared", None)).unwrap().list;

        let viewer = svc.share(&owner, &list.id, ShareRole::Viewer).unwrap();
        assert!(viewer.value().starts_with("v_"));
        let resolved = svc.resolve_share(viewer.value()).unwrap();
        assert_eq!(resolved.list.id, list.id);
        assert_eq!(
            resolved.principal,
            Principal::Share {
                list_id: list.id.clone(),
                role: ShareRole::Viewer
            }
        );

        // A new token replaces the old one
        let editor = svc.share(&owner, &list.id, ShareRole::Editor).unwrap();
        assert!(svc.resolve_share(viewer.value()).is_err());
        assert_eq!(
            svc.resolve_share(editor.value()).unwrap().principal.access_level(),
            crate::auth::AccessLevel::Editor
        );

        svc.revoke(&owner, &list.id).unwrap();
        let err = svc.resolve_share(editor.value()).unwrap_err();
        assert_eq!(err.status_code(), hyper::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_share_foreign_list_is_not_found() {
        let (svc, owner) = service();
        let list = svc.create(&owner, request("Mine", None)).unwrap().list;
        assert!(svc.share(&intruder(), &list.id, ShareRole::Editor).is_err());
        assert!(svc.revoke(&intruder(), &list.id).is_err());
    }

    #[test]
    fn test_share_principal_cannot_manage_lists() {
        let (svc, owner) = service();
        let list = svc.create(&owner, request("Shared", None)).unwrap().list;
        let editor = Principal::Share {
            list_id: list.id.clone(),
            role: ShareRole::Editor,
        };

        for err in [
            svc.list(&editor).unwrap_err(),
            svc.create(&editor, request("Sneaky", None)).unwrap_err(),
            svc.delete(&editor, &list.id).unwrap_err(),
            svc.share(&editor, &list.id, ShareRole::Editor).unwrap_err(),
            svc.revoke(&editor, &list.id).unwrap_err(),
        ] {
            assert_eq!(err.status_code(), hyper::StatusCode::FORBIDDEN);
        }
        assert_eq!(svc.list(&owner).unwrap().len(), 1);
    }
}
