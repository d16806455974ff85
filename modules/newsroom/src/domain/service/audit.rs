use super::{internal, Service};
use crate::contract::{AuditEntry, AuditFilter, NewsroomError, Page, PageRequest, Principal};
use crate::domain::permissions::{require, CrudAction, Resource};

impl Service {
    /// Audit trail, newest first; admins only
    pub async fn list_audit_logs(
        &self,
        principal: &Principal,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, NewsroomError> {
        require(principal, Resource::AuditLog, CrudAction::Read)?;
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(NewsroomError::invalid_field("from", "must not be after `to`"));
            }
        }
        self.repos.audit.list(filter, page).await.map_err(internal)
    }
}
