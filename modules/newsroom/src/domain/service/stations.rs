//! Radio station accounts

use super::{dedup_ids, internal, Service};
use crate::contract::{
    NewStation, NewsroomError, Page, PageRequest, Principal, StaffRole, Station, StationFilter,
    StationPatch, User,
};
use crate::domain::permissions::{require, CrudAction, Resource};
use crate::domain::validation::{normalize_email, required_text};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

/// Trim, drop blanks and collapse case-insensitive duplicates
fn clean_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Service {
    pub(crate) async fn load_station(&self, id: Uuid) -> Result<Station, NewsroomError> {
        self.repos
            .stations
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("station", id))
    }

    fn can_see_station(principal: &Principal, station_id: Uuid) -> bool {
        principal.at_least(StaffRole::SubEditor) || principal.station_id == Some(station_id)
    }

    async fn ensure_station_name_free(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), NewsroomError> {
        let existing = self
            .repos
            .stations
            .find_by_name(name)
            .await
            .map_err(internal)?;
        match existing {
            Some(other) if Some(other.id) != exclude => Err(NewsroomError::conflict(format!(
                "a station named {} already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    async fn ensure_categories_exist(&self, ids: &[Uuid]) -> Result<(), NewsroomError> {
        for id in ids {
            if self
                .repos
                .categories
                .find_by_id(*id)
                .await
                .map_err(internal)?
                .is_none()
            {
                return Err(NewsroomError::invalid_field(
                    "blocked_category_ids",
                    format!("category {} does not exist", id),
                ));
            }
        }
        Ok(())
    }

    pub async fn create_station(
        &self,
        principal: &Principal,
        new: NewStation,
    ) -> Result<Station, NewsroomError> {
        require(principal, Resource::Station, CrudAction::Create)?;
        let name = required_text("name", &new.name)?;
        self.ensure_station_name_free(&name, None).await?;

        let blocked = dedup_ids(&new.blocked_category_ids);
        self.ensure_categories_exist(&blocked).await?;

        let now = Utc::now();
        let station = Station {
            id: Uuid::new_v4(),
            name,
            description: clean_optional(new.description),
            province: new.province,
            contact_email: clean_optional(new.contact_email)
                .map(|e| normalize_email(&e))
                .transpose()?,
            contact_number: clean_optional(new.contact_number),
            website: clean_optional(new.website),
            is_active: true,
            has_content_access: new.has_content_access,
            allowed_languages: clean_names(new.allowed_languages),
            allowed_religions: clean_names(new.allowed_religions),
            blocked_category_ids: blocked,
            created_at: now,
            updated_at: now,
        };
        let created = self.repos.stations.insert(&station).await.map_err(internal)?;

        self.record_audit(
            Some(principal.user_id),
            "station.created",
            "station",
            Some(created.id.to_string()),
            json!({ "name": created.name, "province": created.province.as_str() }),
        )
        .await;
        tracing::info!(station_id = %created.id, "station created");
        Ok(created)
    }

    pub async fn get_station(&self, principal: &Principal, id: Uuid) -> Result<Station, NewsroomError> {
        if !Self::can_see_station(principal, id) {
            return Err(NewsroomError::forbidden("you may not view this station"));
        }
        self.load_station(id).await
    }

    pub async fn list_stations(
        &self,
        principal: &Principal,
        filter: &StationFilter,
        page: PageRequest,
    ) -> Result<Page<Station>, NewsroomError> {
        require(principal, Resource::Station, CrudAction::Read)?;
        self.repos.stations.list(filter, page).await.map_err(internal)
    }

    pub async fn list_station_users(
        &self,
        principal: &Principal,
        id: Uuid,
    ) -> Result<Vec<User>, NewsroomError> {
        if !Self::can_see_station(principal, id) {
            return Err(NewsroomError::forbidden("you may not view this station"));
        }
        let station = self.load_station(id).await?;
        self.repos
            .users
            .station_users(station.id)
            .await
            .map_err(internal)
    }

    pub async fn update_station(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: StationPatch,
    ) -> Result<Station, NewsroomError> {
        require(principal, Resource::Station, CrudAction::Update)?;
        let mut station = self.load_station(id).await?;
        let was_active = station.is_active;

        if let Some(name) = patch.name {
            let name = required_text("name", &name)?;
            if !name.eq_ignore_ascii_case(&station.name) {
                self.ensure_station_name_free(&name, Some(id)).await?;
            }
            station.name = name;
        }
        if let Some(description) = patch.description {
            station.description = clean_optional(description);
        }
        if let Some(province) = patch.province {
            station.province = province;
        }
        if let Some(email) = patch.contact_email {
            station.contact_email = clean_optional(email)
                .map(|e| normalize_email(&e))
                .transpose()?;
        }
        if let Some(number) = patch.contact_number {
            station.contact_number = clean_optional(number);
        }
        if let Some(website) = patch.website {
            station.website = clean_optional(website);
        }
        if let Some(active) = patch.is_active {
            station.is_active = active;
        }
        if let Some(access) = patch.has_content_access {
            station.has_content_access = access;
        }
        if let Some(languages) = patch.allowed_languages {
            station.allowed_languages = clean_names(languages);
        }
        if let Some(religions) = patch.allowed_religions {
            station.allowed_religions = clean_names(religions);
        }
        if let Some(blocked) = patch.blocked_category_ids {
            let blocked = dedup_ids(&blocked);
            self.ensure_categories_exist(&blocked).await?;
            station.blocked_category_ids = blocked;
        }
        station.updated_at = Utc::now();

        let updated = self.repos.stations.update(&station).await.map_err(internal)?;
        if was_active && !updated.is_active {
            self.cascade_station_deactivation(updated.id).await?;
        }

        self.record_audit(
            Some(principal.user_id),
            "station.updated",
            "station",
            Some(updated.id.to_string()),
            json!({
                "is_active": updated.is_active,
                "has_content_access": updated.has_content_access,
            }),
        )
        .await;
        Ok(updated)
    }

    /// Deactivate a station together with its radio users
    pub async fn deactivate_station(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Station, CrudAction::Delete)?;
        let mut station = self.load_station(id).await?;
        station.is_active = false;
        station.updated_at = Utc::now();
        self.repos.stations.update(&station).await.map_err(internal)?;
        let users = self.cascade_station_deactivation(id).await?;

        self.record_audit(
            Some(principal.user_id),
            "station.deactivated",
            "station",
            Some(id.to_string()),
            json!({ "name": station.name, "deactivated_users": users }),
        )
        .await;
        tracing::info!(station_id = %id, deactivated_users = users, "station deactivated");
        Ok(())
    }

    async fn cascade_station_deactivation(&self, station_id: Uuid) -> Result<usize, NewsroomError> {
        let ids = self
            .repos
            .users
            .deactivate_station_users(station_id)
            .await
            .map_err(internal)?;
        for user_id in &ids {
            self.repos
                .auth
                .delete_user_sessions(*user_id, None)
                .await
                .map_err(internal)?;
        }
        Ok(ids.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_deduplicated() {
        let cleaned = clean_names(vec![
            " English ".to_string(),
            "english".to_string(),
            "".to_string(),
            "isiZulu".to_string(),
        ]);
        assert_eq!(cleaned, vec!["English".to_string(), "isiZulu".to_string()]);
    }
}
