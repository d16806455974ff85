//! Announcements shown on staff and station dashboards

use super::{internal, Service};
use crate::contract::{
    Announcement, AnnouncementPatch, AnnouncementView, NewAnnouncement, NewsroomError, Principal,
    UserType,
};
use crate::domain::events::{Channel, EventKind};
use crate::domain::permissions::{require, CrudAction, Resource};
use crate::domain::validation::required_text;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::cmp::Reverse;
use uuid::Uuid;

fn check_expiry(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), NewsroomError> {
    if expires_at.is_some_and(|at| at <= now) {
        return Err(NewsroomError::invalid_field(
            "expires_at",
            "must be in the future",
        ));
    }
    Ok(())
}

/// Highest priority first, then newest
fn sort_for_display(views: &mut [AnnouncementView]) {
    views.sort_by_key(|v| {
        (
            Reverse(v.announcement.priority),
            Reverse(v.announcement.created_at),
        )
    });
}

impl Service {
    async fn load_announcement(&self, id: Uuid) -> Result<Announcement, NewsroomError> {
        self.repos
            .announcements
            .find_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| NewsroomError::not_found("announcement", id))
    }

    pub async fn create_announcement(
        &self,
        principal: &Principal,
        new: NewAnnouncement,
    ) -> Result<Announcement, NewsroomError> {
        require(principal, Resource::Announcement, CrudAction::Create)?;
        let now = Utc::now();
        check_expiry(new.expires_at, now)?;

        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: required_text("title", &new.title)?,
            message: required_text("message", &new.message)?,
            priority: new.priority,
            target: new.target,
            is_active: true,
            expires_at: new.expires_at,
            author_id: principal.user_id,
            created_at: now,
            updated_at: now,
        };
        let created = self
            .repos
            .announcements
            .insert(&announcement)
            .await
            .map_err(internal)?;

        let payload = json!({
            "title": created.title,
            "priority": created.priority.as_str(),
            "target": created.target.as_str(),
        });
        if created.target.includes(UserType::Staff) {
            self.publish(
                Channel::Newsroom,
                EventKind::AnnouncementCreated,
                created.id,
                payload.clone(),
            )
            .await;
        }
        if created.target.includes(UserType::Radio) {
            self.publish(Channel::Radio, EventKind::AnnouncementCreated, created.id, payload)
                .await;
        }
        Ok(created)
    }

    /// What the caller should see, with their dismissal state
    pub async fn list_announcements_for(
        &self,
        principal: &Principal,
    ) -> Result<Vec<AnnouncementView>, NewsroomError> {
        let mut views = self
            .repos
            .announcements
            .visible_to(principal.user_type, principal.user_id, Utc::now())
            .await
            .map_err(internal)?;
        sort_for_display(&mut views);
        Ok(views)
    }

    pub async fn update_announcement(
        &self,
        principal: &Principal,
        id: Uuid,
        patch: AnnouncementPatch,
    ) -> Result<Announcement, NewsroomError> {
        require(principal, Resource::Announcement, CrudAction::Update)?;
        let mut announcement = self.load_announcement(id).await?;
        let now = Utc::now();

        if let Some(title) = patch.title {
            announcement.title = required_text("title", &title)?;
        }
        if let Some(message) = patch.message {
            announcement.message = required_text("message", &message)?;
        }
        if let Some(priority) = patch.priority {
            announcement.priority = priority;
        }
        if let Some(target) = patch.target {
            announcement.target = target;
        }
        if let Some(active) = patch.is_active {
            announcement.is_active = active;
        }
        if let Some(expires_at) = patch.expires_at {
            check_expiry(expires_at, now)?;
            announcement.expires_at = expires_at;
        }
        announcement.updated_at = now;
        self.repos
            .announcements
            .update(&announcement)
            .await
            .map_err(internal)
    }

    pub async fn delete_announcement(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        require(principal, Resource::Announcement, CrudAction::Delete)?;
        self.load_announcement(id).await?;
        self.repos.announcements.delete(id).await.map_err(internal)
    }

    /// Hide an announcement for the caller; repeat calls are no-ops
    pub async fn dismiss_announcement(&self, principal: &Principal, id: Uuid) -> Result<(), NewsroomError> {
        let announcement = self.load_announcement(id).await?;
        let now = Utc::now();
        if !announcement.target.includes(principal.user_type) || !announcement.is_live(now) {
            return Err(NewsroomError::not_found("announcement", id));
        }
        self.repos
            .announcements
            .dismiss(id, principal.user_id, now)
            .await
            .map_err(internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{AnnouncementPriority, AnnouncementTarget};
    use chrono::Duration;

    fn view(priority: AnnouncementPriority, age_minutes: i64) -> AnnouncementView {
        let at = Utc::now() - Duration::minutes(age_minutes);
        AnnouncementView {
            announcement: Announcement {
                id: Uuid::new_v4(),
                title: format!("{priority} {age_minutes}"),
                message: "m".to_string(),
                priority,
                target: AnnouncementTarget::All,
                is_active: true,
                expires_at: None,
                author_id: Uuid::new_v4(),
                created_at: at,
                updated_at: at,
            },
            dismissed: false,
        }
    }

    #[test]
    fn live_means_active_and_unexpired() {
        let now = Utc::now();
        let mut announcement = view(AnnouncementPriority::Low, 0).announcement;
        assert!(announcement.is_live(now));
        announcement.expires_at = Some(now);
        assert!(!announcement.is_live(now));
        announcement.expires_at = Some(now + Duration::minutes(1));
        announcement.is_active = false;
        assert!(!announcement.is_live(now));
    }

    #[test]
    fn high_priority_first_then_newest() {
        let mut views = vec![
            view(AnnouncementPriority::Low, 1),
            view(AnnouncementPriority::High, 30),
            view(AnnouncementPriority::High, 5),
            view(AnnouncementPriority::Medium, 2),
        ];
        sort_for_display(&mut views);
        let titles: Vec<_> = views.iter().map(|v| v.announcement.title.as_str()).collect();
        assert_eq!(titles, vec!["HIGH 5", "HIGH 30", "MEDIUM 2", "LOW 1"]);
    }

    #[test]
    fn past_expiry_is_rejected() {
        let now = Utc::now();
        assert!(check_expiry(Some(now - Duration::hours(1)), now).is_err());
        assert!(check_expiry(Some(now + Duration::hours(1)), now).is_ok());
        assert!(check_expiry(None, now).is_ok());
    }
}
