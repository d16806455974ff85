//! Station content filtering
//!
//! A station sees a published story only when the story speaks one of the
//! station's languages, carries no religion the station excluded, stays out
//! of blocked categories and, if it is tagged with localities at all, is
//! tagged with the station's province.

use crate::contract::{Classification, ClassificationType, Station, Story, StoryStatus};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub station_id: Uuid,
    pub allowed_language_ids: HashSet<Uuid>,
    pub forbidden_religion_ids: HashSet<Uuid>,
    /// Every LOCALITY classification
    pub locality_ids: HashSet<Uuid>,
    /// LOCALITY classifications matching the station province
    pub matching_locality_ids: HashSet<Uuid>,
    pub blocked_category_ids: HashSet<Uuid>,
}

fn name_in(name: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(name.trim()))
}

impl FeedFilter {
    /// Build the filter for `station`, `None` when it may not receive content
    pub fn for_station(station: &Station, classifications: &[Classification]) -> Option<Self> {
        if !station.is_active || !station.has_content_access {
            return None;
        }

        let mut filter = FeedFilter {
            station_id: station.id,
            blocked_category_ids: station.blocked_category_ids.iter().copied().collect(),
            ..Default::default()
        };
        let province = station.province.label();

        for c in classifications {
            match c.kind {
                ClassificationType::Language => {
                    if name_in(&c.name, &station.allowed_languages) {
                        filter.allowed_language_ids.insert(c.id);
                    }
                }
                ClassificationType::Religion => {
                    if !name_in(&c.name, &station.allowed_religions) {
                        filter.forbidden_religion_ids.insert(c.id);
                    }
                }
                ClassificationType::Locality => {
                    filter.locality_ids.insert(c.id);
                    if c.name.trim().eq_ignore_ascii_case(province) {
                        filter.matching_locality_ids.insert(c.id);
                    }
                }
            }
        }

        Some(filter)
    }

    /// Localities that exclude a story unless it also has a matching one
    pub fn other_locality_ids(&self) -> Vec<Uuid> {
        self.locality_ids
            .difference(&self.matching_locality_ids)
            .copied()
            .collect()
    }

    pub fn admits_language(&self, language_id: Uuid) -> bool {
        self.allowed_language_ids.contains(&language_id)
    }

    pub fn admits(&self, story: &Story) -> bool {
        if story.status != StoryStatus::Published || story.deleted_at.is_some() {
            return false;
        }
        if story
            .category_id
            .is_some_and(|id| self.blocked_category_ids.contains(&id))
        {
            return false;
        }

        let ids = &story.classification_ids;
        if !ids.iter().any(|id| self.allowed_language_ids.contains(id)) {
            return false;
        }
        if ids.iter().any(|id| self.forbidden_religion_ids.contains(id)) {
            return false;
        }

        let has_locality = ids.iter().any(|id| self.locality_ids.contains(id));
        !has_locality || ids.iter().any(|id| self.matching_locality_ids.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Province;
    use chrono::Utc;

    fn classification(name: &str, kind: ClassificationType) -> Classification {
        Classification {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            kind,
            description: None,
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn station() -> Station {
        Station {
            id: Uuid::new_v4(),
            name: "Radio Khwezi".to_string(),
            description: None,
            province: Province::KwazuluNatal,
            contact_email: None,
            contact_number: None,
            website: None,
            is_active: true,
            has_content_access: true,
            allowed_languages: vec!["english".to_string()],
            allowed_religions: vec!["Christian".to_string()],
            blocked_category_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn published(classification_ids: Vec<Uuid>) -> Story {
        Story {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            slug: "t".to_string(),
            content: String::new(),
            summary: None,
            status: StoryStatus::Published,
            author_id: Uuid::new_v4(),
            reviewer_id: None,
            approver_id: None,
            publisher_id: None,
            category_id: None,
            original_story_id: None,
            classification_ids,
            tag_ids: vec![],
            published_at: Some(Utc::now()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    struct Fixture {
        english: Classification,
        afrikaans: Classification,
        christian: Classification,
        muslim: Classification,
        kzn: Classification,
        gauteng: Classification,
        all: Vec<Classification>,
    }

    fn fixture() -> Fixture {
        let english = classification("English", ClassificationType::Language);
        let afrikaans = classification("Afrikaans", ClassificationType::Language);
        let christian = classification("Christian", ClassificationType::Religion);
        let muslim = classification("Muslim", ClassificationType::Religion);
        let kzn = classification("KwaZulu-Natal", ClassificationType::Locality);
        let gauteng = classification("Gauteng", ClassificationType::Locality);
        let all = vec![
            english.clone(),
            afrikaans.clone(),
            christian.clone(),
            muslim.clone(),
            kzn.clone(),
            gauteng.clone(),
        ];
        Fixture {
            english,
            afrikaans,
            christian,
            muslim,
            kzn,
            gauteng,
            all,
        }
    }

    #[test]
    fn inactive_or_unlicensed_stations_get_nothing() {
        let f = fixture();
        let mut s = station();
        s.has_content_access = false;
        assert!(FeedFilter::for_station(&s, &f.all).is_none());
        s.has_content_access = true;
        s.is_active = false;
        assert!(FeedFilter::for_station(&s, &f.all).is_none());
    }

    #[test]
    fn language_must_match() {
        let f = fixture();
        let filter = FeedFilter::for_station(&station(), &f.all).unwrap();
        assert!(filter.admits(&published(vec![f.english.id])));
        assert!(!filter.admits(&published(vec![f.afrikaans.id])));
        assert!(!filter.admits(&published(vec![])));
    }

    #[test]
    fn excluded_religion_blocks_story() {
        let f = fixture();
        let filter = FeedFilter::for_station(&station(), &f.all).unwrap();
        assert!(filter.admits(&published(vec![f.english.id, f.christian.id])));
        assert!(!filter.admits(&published(vec![f.english.id, f.muslim.id])));
    }

    #[test]
    fn locality_tagged_stories_need_the_station_province() {
        let f = fixture();
        let filter = FeedFilter::for_station(&station(), &f.all).unwrap();
        assert!(filter.admits(&published(vec![f.english.id, f.kzn.id])));
        assert!(!filter.admits(&published(vec![f.english.id, f.gauteng.id])));
        assert!(filter.admits(&published(vec![f.english.id, f.gauteng.id, f.kzn.id])));
        assert_eq!(filter.other_locality_ids(), vec![f.gauteng.id]);
    }

    #[test]
    fn blocked_category_and_unpublished_are_hidden() {
        let f = fixture();
        let blocked = Uuid::new_v4();
        let mut s = station();
        s.blocked_category_ids = vec![blocked];
        let filter = FeedFilter::for_station(&s, &f.all).unwrap();

        let mut story = published(vec![f.english.id]);
        story.category_id = Some(blocked);
        assert!(!filter.admits(&story));

        let mut draft = published(vec![f.english.id]);
        draft.status = StoryStatus::Approved;
        assert!(!filter.admits(&draft));
    }
}
