//! Content feed for radio station accounts

use super::{internal, Service};
use crate::contract::{
    Bulletin, BulletinStatus, Episode, EpisodeStatus, FeedQuery, NewsroomError, Page, PageRequest,
    Principal, Show, Story, StoryDetails, UserType,
};
use crate::domain::feed::FeedFilter;

impl Service {
    /// Feed filter of the calling station
    ///
    /// Staff, inactive stations and stations without content access are
    /// rejected with `Forbidden`.
    pub async fn station_feed_filter(&self, principal: &Principal) -> Result<FeedFilter, NewsroomError> {
        let station_id = match (principal.user_type, principal.station_id) {
            (UserType::Radio, Some(id)) => id,
            _ => return Err(NewsroomError::forbidden("radio station account required")),
        };
        let station = self.load_station(station_id).await?;
        let classifications = self
            .repos
            .classifications
            .list(None)
            .await
            .map_err(internal)?;
        FeedFilter::for_station(&station, &classifications).ok_or_else(|| {
            NewsroomError::forbidden(format!("station {} has no content access", station.name))
        })
    }

    pub async fn radio_stories(
        &self,
        principal: &Principal,
        query: &FeedQuery,
        page: PageRequest,
    ) -> Result<Page<Story>, NewsroomError> {
        let filter = self.station_feed_filter(principal).await?;
        if query
            .category_id
            .is_some_and(|id| filter.blocked_category_ids.contains(&id))
        {
            return Ok(Page::new(Vec::new(), 0, page));
        }
        self.repos
            .stories
            .feed(&filter, query, page)
            .await
            .map_err(internal)
    }

    /// A story visible to the station; hidden stories read as missing
    pub async fn radio_story(&self, principal: &Principal, slug: &str) -> Result<StoryDetails, NewsroomError> {
        let filter = self.station_feed_filter(principal).await?;
        let story = self
            .repos
            .stories
            .find_by_slug(slug)
            .await
            .map_err(internal)?
            .filter(|s| filter.admits(s))
            .ok_or_else(|| NewsroomError::not_found("story", slug))?;

        let mut details = self.story_details(story).await?;
        details.translations.retain(|t| filter.admits(t));
        Ok(details)
    }

    pub async fn radio_shows(&self, principal: &Principal) -> Result<Vec<Show>, NewsroomError> {
        self.station_feed_filter(principal).await?;
        self.repos
            .shows
            .shows_with_published_episodes()
            .await
            .map_err(internal)
    }

    pub async fn radio_episodes(
        &self,
        principal: &Principal,
        show_slug: &str,
    ) -> Result<Vec<Episode>, NewsroomError> {
        self.station_feed_filter(principal).await?;
        let show = self
            .repos
            .shows
            .find_show_by_slug(show_slug)
            .await
            .map_err(internal)?
            .filter(|s| s.is_active)
            .ok_or_else(|| NewsroomError::not_found("show", show_slug))?;
        self.repos
            .shows
            .list_episodes(show.id, Some(EpisodeStatus::Published))
            .await
            .map_err(internal)
    }

    /// Published bulletins in the station's languages
    pub async fn radio_bulletins(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<Bulletin>, NewsroomError> {
        let filter = self.station_feed_filter(principal).await?;
        let languages: Vec<_> = filter.allowed_language_ids.iter().copied().collect();
        self.repos
            .bulletins
            .list(Some(BulletinStatus::Published), Some(&languages), page)
            .await
            .map_err(internal)
    }
}
