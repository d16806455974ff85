//! Contract models for the newsroom module
//!
//! These models are transport-agnostic. NO serde derives - the REST layer
//! owns its DTOs and the storage layer owns its entities.

mod content;
mod people;
mod work;

pub use content::*;
pub use people::*;
pub use work::*;

use uuid::Uuid;

/// Declares a fieldless enum persisted and transported as a SCREAMING_SNAKE string.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::contract::error::NewsroomError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::contract::error::NewsroomError::validation(format!(
                    "unknown {} '{}'",
                    stringify!($name),
                    s
                )))
            }
        }
    };
}

pub(crate) use string_enum;

string_enum! {
    /// Editorial workflow status of a story
    StoryStatus {
        Draft => "DRAFT",
        InReview => "IN_REVIEW",
        NeedsRevision => "NEEDS_REVISION",
        PendingApproval => "PENDING_APPROVAL",
        Approved => "APPROVED",
        Published => "PUBLISHED",
        Archived => "ARCHIVED",
    }
}

string_enum! {
    /// Workflow status of a news bulletin
    BulletinStatus {
        Draft => "DRAFT",
        InReview => "IN_REVIEW",
        Approved => "APPROVED",
        Published => "PUBLISHED",
        Archived => "ARCHIVED",
    }
}

string_enum! {
    ClassificationType {
        Language => "LANGUAGE",
        Religion => "RELIGION",
        Locality => "LOCALITY",
    }
}

string_enum! {
    CommentType {
        General => "GENERAL",
        RevisionRequest => "REVISION_REQUEST",
        Approval => "APPROVAL",
    }
}

string_enum! {
    TaskType {
        StoryCreate => "STORY_CREATE",
        StoryReview => "STORY_REVIEW",
        StoryApproval => "STORY_APPROVAL",
        StoryTranslate => "STORY_TRANSLATE",
        StoryPublish => "STORY_PUBLISH",
        BulletinCreate => "BULLETIN_CREATE",
        ShowPrep => "SHOW_PREP",
        General => "GENERAL",
    }
}

string_enum! {
    TaskStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Blocked => "BLOCKED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

string_enum! {
    /// Task urgency, ordered from least to most urgent
    #[derive(PartialOrd, Ord)]
    TaskPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

string_enum! {
    EpisodeStatus {
        Draft => "DRAFT",
        Published => "PUBLISHED",
        Archived => "ARCHIVED",
    }
}

string_enum! {
    #[derive(PartialOrd, Ord)]
    AnnouncementPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

string_enum! {
    /// Audience of an announcement
    AnnouncementTarget {
        All => "ALL",
        Staff => "STAFF",
        Radio => "RADIO",
    }
}

impl AnnouncementTarget {
    pub fn includes(self, user_type: UserType) -> bool {
        match self {
            AnnouncementTarget::All => true,
            AnnouncementTarget::Staff => user_type == UserType::Staff,
            AnnouncementTarget::Radio => user_type == UserType::Radio,
        }
    }
}

string_enum! {
    /// Staff role, ordered from least to most privileged
    #[derive(PartialOrd, Ord)]
    StaffRole {
        Intern => "INTERN",
        Journalist => "JOURNALIST",
        SubEditor => "SUB_EDITOR",
        Editor => "EDITOR",
        Admin => "ADMIN",
        SuperAdmin => "SUPERADMIN",
    }
}

string_enum! {
    /// Newsroom staff or radio station client
    UserType {
        Staff => "STAFF",
        Radio => "RADIO",
    }
}

string_enum! {
    /// South African province a station broadcasts in
    Province {
        EasternCape => "EASTERN_CAPE",
        FreeState => "FREE_STATE",
        Gauteng => "GAUTENG",
        KwazuluNatal => "KWAZULU_NATAL",
        Limpopo => "LIMPOPO",
        Mpumalanga => "MPUMALANGA",
        NorthernCape => "NORTHERN_CAPE",
        NorthWest => "NORTH_WEST",
        WesternCape => "WESTERN_CAPE",
    }
}

impl Province {
    /// Human-readable name, also used to match LOCALITY classifications
    pub fn label(self) -> &'static str {
        match self {
            Province::EasternCape => "Eastern Cape",
            Province::FreeState => "Free State",
            Province::Gauteng => "Gauteng",
            Province::KwazuluNatal => "KwaZulu-Natal",
            Province::Limpopo => "Limpopo",
            Province::Mpumalanga => "Mpumalanga",
            Province::NorthernCape => "Northern Cape",
            Province::NorthWest => "North West",
            Province::WesternCape => "Western Cape",
        }
    }
}

/// The authenticated caller of a service operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub user_type: UserType,
    pub staff_role: Option<StaffRole>,
    pub station_id: Option<Uuid>,
}

impl Principal {
    pub fn staff(user_id: Uuid, role: StaffRole) -> Self {
        Self {
            user_id,
            user_type: UserType::Staff,
            staff_role: Some(role),
            station_id: None,
        }
    }

    pub fn radio(user_id: Uuid, station_id: Uuid) -> Self {
        Self {
            user_id,
            user_type: UserType::Radio,
            staff_role: None,
            station_id: Some(station_id),
        }
    }

    /// Staff role, `None` for radio users
    pub fn role(&self) -> Option<StaffRole> {
        match self.user_type {
            UserType::Staff => self.staff_role,
            UserType::Radio => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role().is_some()
    }

    /// Whether the caller is staff with at least `role`
    pub fn at_least(&self, role: StaffRole) -> bool {
        self.role().is_some_and(|own| own >= role)
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Highest page number a list endpoint accepts
    pub const MAX_PAGE: u64 = 1_000_000;

    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Apply defaults and clamp `per_page` to `max`
    pub fn clamped(page: Option<u64>, per_page: Option<u64>, default: u64, max: u64) -> Self {
        Self::new(
            page.unwrap_or(1),
            per_page.unwrap_or(default).min(max.max(1)),
        )
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page.max(1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles_are_ordered_by_privilege() {
        assert!(StaffRole::Intern < StaffRole::Journalist);
        assert!(StaffRole::SubEditor < StaffRole::Editor);
        assert!(StaffRole::Admin < StaffRole::SuperAdmin);
    }

    #[test]
    fn string_enums_parse_case_insensitively() {
        assert_eq!("sub_editor".parse::<StaffRole>().unwrap(), StaffRole::SubEditor);
        assert_eq!("SUPERADMIN".parse::<StaffRole>().unwrap(), StaffRole::SuperAdmin);
        assert!("chief".parse::<StaffRole>().is_err());
        assert_eq!(StoryStatus::PendingApproval.as_str(), "PENDING_APPROVAL");
    }

    #[test]
    fn radio_principal_has_no_staff_role() {
        let principal = Principal::radio(Uuid::new_v4(), Uuid::new_v4());
        assert!(!principal.is_staff());
        assert!(!principal.at_least(StaffRole::Intern));
    }

    #[test]
    fn page_request_is_clamped() {
        let request = PageRequest::clamped(Some(0), Some(1000), 20, 100);
        assert_eq!(request.page, 1);
        assert_eq!(request.per_page, 100);
        assert_eq!(PageRequest::clamped(Some(3), None, 20, 100).offset(), 40);
    }

    #[test]
    fn huge_page_offsets_saturate() {
        let request = PageRequest::clamped(Some(u64::MAX), Some(100), 20, 100);
        assert_eq!(request.offset(), u64::MAX);
        let request = PageRequest { page: 0, per_page: 10 };
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_counts_total_pages() {
        let page: Page<u8> = Page::new(vec![], 41, PageRequest::new(1, 20));
        assert_eq!(page.total_pages(), 3);
    }
}
