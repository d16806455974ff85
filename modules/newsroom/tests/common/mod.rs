//! Shared integration test fixture
//!
//! One in-memory SQLite database per test, migrated, with one staff user per
//! role, a radio station with its user and a small taxonomy.

#![allow(dead_code)]

use newsroom::config::Config;
use newsroom::contract::*;
use newsroom::domain::credentials::hash_password;
use newsroom::domain::repository::{AfterInsert, Repositories};
use newsroom::domain::{RecordingEventPublisher, Service};
use newsroom::infra::storage::sea_orm_repositories;
use newsroom::infra::{MemoryBlobStore, RecordingMailer};
use newsroom::NewsroomModule;
use chrono::Utc;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use uuid::Uuid;

pub const PASSWORD: &str = "Newsroom-Pass-2024";

pub struct Staff {
    pub intern: User,
    pub journalist: User,
    pub sub_editor: User,
    pub editor: User,
    pub admin: User,
    pub superadmin: User,
}

pub struct Taxonomy {
    pub english: Classification,
    pub afrikaans: Classification,
    pub isizulu: Classification,
    pub christian: Classification,
    pub muslim: Classification,
    pub western_cape: Classification,
    pub gauteng: Classification,
    pub news: Category,
    pub sport: Category,
}

pub struct TestEnv {
    pub db: Arc<DatabaseConnection>,
    pub repos: Repositories,
    pub config: Arc<Config>,
    pub service: Arc<Service>,
    pub events: Arc<RecordingEventPublisher>,
    pub mailer: Arc<RecordingMailer>,
    pub blobs: Arc<MemoryBlobStore>,
    pub staff: Staff,
    pub station: Station,
    pub radio_user: User,
    pub taxonomy: Taxonomy,
}

pub fn principal_of(user: &User) -> Principal {
    match user.user_type {
        UserType::Staff => Principal {
            user_id: user.id,
            user_type: UserType::Staff,
            staff_role: user.staff_role,
            station_id: None,
        },
        UserType::Radio => Principal {
            user_id: user.id,
            user_type: UserType::Radio,
            staff_role: None,
            station_id: user.radio_station_id,
        },
    }
}

/// Single pooled connection so every query sees the same in-memory database
pub async fn memory_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    NewsroomModule::migrate(&db).await.expect("migrations");
    Arc::new(db)
}

/// Insert a user with a known password, bypassing the welcome email
pub async fn seed_user(
    repos: &Repositories,
    email: &str,
    user_type: UserType,
    staff_role: Option<StaffRole>,
    station_id: Option<Uuid>,
) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: email.split('@').next().unwrap_or("user").to_string(),
        user_type,
        staff_role,
        translation_language: None,
        radio_station_id: station_id,
        is_primary_contact: station_id.is_some(),
        is_active: true,
        must_change_password: false,
        last_login_at: None,
        created_at: now,
        updated_at: now,
    };
    let hash = hash_password(PASSWORD).expect("hash password");
    let after: AfterInsert = Box::new(|_| Box::pin(async { Ok(()) }));
    repos
        .users
        .insert(&user, &hash, None, after)
        .await
        .expect("insert user")
}

async fn seed_staff(repos: &Repositories) -> Staff {
    let staff = |email: &'static str, role: StaffRole| {
        seed_user(repos, email, UserType::Staff, Some(role), None)
    };
    Staff {
        intern: staff("intern@newskoop.test", StaffRole::Intern).await,
        journalist: staff("journalist@newskoop.test", StaffRole::Journalist).await,
        sub_editor: staff("subeditor@newskoop.test", StaffRole::SubEditor).await,
        editor: staff("editor@newskoop.test", StaffRole::Editor).await,
        admin: staff("admin@newskoop.test", StaffRole::Admin).await,
        superadmin: staff("superadmin@newskoop.test", StaffRole::SuperAdmin).await,
    }
}

async fn classification(
    service: &Service,
    by: &Principal,
    name: &str,
    kind: ClassificationType,
) -> Classification {
    service
        .create_classification(
            by,
            NewClassification {
                name: name.to_string(),
                kind,
                description: None,
                sort_order: 0,
            },
        )
        .await
        .expect("create classification")
}

async fn category(service: &Service, by: &Principal, name: &str) -> Category {
    service
        .create_category(
            by,
            NewCategory {
                name: name.to_string(),
                description: None,
                parent_id: None,
            },
        )
        .await
        .expect("create category")
}

impl TestEnv {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = memory_db().await;
        let repos = sea_orm_repositories(db.clone());
        let config = Arc::new(config);
        let events = Arc::new(RecordingEventPublisher::new());
        let mailer = Arc::new(RecordingMailer::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = Arc::new(Service::new(
            repos.clone(),
            events.clone(),
            blobs.clone(),
            mailer.clone(),
            config.clone(),
        ));

        let staff = seed_staff(&repos).await;
        let root = principal_of(&staff.superadmin);

        let taxonomy = Taxonomy {
            english: classification(&service, &root, "English", ClassificationType::Language).await,
            afrikaans: classification(&service, &root, "Afrikaans", ClassificationType::Language)
                .await,
            isizulu: classification(&service, &root, "isiZulu", ClassificationType::Language).await,
            christian: classification(&service, &root, "Christian", ClassificationType::Religion)
                .await,
            muslim: classification(&service, &root, "Muslim", ClassificationType::Religion).await,
            western_cape: classification(
                &service,
                &root,
                "Western Cape",
                ClassificationType::Locality,
            )
            .await,
            gauteng: classification(&service, &root, "Gauteng", ClassificationType::Locality).await,
            news: category(&service, &root, "News").await,
            sport: category(&service, &root, "Sport").await,
        };

        let station = service
            .create_station(
                &root,
                NewStation {
                    name: "Radio Kaapstad".to_string(),
                    description: None,
                    province: Province::WesternCape,
                    contact_email: Some("studio@kaapstad.test".to_string()),
                    contact_number: None,
                    website: None,
                    has_content_access: true,
                    allowed_languages: vec!["English".to_string(), "Afrikaans".to_string()],
                    allowed_religions: vec!["Christian".to_string()],
                    blocked_category_ids: vec![taxonomy.sport.id],
                },
            )
            .await
            .expect("create station");

        let radio_user = seed_user(
            &repos,
            "dj@kaapstad.test",
            UserType::Radio,
            None,
            Some(station.id),
        )
        .await;

        events.clear();

        Self {
            db,
            repos,
            config,
            service,
            events,
            mailer,
            blobs,
            staff,
            station,
            radio_user,
            taxonomy,
        }
    }

    pub fn as_intern(&self) -> Principal {
        principal_of(&self.staff.intern)
    }

    pub fn as_journalist(&self) -> Principal {
        principal_of(&self.staff.journalist)
    }

    pub fn as_sub_editor(&self) -> Principal {
        principal_of(&self.staff.sub_editor)
    }

    pub fn as_editor(&self) -> Principal {
        principal_of(&self.staff.editor)
    }

    pub fn as_admin(&self) -> Principal {
        principal_of(&self.staff.admin)
    }

    pub fn as_superadmin(&self) -> Principal {
        principal_of(&self.staff.superadmin)
    }

    pub fn as_radio(&self) -> Principal {
        principal_of(&self.radio_user)
    }

    /// A draft written by the journalist
    pub async fn draft(&self, title: &str, classification_ids: Vec<Uuid>) -> Story {
        self.service
            .create_story(
                &self.as_journalist(),
                NewStory {
                    title: title.to_string(),
                    content: format!("<p>{}</p>", title),
                    summary: None,
                    category_id: Some(self.taxonomy.news.id),
                    classification_ids,
                    tag_ids: Vec::new(),
                },
            )
            .await
            .expect("create story")
    }

    /// Walk a draft through review and approval to publication
    pub async fn publish(&self, story: &Story) -> Story {
        let steps = [
            (self.as_journalist(), StoryStatus::InReview),
            (self.as_sub_editor(), StoryStatus::PendingApproval),
            (self.as_editor(), StoryStatus::Approved),
            (self.as_editor(), StoryStatus::Published),
        ];
        let mut current = story.clone();
        for (by, to) in steps {
            current = self
                .service
                .change_status(
                    &by,
                    story.id,
                    StatusChange {
                        to,
                        reason: None,
                        assignee_id: None,
                    },
                )
                .await
                .unwrap_or_else(|e| panic!("move to {to} failed: {e}"));
        }
        current
    }

    pub async fn published(&self, title: &str, classification_ids: Vec<Uuid>) -> Story {
        let story = self.draft(title, classification_ids).await;
        self.publish(&story).await
    }
}

pub fn audio_upload(name: &str) -> Upload {
    Upload {
        file_name: name.to_string(),
        content_type: "audio/mpeg".to_string(),
        bytes: bytes::Bytes::from_static(b"ID3\x03\x00\x00\x00fake-mp3-frames"),
    }
}

pub fn change(to: StoryStatus) -> StatusChange {
    StatusChange {
        to,
        reason: None,
        assignee_id: None,
    }
}

pub fn print_test_header(test_name: &str, purpose: &str) {
    println!("\n🧪 TEST: {}", test_name);
    println!("📋 PURPOSE: {}", purpose);
}
