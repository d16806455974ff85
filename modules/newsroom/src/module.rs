//! Newsroom module wiring and lifecycle

use crate::config::Config;
use crate::domain::collaborators::{BlobStore, Mailer};
use crate::domain::events::BroadcastEventPublisher;
use crate::domain::Service;
use crate::infra::storage::{sea_orm_repositories, Migrator};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Newsroom module: service, event hub and REST surface
pub struct NewsroomModule {
    config: Arc<Config>,
    service: Arc<Service>,
    hub: Arc<BroadcastEventPublisher>,
}

impl NewsroomModule {
    /// Run all pending database migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        Migrator::up(db, None).await?;
        tracing::info!("Newsroom migrations completed");
        Ok(())
    }

    pub fn init(
        db: Arc<DatabaseConnection>,
        config: Config,
        blobs: Arc<dyn BlobStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let config = Arc::new(config);

        // Build repositories
        let repos = sea_orm_repositories(db);

        // The broadcast hub doubles as the service's publisher and the SSE source
        let hub = Arc::new(BroadcastEventPublisher::new(config.event_buffer));

        let service = Arc::new(Service::new(
            repos,
            hub.clone(),
            blobs,
            mailer,
            config.clone(),
        ));

        tracing::info!(
            session_ttl_hours = config.session_ttl_hours,
            event_buffer = config.event_buffer,
            "Newsroom module initialized"
        );
        Self {
            config,
            service,
            hub,
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn events(&self) -> Arc<BroadcastEventPublisher> {
        self.hub.clone()
    }

    /// Mount the newsroom REST routes onto `router`
    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        tracing::info!("Registering newsroom REST routes");
        crate::api::rest::register_routes(router, self.service.clone(), self.hub.clone())
    }

    /// Background housekeeping until `cancel` fires
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let period = Duration::from_secs(self.config.session_purge_interval_minutes.max(1) * 60);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Newsroom background tasks stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    match self.service.purge_expired_sessions().await {
                        Ok(0) => {}
                        Ok(removed) => tracing::info!(removed, "purged expired sessions"),
                        Err(e) => tracing::warn!(error = %e, "session purge failed"),
                    }
                }
            }
        }
    }
}
