//! Super-admin self checks of every collaborator

use super::Service;
use crate::contract::{DiagnosticCheck, NewsroomError, Principal};
use crate::domain::collaborators::UploadRequest;
use crate::domain::events::{Channel, ContentEvent, EventKind};
use crate::domain::permissions::{require, CrudAction, Resource};
use bytes::Bytes;
use std::future::Future;
use std::time::Instant;
use uuid::Uuid;

async fn timed<F>(name: &str, check: F) -> DiagnosticCheck
where
    F: Future<Output = anyhow::Result<String>>,
{
    let started = Instant::now();
    let outcome = check.await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match outcome {
        Ok(message) => DiagnosticCheck {
            name: name.to_string(),
            ok: true,
            duration_ms,
            message,
        },
        Err(e) => {
            tracing::warn!(check = name, error = %e, "diagnostic check failed");
            DiagnosticCheck {
                name: name.to_string(),
                ok: false,
                duration_ms,
                message: format!("{:#}", e),
            }
        }
    }
}

impl Service {
    /// Run every check; individual failures are reported, never raised
    pub async fn run_diagnostics(&self, principal: &Principal) -> Result<Vec<DiagnosticCheck>, NewsroomError> {
        require(principal, Resource::Diagnostics, CrudAction::Read)?;

        let database = timed("database", async {
            self.repos.probe.ping().await?;
            Ok("database reachable".to_string())
        })
        .await;

        let storage = timed("storage", async {
            let stored = self
                .blobs
                .upload(UploadRequest {
                    file_name: "diagnostics-probe.txt".to_string(),
                    content_type: "text/plain".to_string(),
                    bytes: Bytes::from_static(b"newskoop diagnostics probe"),
                })
                .await?;
            self.blobs.delete(&stored.url).await?;
            Ok(format!(
                "{} backend stored and removed {} bytes",
                self.blobs.backend(),
                stored.size
            ))
        })
        .await;

        let email = timed("email", async {
            if self.mailer.is_configured() {
                Ok("SMTP transport configured".to_string())
            } else {
                anyhow::bail!("no SMTP host configured, emails are only logged")
            }
        })
        .await;

        let events = timed("events", async {
            let event = ContentEvent::new(
                EventKind::DiagnosticsProbe,
                Uuid::new_v4(),
                serde_json::json!({ "requested_by": principal.user_id }),
            );
            self.events
                .publish(Channel::User(principal.user_id), event)
                .await?;
            Ok("probe event published".to_string())
        })
        .await;

        let checks = vec![database, storage, email, events];
        let failed = checks.iter().filter(|c| !c.ok).count();
        tracing::info!(failed, "diagnostics run");
        self.record_audit(
            Some(principal.user_id),
            "diagnostics.run",
            "system",
            None,
            serde_json::json!({ "failed": failed }),
        )
        .await;
        Ok(checks)
    }
}
