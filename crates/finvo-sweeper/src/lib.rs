//! Reminder sweep job.
//!
//! One pass per invocation: enumerate users by their storage prefixes, pull
//! each user's due reminders out of storage, and send one email per due
//! reminder. Due reminders are removed when swept, before any send is
//! attempted, so a failed send is logged but never retried.

use chrono::{DateTime, Utc};
use finvo_core::{AppError, ReminderRecord};
use finvo_records::ReminderRepository;
use finvo_services::{IdentityProvider, Mailer};
use finvo_storage::{keys, BlobStore};
use std::sync::Arc;

/// Collaborator handles the sweep runs against. Tests inject a
/// tempdir-backed local store and mock identity/mailer implementations.
pub struct SweepDeps {
    pub store: Arc<dyn BlobStore>,
    pub reminders: ReminderRepository,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn Mailer>,
}

impl SweepDeps {
    pub fn new(
        store: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            reminders: ReminderRepository::new(store.clone()),
            store,
            identity,
            mailer,
        }
    }
}

/// Coarse counts for the run, for logging only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub users_seen: usize,
    pub reminders_sent: usize,
    pub send_failures: usize,
}

fn reminder_subject(reminder: &ReminderRecord) -> String {
    format!("Reminder: {} is due!", reminder.file_name)
}

fn reminder_body(reminder: &ReminderRecord) -> String {
    format!(
        "Hello,\n\n\
         This is a reminder that your document {} is due on {} UTC.\n\n\
         Please take any necessary actions.\n\n\
         Thanks,\n\
         Your Reminder App\n",
        reminder.file_name,
        reminder.due_date.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Run one sweep pass over every user.
///
/// Per-user failures are logged and do not abort the remaining users. The
/// top-level error is reserved for the initial prefix listing, without which
/// there is nothing to iterate.
pub async fn run_sweep(deps: &SweepDeps, now: DateTime<Utc>) -> Result<SweepSummary, AppError> {
    let prefixes = deps
        .store
        .list_common_prefixes(keys::UPLOADS_ROOT)
        .await
        .map_err(AppError::from)?;

    let mut summary = SweepSummary::default();

    for prefix in prefixes {
        let Some(user_id) = keys::user_id_from_prefix(&prefix) else {
            tracing::warn!(prefix = %prefix, "Skipping unrecognized prefix");
            continue;
        };
        summary.users_seen += 1;

        match sweep_user(deps, user_id, now).await {
            Ok((sent, failed)) => {
                summary.reminders_sent += sent;
                summary.send_failures += failed;
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Sweep failed for user");
            }
        }
    }

    tracing::info!(
        users_seen = summary.users_seen,
        reminders_sent = summary.reminders_sent,
        send_failures = summary.send_failures,
        "Sweep complete"
    );
    Ok(summary)
}

/// Sweep one user: returns (sent, failed) counts.
async fn sweep_user(
    deps: &SweepDeps,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<(usize, usize), AppError> {
    let due = deps.reminders.sweep_due(user_id, now).await?;
    if due.is_empty() {
        return Ok((0, 0));
    }

    // Due reminders are already removed from storage at this point; a user
    // without a resolvable email loses them, matching the at-most-once
    // delivery contract.
    let Some(email) = deps.identity.lookup_email(user_id).await? else {
        tracing::warn!(
            user_id = %user_id,
            dropped = due.len(),
            "No email on file, skipping sends"
        );
        return Ok((0, 0));
    };

    let mut sent = 0;
    let mut failed = 0;
    for reminder in &due {
        let subject = reminder_subject(reminder);
        let body = reminder_body(reminder);
        match deps.mailer.send(&email, &subject, &body).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %user_id,
                    file_name = %reminder.file_name,
                    "Reminder email sent"
                );
                sent += 1;
            }
            Err(e) => {
                tracing::error!(
                    user_id = %user_id,
                    file_name = %reminder.file_name,
                    error = %e,
                    "Reminder email failed"
                );
                failed += 1;
            }
        }
    }
    Ok((sent, failed))
}
