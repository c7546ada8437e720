//! Upload intake and queue management for the signed-in user.
//!
//! Progress is driven elsewhere by the upload clock; these services only
//! enqueue, inspect and remove items.

use std::time::Instant;

use rand::Rng;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::upload::{FileDescriptor, UploadId};
use crate::dto::uploads::{IntakeOutcome, UploadsView};
use crate::policy::{Feature, authorize};
use crate::services::{ServiceError, ServiceResult};
use crate::upload_queue::UploadQueue;

/// Validates a batch and enqueues the files that pass.
///
/// An oversized batch is refused as a whole with [`ServiceError::Form`].
pub fn intake<R: Rng>(
    queue: &UploadQueue,
    user: &AuthenticatedUser,
    files: Vec<FileDescriptor>,
    now: Instant,
    rng: &mut R,
) -> ServiceResult<IntakeOutcome> {
    authorize(user, Feature::UploadDocuments)?;

    if files.is_empty() {
        return Err(ServiceError::Form("Select at least one file to upload.".to_string()));
    }

    let report = queue
        .intake(&user.sub, files, now, rng)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    log::info!(
        "{} queued {} upload(s), {} rejected",
        user.email,
        report.accepted.len(),
        report.rejected.len()
    );

    Ok(IntakeOutcome {
        accepted: report.accepted,
        rejected: report.rejected.iter().map(ToString::to_string).collect(),
    })
}

/// Current queue plus any notifications raised by the clock since the last
/// call. Notifications are consumed.
pub fn list_uploads(queue: &UploadQueue, user: &AuthenticatedUser) -> ServiceResult<UploadsView> {
    authorize(user, Feature::UploadDocuments)?;

    Ok(UploadsView {
        items: queue.items(&user.sub),
        notifications: queue.drain_notifications(&user.sub),
        active: queue.has_active(&user.sub),
    })
}

/// Removes an item in any state.
pub fn remove_upload(
    queue: &UploadQueue,
    user: &AuthenticatedUser,
    upload_id: String,
) -> ServiceResult<()> {
    authorize(user, Feature::UploadDocuments)?;

    if queue.remove(&user.sub, &UploadId::from(upload_id)) {
        Ok(())
    } else {
        Err(ServiceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::upload::UploadState;
    use crate::services::test_support::user;

    fn pdf(name: &str, size: u64) -> FileDescriptor {
        FileDescriptor::new(name, "application/pdf", size)
    }

    #[test]
    fn mixed_batch_reports_accepted_and_rejected() {
        let queue = UploadQueue::new();
        let mut rng = StdRng::seed_from_u64(1);
        let files = vec![
            pdf("a.pdf", 1024),
            FileDescriptor::new("b.docx", "application/msword", 1024),
            pdf("c.pdf", 0),
        ];

        let outcome =
            intake(&queue, &user(Role::Paralegal), files, Instant::now(), &mut rng).unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected.len(), 2);
        let view = list_uploads(&queue, &user(Role::Paralegal)).unwrap();
        assert_eq!(view.items.len(), 3);
        assert!(view.active);
    }

    #[test]
    fn eleven_files_are_refused_before_any_item_is_created() {
        let queue = UploadQueue::new();
        let mut rng = StdRng::seed_from_u64(2);
        let files = (0..11).map(|i| pdf(&format!("{i}.pdf"), 10)).collect();

        let result = intake(&queue, &user(Role::Admin), files, Instant::now(), &mut rng);

        let Err(ServiceError::Form(message)) = result else {
            panic!("expected batch rejection");
        };
        assert!(message.contains("11 files"));
        assert!(list_uploads(&queue, &user(Role::Admin)).unwrap().items.is_empty());
    }

    #[test]
    fn removed_items_stop_progressing() {
        let queue = UploadQueue::new();
        let mut rng = StdRng::seed_from_u64(3);
        let admin = user(Role::Admin);
        let start = Instant::now();

        let outcome = intake(&queue, &admin, vec![pdf("a.pdf", 10)], start, &mut rng).unwrap();
        let id = outcome.accepted[0].to_string();
        remove_upload(&queue, &admin, id.clone()).unwrap();

        queue.tick(start + Duration::from_secs(60), &mut rng);

        assert!(list_uploads(&queue, &admin).unwrap().items.is_empty());
        assert!(matches!(
            remove_upload(&queue, &admin, id),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn queues_are_private_to_their_owner() {
        let queue = UploadQueue::new();
        let mut rng = StdRng::seed_from_u64(4);
        intake(&queue, &user(Role::Admin), vec![pdf("a.pdf", 10)], Instant::now(), &mut rng)
            .unwrap();

        let other = list_uploads(&queue, &user(Role::Paralegal)).unwrap();
        assert!(other.items.is_empty());
    }

    #[test]
    fn viewer_cannot_upload() {
        let queue = UploadQueue::new();
        let mut rng = StdRng::seed_from_u64(5);
        let result = intake(
            &queue,
            &user(Role::Viewer),
            vec![pdf("a.pdf", 10)],
            Instant::now(),
            &mut rng,
        );
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn completed_items_raise_a_notification() {
        let queue = UploadQueue::new();
        let mut rng = StdRng::seed_from_u64(6);
        let admin = user(Role::Admin);
        let mut now = Instant::now();
        intake(&queue, &admin, vec![pdf("a.pdf", 10)], now, &mut rng).unwrap();

        // Worst case: 20 steps of 5% at 500 ms each.
        for _ in 0..40 {
            now += Duration::from_millis(500);
            queue.tick(now, &mut rng);
        }

        let view = list_uploads(&queue, &admin).unwrap();
        assert_eq!(view.items[0].state, UploadState::Done);
        assert_eq!(view.items[0].progress, 100);
        assert!(!view.active);
        assert_eq!(view.notifications.len(), 1);
        assert!(list_uploads(&queue, &admin).unwrap().notifications.is_empty());
    }
}
