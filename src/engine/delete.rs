use crate::error::ImportError;
use crate::service::{AccountService, CONTACT_IN_USE};

use log::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: u64,
    pub skipped: u64,
}

/// Deletes every contact the service will let go of. Contacts referenced by a
/// transaction are counted as skipped.
pub async fn delete_unused_contacts(
    service: &dyn AccountService,
    dry_run: bool,
) -> Result<DeleteReport, ImportError> {
    let mut report = DeleteReport::default();
    if dry_run {
        info!("No Contacts are deleted in dry run.");
        return Ok(report);
    }

    let mut cursor: Option<String> = None;
    loop {
        let page = service.list_contacts(cursor.as_deref()).await?;

        for contact in &page.items {
            debug!("delete Contact {}", contact.id);
            match service.delete_contact(contact).await {
                Ok(()) => report.deleted += 1,
                Err(e) if e.is_code(CONTACT_IN_USE) => {
                    debug!("{} {}", contact.id, e.message);
                    report.skipped += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("{} Contacts deleted", report.deleted);
        info!("{} Contacts skipped", report.skipped);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(report)
}
