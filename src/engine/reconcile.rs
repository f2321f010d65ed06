use crate::error::ImportError;
use crate::service::{AccountService, CreditRequest, DebitRequest, LedgerEndpoint};
use crate::value::{Balance, CreateValueRequest};

use log::debug;
use uuid::Uuid;

/// Updates an existing value to match `desired`.
///
/// Steps run in order: currency check, balance, contact, code. A failing step
/// stops the remaining ones; steps already applied are not rolled back.
pub async fn reconcile_value(
    service: &dyn AccountService,
    desired: &CreateValueRequest,
) -> Result<(), ImportError> {
    let existing = service.get_value(&desired.id).await?;
    debug!("existing value={:?}", existing);

    if existing.currency != desired.currency {
        return Err(ImportError::CurrencyMismatch {
            value_id: existing.id,
            desired: desired.currency.clone(),
            remote: existing.currency,
        });
    }

    if let Some(balance) = &desired.balance {
        let target = match balance {
            Balance::Amount(amount) => *amount,
            Balance::NotANumber(raw) => {
                return Err(ImportError::InvalidBalance {
                    value_id: desired.id.clone(),
                    raw: raw.clone(),
                })
            }
        };
        // A value without a balance is treated as holding zero.
        let current = existing.balance.unwrap_or(0);
        let delta = target
            .checked_sub(current)
            .ok_or_else(|| ImportError::BalanceOutOfRange {
                value_id: desired.id.clone(),
                current,
                target,
            })?;

        if delta > 0 {
            let credit = CreditRequest {
                id: Uuid::new_v4().to_string(),
                amount: delta,
                currency: existing.currency.clone(),
                destination: LedgerEndpoint::internal(&desired.id),
            };
            debug!("credit={:?}", credit);
            service.credit(&credit).await?;
        } else if delta < 0 {
            let debit = DebitRequest {
                id: Uuid::new_v4().to_string(),
                amount: delta.saturating_neg(),
                currency: existing.currency.clone(),
                source: LedgerEndpoint::internal(&desired.id),
            };
            debug!("debit={:?}", debit);
            service.debit(&debit).await?;
        }
    }

    if existing.contact_id.is_none() {
        if let Some(contact_id) = &desired.contact_id {
            debug!("attach contact {} to value {}", contact_id, desired.id);
            service
                .attach_contact_to_value(contact_id, &desired.id)
                .await?;
        }
    }

    if let Some(code) = &desired.code {
        if existing.code.as_deref() != Some(code.as_str()) {
            debug!("change code of value {}", desired.id);
            service.change_value_code(&existing, code).await?;
        }
    }

    Ok(())
}
