//! Credit ledger.
//!
//! Per-organization transactions form a linked list whose linearity is
//! enforced by partial unique indexes (single root, single child per
//! parent). When two workers race to append, exactly one insert survives;
//! the loser sees a unique violation and retries against the new leaf.

use entity::credit_transactions;
use entity::Id;
use log::*;
use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use entity_api::{credit_transaction as credit_transaction_api, organization as organization_api};

const MAX_RETRIES: usize = 10;

/// Appends a transaction to the organization's chain and moves the balance.
///
/// Runs in its own transaction on the given connection; inside an engine
/// transaction this becomes a savepoint, so a retried append does not unwind
/// the caller's work.
pub async fn create_transaction<C>(
    db: &C,
    organization_id: Id,
    centicredits_delta: i32,
    bot_id: Option<Id>,
    stripe_payment_intent_id: Option<String>,
    description: Option<String>,
) -> Result<credit_transactions::Model, Error>
where
    C: ConnectionTrait + TransactionTrait,
{
    let mut retry_count = 0;

    loop {
        let txn = db.begin().await.map_err(Error::from)?;

        let result = append_transaction(
            &txn,
            organization_id,
            centicredits_delta,
            bot_id,
            stripe_payment_intent_id.clone(),
            description.clone(),
        )
        .await;

        match result {
            Ok(transaction) => {
                txn.commit().await.map_err(Error::from)?;
                return Ok(transaction);
            }
            Err(err) if err.is_unique_violation() => {
                let _ = txn.rollback().await;
                retry_count += 1;
                if retry_count >= MAX_RETRIES {
                    warn!(
                        "Credit transaction for organization {organization_id} still \
                         conflicting after {MAX_RETRIES} attempts"
                    );
                    return Err(Error {
                        source: err.source,
                        error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                            "Max retries exceeded while attempting to create credit transaction"
                                .to_string(),
                        )),
                    });
                }
                debug!(
                    "Credit transaction append lost a race for organization \
                     {organization_id}, retrying ({retry_count}/{MAX_RETRIES})"
                );
                continue;
            }
            Err(err) => {
                let _ = txn.rollback().await;
                return Err(err);
            }
        }
    }
}

async fn append_transaction<C>(
    db: &C,
    organization_id: Id,
    centicredits_delta: i32,
    bot_id: Option<Id>,
    stripe_payment_intent_id: Option<String>,
    description: Option<String>,
) -> Result<credit_transactions::Model, Error>
where
    C: ConnectionTrait,
{
    // Fresh balance and leaf; stale reads lose at the unique index.
    let organization = organization_api::find_by_id(db, organization_id).await?;
    let leaf = credit_transaction_api::find_leaf(db, organization_id).await?;

    let new_balance = organization.centicredits + centicredits_delta;

    let now = chrono::Utc::now();
    let transaction = credit_transaction_api::create(
        db,
        credit_transactions::Model {
            id: Id::new_v4(),
            organization_id,
            centicredits_before: organization.centicredits,
            centicredits_after: new_balance,
            centicredits_delta,
            parent_transaction_id: leaf.map(|leaf| leaf.id),
            bot_id,
            stripe_payment_intent_id,
            description,
            created_at: now.into(),
        },
    )
    .await?;

    organization_api::update_centicredits(db, organization_id, new_balance).await?;

    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_arithmetic_matches_the_chain_invariant() {
        // centicredits_after = centicredits_before + centicredits_delta
        let now = chrono::Utc::now();
        let transaction = credit_transactions::Model {
            id: Id::new_v4(),
            organization_id: Id::new_v4(),
            centicredits_before: 500,
            centicredits_after: 400,
            centicredits_delta: -100,
            parent_transaction_id: None,
            bot_id: None,
            stripe_payment_intent_id: None,
            description: None,
            created_at: now.into(),
        };
        assert_eq!(
            transaction.centicredits_after,
            transaction.centicredits_before + transaction.centicredits_delta
        );
        assert_eq!(transaction.credits_delta(), -1.0);
        assert_eq!(transaction.credits_after(), 4.0);
        assert_eq!(transaction.credits_before(), 5.0);
    }
}
