//! Coin ledger: the arithmetic the original delegated to database stored
//! procedures, done as explicit transactions here.
//!
//! Invariants:
//! - a balance never goes negative (guarded UPDATE, not check-then-write)
//! - deposit/withdrawal transitions fire only from `pending`
//! - every transition mutates the ledger and the transaction row atomically

use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{tx_kind, tx_status, NewWallet, Wallet, WalletTransaction};
use crate::schema::{wallet_transactions, wallets};

pub fn ensure_positive(amount: i64) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::new(
            ErrorCode::InvalidAmount,
            "amount must be a positive number of coins",
        ));
    }
    Ok(())
}

pub fn ensure_pending(status: &str) -> AppResult<()> {
    if status != tx_status::PENDING {
        return Err(AppError::new(
            ErrorCode::TransactionAlreadyDecided,
            format!("transaction is already {status}"),
        ));
    }
    Ok(())
}

/// Coins credited for a swapped gift: a configured percentage of the
/// catalog price, rounded down.
pub fn swap_payout(price_coins: i64, rate_percent: i64) -> i64 {
    (price_coins * rate_percent) / 100
}

/// Open a wallet for a new user; a second event for the same user is a no-op.
pub fn open_wallet(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Wallet> {
    if let Some(existing) = wallets::table
        .filter(wallets::user_id.eq(user_id))
        .first::<Wallet>(conn)
        .optional()?
    {
        return Ok(existing);
    }

    let wallet = diesel::insert_into(wallets::table)
        .values(&NewWallet { user_id })
        .get_result::<Wallet>(conn)?;

    Ok(wallet)
}

pub fn close_wallet(conn: &mut PgConnection, user_id: Uuid) -> AppResult<usize> {
    let closed = diesel::update(wallets::table.filter(wallets::user_id.eq(user_id)))
        .set((
            wallets::is_closed.eq(true),
            wallets::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(closed)
}

pub fn get_wallet(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Wallet> {
    wallets::table
        .filter(wallets::user_id.eq(user_id))
        .first::<Wallet>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::WalletNotFound, "wallet not found"))
}

/// Add coins to an open wallet, returning the new balance.
pub fn credit(conn: &mut PgConnection, user_id: Uuid, amount: i64) -> AppResult<i64> {
    ensure_positive(amount)?;

    let balance = diesel::update(
        wallets::table
            .filter(wallets::user_id.eq(user_id))
            .filter(wallets::is_closed.eq(false)),
    )
    .set((
        wallets::coin_balance.eq(wallets::coin_balance + amount),
        wallets::updated_at.eq(Utc::now()),
    ))
    .returning(wallets::coin_balance)
    .get_result::<i64>(conn)
    .optional()?;

    balance.ok_or_else(|| wallet_unavailable(conn, user_id))
}

/// Remove coins from an open wallet. The balance guard lives in the WHERE
/// clause so two concurrent debits cannot overdraw.
pub fn debit(conn: &mut PgConnection, user_id: Uuid, amount: i64) -> AppResult<i64> {
    ensure_positive(amount)?;

    let balance = diesel::update(
        wallets::table
            .filter(wallets::user_id.eq(user_id))
            .filter(wallets::is_closed.eq(false))
            .filter(wallets::coin_balance.ge(amount)),
    )
    .set((
        wallets::coin_balance.eq(wallets::coin_balance - amount),
        wallets::updated_at.eq(Utc::now()),
    ))
    .returning(wallets::coin_balance)
    .get_result::<i64>(conn)
    .optional()?;

    match balance {
        Some(b) => Ok(b),
        None => {
            // Distinguish "no such wallet" from "not enough coins"
            let err = wallet_unavailable(conn, user_id);
            if matches!(err, AppError::Known { code: ErrorCode::WalletNotFound, .. }
                | AppError::Known { code: ErrorCode::WalletClosed, .. })
            {
                Err(err)
            } else {
                Err(AppError::new(ErrorCode::InsufficientCoins, "not enough coins"))
            }
        }
    }
}

fn wallet_unavailable(conn: &mut PgConnection, user_id: Uuid) -> AppError {
    match wallets::table
        .filter(wallets::user_id.eq(user_id))
        .first::<Wallet>(conn)
        .optional()
    {
        Ok(Some(w)) if w.is_closed => AppError::new(ErrorCode::WalletClosed, "wallet is closed"),
        Ok(Some(_)) => AppError::internal("wallet update matched no rows"),
        Ok(None) => AppError::new(ErrorCode::WalletNotFound, "wallet not found"),
        Err(e) => AppError::internal(format!("db error: {e}")),
    }
}

/// Load a transaction with a row lock, for a decision transition.
fn lock_transaction(conn: &mut PgConnection, tx_id: Uuid) -> AppResult<WalletTransaction> {
    wallet_transactions::table
        .find(tx_id)
        .for_update()
        .first::<WalletTransaction>(conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::TransactionNotFound, "transaction not found"))
}

fn decide(
    conn: &mut PgConnection,
    tx_id: Uuid,
    new_status: &str,
    admin_id: Uuid,
) -> AppResult<WalletTransaction> {
    let updated = diesel::update(wallet_transactions::table.find(tx_id))
        .set((
            wallet_transactions::status.eq(new_status),
            wallet_transactions::decided_by.eq(admin_id),
            wallet_transactions::decided_at.eq(Utc::now()),
        ))
        .get_result::<WalletTransaction>(conn)?;
    Ok(updated)
}

/// Approve a pending deposit: mark approved and credit the coins.
pub fn approve_deposit(
    conn: &mut PgConnection,
    tx_id: Uuid,
    admin_id: Uuid,
) -> AppResult<WalletTransaction> {
    conn.transaction(|conn| {
        let tx = lock_transaction(conn, tx_id)?;
        ensure_kind(&tx, tx_kind::DEPOSIT)?;
        ensure_pending(&tx.status)?;

        credit(conn, tx.user_id, tx.coin_amount)?;
        decide(conn, tx_id, tx_status::APPROVED, admin_id)
    })
}

/// Reject a pending deposit: no ledger movement, the coins were never
/// credited.
pub fn reject_deposit(
    conn: &mut PgConnection,
    tx_id: Uuid,
    admin_id: Uuid,
) -> AppResult<WalletTransaction> {
    conn.transaction(|conn| {
        let tx = lock_transaction(conn, tx_id)?;
        ensure_kind(&tx, tx_kind::DEPOSIT)?;
        ensure_pending(&tx.status)?;

        decide(conn, tx_id, tx_status::REJECTED, admin_id)
    })
}

/// Approve a pending withdrawal: the coins were held at request time, so
/// only the status moves.
pub fn approve_withdrawal(
    conn: &mut PgConnection,
    tx_id: Uuid,
    admin_id: Uuid,
) -> AppResult<WalletTransaction> {
    conn.transaction(|conn| {
        let tx = lock_transaction(conn, tx_id)?;
        ensure_kind(&tx, tx_kind::WITHDRAWAL)?;
        ensure_pending(&tx.status)?;

        decide(conn, tx_id, tx_status::APPROVED, admin_id)
    })
}

/// Reject a pending withdrawal: refund the held coins.
pub fn reject_withdrawal(
    conn: &mut PgConnection,
    tx_id: Uuid,
    admin_id: Uuid,
) -> AppResult<WalletTransaction> {
    conn.transaction(|conn| {
        let tx = lock_transaction(conn, tx_id)?;
        ensure_kind(&tx, tx_kind::WITHDRAWAL)?;
        ensure_pending(&tx.status)?;

        credit(conn, tx.user_id, tx.coin_amount)?;
        decide(conn, tx_id, tx_status::REJECTED, admin_id)
    })
}

fn ensure_kind(tx: &WalletTransaction, kind: &str) -> AppResult<()> {
    if tx.kind != kind {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            format!("expected a {kind} transaction, found {}", tx.kind),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amounts_only() {
        assert!(ensure_positive(1).is_ok());
        assert!(ensure_positive(0).is_err());
        assert!(ensure_positive(-50).is_err());
    }

    #[test]
    fn only_pending_transitions() {
        assert!(ensure_pending("pending").is_ok());
        assert!(matches!(
            ensure_pending("approved"),
            Err(AppError::Known { code: ErrorCode::TransactionAlreadyDecided, .. })
        ));
        assert!(ensure_pending("rejected").is_err());
    }

    #[test]
    fn swap_payout_rounds_down() {
        assert_eq!(swap_payout(100, 70), 70);
        assert_eq!(swap_payout(99, 70), 69);
        assert_eq!(swap_payout(1, 70), 0);
        assert_eq!(swap_payout(500, 100), 500);
    }
}
