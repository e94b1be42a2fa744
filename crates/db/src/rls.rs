//! Row-Level Security (RLS) context management.
//!
//! Every write runs inside a transaction that carries the caller's identity,
//! so the database's own policies decide what the caller may insert. The
//! connection pool itself is never trusted with elevated rights.
//!
//! # Usage
//!
//! ```ignore
//! use nutriscan_db::rls::RlsConnection;
//!
//! let rls = RlsConnection::for_identity(&db, &identity).await?;
//! predictions::ActiveModel { .. }.insert(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use nutriscan_shared::Identity;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, Statement, TransactionTrait,
};
use serde_json::json;

/// Database role every verified caller runs as.
pub const AUTHENTICATED_ROLE: &str = "authenticated";

/// A database transaction scoped to one caller.
///
/// The role and the `request.jwt.claims` setting are `LOCAL`, so they end
/// with the transaction and never leak into the pooled connection.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction that runs as `identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the RLS
    /// context cannot be set.
    pub async fn for_identity(db: &DatabaseConnection, identity: &Identity) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_rls_context(&txn, identity).await?;
        Ok(Self { txn })
    }

    /// Returns a reference to the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Sets the RLS context on an existing transaction.
///
/// # Errors
///
/// Returns an error if the RLS context cannot be set.
pub async fn set_rls_context(txn: &DatabaseTransaction, identity: &Identity) -> Result<(), DbErr> {
    // Role names cannot be bound as parameters; this one is a constant.
    txn.execute_unprepared(&format!("SET LOCAL ROLE {AUTHENTICATED_ROLE}"))
        .await?;

    txn.execute(Statement::from_sql_and_values(
        txn.get_database_backend(),
        "SELECT set_config('request.jwt.claims', $1, true)",
        [claims_json(identity).into()],
    ))
    .await?;

    Ok(())
}

/// Claims the policies read through `auth.uid()` and friends.
#[must_use]
pub fn claims_json(identity: &Identity) -> String {
    let mut claims = json!({
        "sub": identity.subject(),
        "role": AUTHENTICATED_ROLE,
    });
    if let Some(email) = identity.email() {
        claims["email"] = json!(email);
    }
    claims.to_string()
}
