use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};

use crate::config::StoreConfig;
use crate::domain::{
    BalanceSnapshot, Cents, Client, ClientId, Transaction, TransactionIntent, TransactionKind,
};

use super::MIGRATION_001_INITIAL;

/// Result of an atomic apply. Anything but `Applied` left the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        transaction: Transaction,
        snapshot: BalanceSnapshot,
    },
    LimitExceeded,
    /// The new balance would not fit in the balance column
    BalanceOutOfRange,
    ClientNotFound,
}

/// Per-client figures for ledger integrity verification.
#[derive(Debug, Clone)]
pub struct ClientIntegrity {
    pub client: Client,
    /// Sum of signed amounts over every stored transaction
    pub transaction_total: Cents,
    pub transaction_count: i64,
}

/// Repository for persisting and querying clients and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a connection pool for the configured database file.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(config: &StoreConfig) -> Result<Self> {
        let repo = Self::connect(config).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Client operations
    // ========================

    /// Insert a client unless one with the same id already exists.
    /// Returns true if a row was written.
    pub async fn provision_client(&self, client: &Client) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (id, credit_limit, balance)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(client.id)
        .bind(client.limit)
        .bind(client.balance)
        .execute(&self.pool)
        .await
        .context("Failed to provision client")?;

        Ok(result.rows_affected() == 1)
    }

    /// Get a client by ID.
    pub async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        fetch_client(&mut conn, id).await
    }

    /// List all provisioned clients, ordered by id.
    pub async fn list_clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query("SELECT id, credit_limit, balance FROM clients ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list clients")?;

        Ok(rows.iter().map(row_to_client).collect())
    }

    // ========================
    // Transaction operations
    // ========================

    /// Apply a transaction as one unit of work: check the limit, move the
    /// balance and record the transaction, or do nothing at all.
    ///
    /// The conditional UPDATE is the first statement of the SQL transaction,
    /// so it takes the database write lock before reading the balance it
    /// checks. Concurrent applies for the same client queue on that lock
    /// (bounded by the connection's busy timeout) and each sees the balance
    /// left by the previous commit.
    pub async fn apply_transaction(
        &self,
        client_id: ClientId,
        intent: &TransactionIntent,
    ) -> Result<ApplyOutcome> {
        let delta = intent.delta();
        // Range of starting balances for which balance + delta stays an i64
        let (lowest, highest) = if delta >= 0 {
            (i64::MIN, i64::MAX - delta)
        } else {
            (i64::MIN - delta, i64::MAX)
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let updated = sqlx::query(
            r#"
            UPDATE clients
            SET balance = balance + ?
            WHERE id = ?
              AND balance BETWEEN ? AND ?
              AND (? = 'c' OR balance + ? >= -credit_limit)
            RETURNING balance, credit_limit
            "#,
        )
        .bind(delta)
        .bind(client_id)
        .bind(lowest)
        .bind(highest)
        .bind(intent.kind.as_str())
        .bind(delta)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to update balance")?;

        let Some(row) = updated else {
            let client = fetch_client(&mut tx, client_id).await?;
            tx.rollback().await.context("Failed to roll back")?;
            return Ok(match client {
                None => ApplyOutcome::ClientNotFound,
                Some(c) if c.balance < lowest || c.balance > highest => {
                    ApplyOutcome::BalanceOutOfRange
                }
                Some(_) => ApplyOutcome::LimitExceeded,
            });
        };

        let snapshot = BalanceSnapshot {
            balance: row
                .try_get("balance")
                .context("Invalid balance returned by update")?,
            limit: row
                .try_get("credit_limit")
                .context("Invalid limit returned by update")?,
        };

        // Never earlier than the client's latest entry, even if the clock steps back
        let now = Utc::now().trunc_subsecs(6);
        let occurred_at = match last_occurred_at(&mut tx, client_id).await? {
            Some(last) if last > now => last,
            _ => now,
        };

        let id: i64 = sqlx::query(
            r#"
            INSERT INTO transactions (client_id, amount, kind, description, occurred_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(client_id)
        .bind(intent.amount)
        .bind(intent.kind.as_str())
        .bind(&intent.description)
        .bind(format_timestamp(occurred_at))
        .fetch_one(&mut *tx)
        .await
        .context("Failed to save transaction")?
        .get("id");

        tx.commit().await.context("Failed to commit transaction")?;

        Ok(ApplyOutcome::Applied {
            transaction: Transaction {
                id,
                client_id,
                amount: intent.amount,
                kind: intent.kind,
                description: intent.description.clone(),
                occurred_at,
            },
            snapshot,
        })
    }

    /// Most recent transactions for a client, newest first.
    pub async fn recent_transactions(
        &self,
        client_id: ClientId,
        limit: usize,
    ) -> Result<Vec<Transaction>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        fetch_recent(&mut conn, client_id, limit).await
    }

    /// Client row and its recent transactions, read from one snapshot.
    pub async fn statement(
        &self,
        client_id: ClientId,
        limit: usize,
    ) -> Result<Option<(Client, Vec<Transaction>)>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let Some(client) = fetch_client(&mut tx, client_id).await? else {
            tx.rollback().await.context("Failed to roll back")?;
            return Ok(None);
        };
        let transactions = fetch_recent(&mut tx, client_id, limit).await?;

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(Some((client, transactions)))
    }

    /// Stored balance next to the sum of each client's transactions.
    pub async fn integrity_stats(&self) -> Result<Vec<ClientIntegrity>> {
        let rows = sqlx::query(
            r#"
            SELECT
                c.id, c.credit_limit, c.balance,
                COALESCE(SUM(CASE WHEN t.kind = 'c' THEN t.amount ELSE -t.amount END), 0) as total,
                COUNT(t.id) as count
            FROM clients c
            LEFT JOIN transactions t ON t.client_id = c.id
            GROUP BY c.id, c.credit_limit, c.balance
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to compute integrity stats")?;

        Ok(rows
            .iter()
            .map(|row| ClientIntegrity {
                client: row_to_client(row),
                transaction_total: row.get("total"),
                transaction_count: row.get("count"),
            })
            .collect())
    }
}

async fn fetch_client(conn: &mut SqliteConnection, id: ClientId) -> Result<Option<Client>> {
    let row = sqlx::query("SELECT id, credit_limit, balance FROM clients WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await
        .context("Failed to fetch client")?;

    Ok(row.as_ref().map(row_to_client))
}

async fn fetch_recent(
    conn: &mut SqliteConnection,
    client_id: ClientId,
    limit: usize,
) -> Result<Vec<Transaction>> {
    let rows = sqlx::query(
        r#"
        SELECT id, client_id, amount, kind, description, occurred_at
        FROM transactions
        WHERE client_id = ?
        ORDER BY occurred_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(client_id)
    .bind(i64::try_from(limit).unwrap_or(i64::MAX))
    .fetch_all(conn)
    .await
    .context("Failed to list recent transactions")?;

    rows.iter().map(row_to_transaction).collect()
}

async fn last_occurred_at(
    conn: &mut SqliteConnection,
    client_id: ClientId,
) -> Result<Option<DateTime<Utc>>> {
    let row = sqlx::query("SELECT MAX(occurred_at) as last FROM transactions WHERE client_id = ?")
        .bind(client_id)
        .fetch_one(conn)
        .await
        .context("Failed to read last transaction time")?;

    let last: Option<String> = row.get("last");
    last.map(|s| parse_timestamp(&s)).transpose()
}

/// Fixed-width RFC 3339 so that text order matches time order.
fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .context("Invalid occurred_at timestamp")?
        .with_timezone(&Utc))
}

fn row_to_client(row: &SqliteRow) -> Client {
    Client {
        id: row.get("id"),
        limit: row.get("credit_limit"),
        balance: row.get("balance"),
    }
}

fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
    let kind_str: String = row.get("kind");
    let occurred_at_str: String = row.get("occurred_at");

    Ok(Transaction {
        id: row.get("id"),
        client_id: row.get("client_id"),
        amount: row.get("amount"),
        kind: TransactionKind::from_code(&kind_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid transaction kind: {}", kind_str))?,
        description: row.get("description"),
        occurred_at: parse_timestamp(&occurred_at_str)?,
    })
}
