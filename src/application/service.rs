use std::collections::HashSet;

use chrono::Utc;

use crate::config::StoreConfig;
use crate::domain::{
    BalanceSnapshot, Cents, Client, ClientId, TransactionRequest, ValidationError,
};
use crate::storage::{ApplyOutcome, Repository};

use super::{AppError, ClientCheck, IntegrityReport, STATEMENT_SIZE, Statement};

/// Application service providing high-level operations for the ledger.
/// This is the primary interface for any client (CLI, HTTP, tests).
pub struct LedgerService {
    repo: Repository,
    /// Ids of provisioned clients, loaded from the store
    clients: HashSet<ClientId>,
}

impl LedgerService {
    /// Create a ledger service over an already migrated repository.
    pub async fn new(repo: Repository) -> Result<Self, AppError> {
        let clients = repo
            .list_clients()
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        Ok(Self { repo, clients })
    }

    /// Create the database if needed and run migrations.
    pub async fn init(config: &StoreConfig) -> Result<Self, AppError> {
        let config = config.clone().create_if_missing(true);
        let repo = Repository::init(&config).await?;
        Self::new(repo).await
    }

    /// Connect to an existing database.
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        let repo = Repository::connect(config).await?;
        Self::new(repo).await
    }

    // ========================
    // Provisioning
    // ========================

    /// Provision clients that don't exist yet. Existing clients keep their
    /// limit and balance. Returns the clients that were newly created.
    /// Nothing is written if any entry is invalid.
    pub async fn seed_clients(
        &mut self,
        clients: &[(ClientId, Cents)],
    ) -> Result<Vec<Client>, AppError> {
        let clients = clients
            .iter()
            .map(|&(id, limit)| Client::new(id, limit))
            .collect::<Result<Vec<_>, _>>()?;

        let mut created = Vec::new();
        for client in clients {
            self.clients.insert(client.id);
            if self.repo.provision_client(&client).await? {
                created.push(client);
            }
        }
        Ok(created)
    }

    /// Returns true if the id belongs to a provisioned client.
    pub fn is_provisioned(&self, client_id: ClientId) -> bool {
        self.clients.contains(&client_id)
    }

    fn ensure_provisioned(&self, client_id: ClientId) -> Result<(), AppError> {
        if self.is_provisioned(client_id) {
            Ok(())
        } else {
            Err(AppError::ClientNotFound(client_id.to_string()))
        }
    }

    /// Get a client by id.
    pub async fn get_client(&self, client_id: ClientId) -> Result<Client, AppError> {
        self.repo
            .get_client(client_id)
            .await?
            .ok_or_else(|| AppError::ClientNotFound(client_id.to_string()))
    }

    /// List all clients.
    pub async fn list_clients(&self) -> Result<Vec<Client>, AppError> {
        Ok(self.repo.list_clients().await?)
    }

    // ========================
    // Transactions
    // ========================

    /// Validate and apply a transaction, returning the balance produced by
    /// that same apply.
    pub async fn submit(
        &self,
        client_id: ClientId,
        request: &TransactionRequest,
    ) -> Result<BalanceSnapshot, AppError> {
        self.ensure_provisioned(client_id)?;
        self.apply(client_id, request).await
    }

    /// Same as [`submit`](Self::submit), starting from a raw JSON body.
    pub async fn submit_json(
        &self,
        client_id: ClientId,
        body: &[u8],
    ) -> Result<BalanceSnapshot, AppError> {
        self.ensure_provisioned(client_id)?;
        let request = TransactionRequest::from_json(body)?;
        self.apply(client_id, &request).await
    }

    async fn apply(
        &self,
        client_id: ClientId,
        request: &TransactionRequest,
    ) -> Result<BalanceSnapshot, AppError> {
        let intent = request.validate()?;

        match self.repo.apply_transaction(client_id, &intent).await? {
            ApplyOutcome::Applied { snapshot, .. } => Ok(snapshot),
            ApplyOutcome::LimitExceeded => {
                let limit = self.get_client(client_id).await?.limit;
                Err(AppError::LimitExceeded { client_id, limit })
            }
            ApplyOutcome::BalanceOutOfRange => Err(AppError::Validation(
                ValidationError::InvalidAmount(intent.amount.to_string()),
            )),
            ApplyOutcome::ClientNotFound => Err(AppError::ClientNotFound(client_id.to_string())),
        }
    }

    // ========================
    // Statements
    // ========================

    /// Current balance and the most recent transactions, newest first.
    pub async fn statement(&self, client_id: ClientId) -> Result<Statement, AppError> {
        self.ensure_provisioned(client_id)?;

        let (client, recent_transactions) = self
            .repo
            .statement(client_id, STATEMENT_SIZE)
            .await?
            .ok_or_else(|| AppError::ClientNotFound(client_id.to_string()))?;

        Ok(Statement {
            client_id,
            balance: client.balance,
            limit: client.limit,
            generated_at: Utc::now(),
            recent_transactions,
        })
    }

    // ========================
    // Integrity operations
    // ========================

    /// Check every client against its limit and its transaction history.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let stats = self.repo.integrity_stats().await?;

        Ok(IntegrityReport {
            clients: stats
                .into_iter()
                .map(|s| ClientCheck {
                    client_id: s.client.id,
                    balance: s.client.balance,
                    limit: s.client.limit,
                    transaction_total: s.transaction_total,
                    transaction_count: s.transaction_count,
                })
                .collect(),
        })
    }
}
