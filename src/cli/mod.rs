use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::config::{ServerConfig, StoreConfig};
use crate::domain::{format_cents, ClientId, TransactionRequest, DEFAULT_CLIENTS};
use crate::http;

/// Saldo - account ledger with per-client credit limits
#[derive(Parser)]
#[command(name = "saldo")]
#[command(about = "An account ledger where every client has a fixed credit limit")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "SALDO_DATABASE", default_value = "saldo.db")]
    pub database: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "SALDO_POOL_SIZE", default_value_t = StoreConfig::DEFAULT_MAX_CONNECTIONS)]
    pub pool_size: u32,

    /// How long a write waits for the database lock, in milliseconds
    #[arg(long, env = "SALDO_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    pub busy_timeout_ms: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database and provision the default clients
    Init {
        /// Only create the schema
        #[arg(long)]
        no_seed: bool,
    },

    /// Provision a client with a credit limit
    Seed {
        /// Client id
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        client: ClientId,

        /// Credit limit in cents
        #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
        limit: i64,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "SALDO_ADDR", default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },

    /// Submit a transaction for a client
    Submit {
        /// Client id
        client: ClientId,

        /// Amount in cents
        #[arg(allow_negative_numbers = true)]
        amount: i64,

        /// Transaction type: c (credit) or d (debit)
        kind: String,

        /// Description (1 to 10 characters)
        description: String,
    },

    /// Show balance and the latest transactions of a client
    Statement {
        /// Client id
        client: ClientId,
    },

    /// List provisioned clients
    Clients,

    /// Verify ledger integrity
    Check,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        let store = StoreConfig::new(&self.database)
            .with_max_connections(self.pool_size)
            .with_busy_timeout(Duration::from_millis(self.busy_timeout_ms));

        match self.command {
            Commands::Init { no_seed } => {
                let mut service = LedgerService::init(&store).await?;
                println!("Database initialized: {}", self.database);

                if !no_seed {
                    let created = service.seed_clients(&DEFAULT_CLIENTS).await?;
                    println!("Provisioned {} client(s)", created.len());
                }
            }

            Commands::Seed { client, limit } => {
                let mut service = LedgerService::connect(&store).await?;
                let created = service.seed_clients(&[(client, limit)]).await?;
                if created.is_empty() {
                    println!("Client {} already exists, left unchanged", client);
                } else {
                    println!("Provisioned client {} (limit {})", client, format_cents(limit));
                }
            }

            Commands::Serve { addr } => {
                let service = LedgerService::connect(&store).await?;
                info!(database = %self.database, pool_size = self.pool_size, "ledger ready");
                http::serve(&ServerConfig { addr }, Arc::new(service)).await?;
            }

            Commands::Submit {
                client,
                amount,
                kind,
                description,
            } => {
                let service = LedgerService::connect(&store).await?;
                let request = TransactionRequest::new(amount, &kind, &description);
                let snapshot = service.submit(client, &request).await?;
                println!(
                    "Client {}: balance {} (limit {})",
                    client,
                    format_cents(snapshot.balance),
                    format_cents(snapshot.limit)
                );
            }

            Commands::Statement { client } => {
                let service = LedgerService::connect(&store).await?;
                run_statement_command(&service, client).await?;
            }

            Commands::Clients => {
                let service = LedgerService::connect(&store).await?;
                run_clients_command(&service).await?;
            }

            Commands::Check => {
                let service = LedgerService::connect(&store).await?;
                run_check_command(&service).await?;
            }
        }

        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "saldo=debug" } else { "saldo=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Already installed when run from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

async fn run_statement_command(service: &LedgerService, client: ClientId) -> Result<()> {
    let statement = service.statement(client).await?;

    println!(
        "Client {}: balance {} (limit {}) as of {}",
        statement.client_id,
        format_cents(statement.balance),
        format_cents(statement.limit),
        statement.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if statement.recent_transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{:<28} {:<4} {:>12} DESCRIPTION", "DATE", "TYPE", "AMOUNT");
    println!("{}", "-".repeat(60));
    for transaction in &statement.recent_transactions {
        println!(
            "{:<28} {:<4} {:>12} {}",
            transaction.occurred_at.format("%Y-%m-%d %H:%M:%S%.6f"),
            transaction.kind,
            format_cents(transaction.amount),
            transaction.description
        );
    }
    Ok(())
}

async fn run_clients_command(service: &LedgerService) -> Result<()> {
    let clients = service.list_clients().await?;
    if clients.is_empty() {
        println!("No clients found.");
        return Ok(());
    }

    println!("{:<8} {:>14} {:>14}", "CLIENT", "LIMIT", "BALANCE");
    println!("{}", "-".repeat(38));
    for client in clients {
        println!(
            "{:<8} {:>14} {:>14}",
            client.id,
            format_cents(client.limit),
            format_cents(client.balance)
        );
    }
    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    let report = service.check_integrity().await?;

    for check in &report.clients {
        let status = if check.is_healthy() { "OK" } else { "FAIL" };
        println!(
            "[{}] client {}: balance {}, limit {}, {} transaction(s) totalling {}",
            status,
            check.client_id,
            format_cents(check.balance),
            format_cents(check.limit),
            check.transaction_count,
            format_cents(check.transaction_total)
        );
    }

    if report.is_healthy() {
        println!("Ledger integrity verified.");
        Ok(())
    } else {
        anyhow::bail!("Ledger integrity check failed")
    }
}
