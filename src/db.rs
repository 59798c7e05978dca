use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use tracing::info;

use crate::config::DataBaseConfig;

/// Opens the connection pool. Statements are logged only in debug mode.
pub async fn connect(cfg: &DataBaseConfig, debug: bool) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections())
        .connect_with(connect_options(cfg, debug)?)
        .await
        .context("connect to database")?;
    info!(host = %cfg.host, port = cfg.port, db = %cfg.name, "database pool ready");
    Ok(pool)
}

/// Same as [`connect`] but without touching the network until first use.
pub fn connect_lazy(cfg: &DataBaseConfig, debug: bool) -> anyhow::Result<PgPool> {
    Ok(PgPoolOptions::new()
        .max_connections(cfg.max_connections())
        .connect_lazy_with(connect_options(cfg, debug)?))
}

fn connect_options(cfg: &DataBaseConfig, debug: bool) -> anyhow::Result<PgConnectOptions> {
    let opts: PgConnectOptions = cfg.dsn().parse().context("parse database dsn")?;
    Ok(if debug {
        opts
    } else {
        opts.disable_statement_logging()
    })
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Constraint and table naming used by the migrations.
pub mod naming {
    /// `User` -> `users`.
    pub fn table_name(model: &str) -> String {
        format!("{}s", model.to_lowercase())
    }

    pub fn primary_key(table: &str, column: &str) -> String {
        format!("pk_{table}_{column}")
    }

    pub fn unique(table: &str, column: &str) -> String {
        format!("uq_{table}_{column}")
    }

    pub fn foreign_key(table: &str, column: &str, referred_table: &str) -> String {
        format!("fk_{table}_{column}_{referred_table}")
    }

    pub fn index(table: &str, column: &str) -> String {
        format!("ix_{table}_{column}")
    }

    pub fn check(table: &str, constraint: &str) -> String {
        format!("ck_{table}_{constraint}")
    }

    /// Splits a unique constraint name into `(table, column)`.
    ///
    /// Table names never contain `_` in this schema, so the first segment
    /// after the prefix is the table and the rest is the column.
    pub fn parse_unique(constraint: &str) -> Option<(&str, &str)> {
        let rest = constraint.strip_prefix("uq_")?;
        let (table, column) = rest.split_once('_')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        Some((table, column))
    }
}
