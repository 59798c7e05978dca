use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

use finance_accounting::db;

/// Starts a throwaway Postgres container and returns a migrated pool.
///
/// The container stops when dropped, so keep it alive for the whole test.
/// Returns `None` without a Docker daemon so the caller can skip.
pub async fn setup_test_db() -> Option<(PgPool, ContainerAsync<GenericImage>)> {
    let container = match GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "finance_test")
        .start()
        .await
    {
        Ok(container) => container,
        Err(e) => {
            eprintln!("skipping database test, no postgres available: {e}");
            return None;
        }
    };

    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");
    let pool = connect(&format!("postgresql://postgres:postgres@{host}:{port}/finance_test")).await;
    db::migrate(&pool).await.expect("run migrations");
    Some((pool, container))
}

async fn connect(url: &str) -> PgPool {
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    loop {
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}
