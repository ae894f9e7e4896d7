use sqlx::PgPool;

/// Runs `kanau` processors against the connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
