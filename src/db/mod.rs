use sqlx::mysql::MySqlPool;
use tracing::{debug, warn};

pub mod profile;
pub mod session;

const CREATE_TABLES_SQL: &str = "migrations/create_tables.sql";

/// Initialize the MySQL connection pool and create tables
pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Split a migration file into individual statements, dropping comment-only chunks
fn split_statements(sql_content: &str) -> Vec<String> {
    sql_content
        .split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

/// Create all database tables
async fn create_tables(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    let sql_content = match std::fs::read_to_string(CREATE_TABLES_SQL) {
        Ok(content) => content,
        Err(e) => {
            warn!("Failed to read {}: {}", CREATE_TABLES_SQL, e);
            return Ok(());
        }
    };

    for statement in split_statements(&sql_content) {
        debug!("Running migration statement: {}", statement.lines().next().unwrap_or_default());
        sqlx::raw_sql(&statement).execute(pool).await?;
    }

    Ok(())
}
