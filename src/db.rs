use sqlx::{postgres::PgPoolOptions, PgPool};

/// Statements run on startup. Each one is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS credit_reports (
        id UUID PRIMARY KEY,
        raw_file_name TEXT,
        raw_xml TEXT,
        raw_sha256 TEXT NOT NULL,
        report_number TEXT,
        pan TEXT,
        first_name TEXT,
        last_name TEXT,
        report JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS credit_reports_pan_idx ON credit_reports (pan)",
    "CREATE INDEX IF NOT EXISTS credit_reports_report_number_idx ON credit_reports (report_number)",
];

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        ensure_schema(&pool).await?;

        Ok(Self { pool })
    }
}

/// Create the report table and its lookup indexes if they are missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("Database schema verified");
    Ok(())
}
