//! SQLite executor — runs the bound query template via sqlx.
//!
//! Column values map to JSON by SQLite storage class (INTEGER/REAL/TEXT);
//! BLOB columns surface as null, the dashboard never renders them.

use async_trait::async_trait;
use inspectql_core::{EngineError, EngineExecutor, EngineRequest, Row};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as SqlxRow, SqlitePool, TypeInfo};

/// A relational backend over a SQLite pool.
pub struct SqliteExecutor {
    name: String,
    pool: SqlitePool,
}

impl SqliteExecutor {
    pub fn new(name: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            name: name.into(),
            pool,
        }
    }

    /// Build with a lazily-connected pool; the first query opens the
    /// database.
    pub fn connect_lazy(
        name: impl Into<String>,
        database_url: &str,
    ) -> Result<Self, EngineError> {
        let pool = SqlitePool::connect_lazy(database_url)
            .map_err(|e| EngineError::NotConfigured(e.to_string()))?;
        Ok(Self::new(name, pool))
    }
}

#[async_trait]
impl EngineExecutor for SqliteExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, request: EngineRequest) -> Result<Vec<Row>, EngineError> {
        let rows = sqlx::query(&request.query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngineError::Response {
                status_code: 0,
                message: e.to_string(),
            })?;
        Ok(rows.iter().map(json_row).collect())
    }

    async fn health_check(&self) -> Result<bool, EngineError> {
        Ok(sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok())
    }
}

fn json_row(row: &SqliteRow) -> Row {
    let mut out = Row::new();
    for column in row.columns() {
        let name = column.name();
        let value = match column.type_info().name() {
            "INTEGER" => row
                .try_get::<Option<i64>, _>(name)
                .ok()
                .flatten()
                .map(serde_json::Value::from),
            "REAL" => row
                .try_get::<Option<f64>, _>(name)
                .ok()
                .flatten()
                .map(serde_json::Value::from),
            "TEXT" => row
                .try_get::<Option<String>, _>(name)
                .ok()
                .flatten()
                .map(serde_json::Value::from),
            _ => None,
        };
        out.insert(name.to_string(), value.unwrap_or(serde_json::Value::Null));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inspectql_core::EntitySet;
    use serde_json::json;

    fn request(query: &str) -> EngineRequest {
        EngineRequest {
            query: query.into(),
            intent: None,
            entities: EntitySet::new(),
            session_id: "s".into(),
            timestamp: Utc::now(),
        }
    }

    async fn seeded_executor() -> SqliteExecutor {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            "CREATE TABLE inventory (material TEXT, factory TEXT, status TEXT, quantity INTEGER)",
        )
        .execute(&pool)
        .await
        .unwrap();
        for (material, factory, status, quantity) in [
            ("M-1001", "深圳", "正常", 120),
            ("M-1002", "深圳", "风险", 30),
            ("M-1003", "东莞", "冻结", 45),
        ] {
            sqlx::query("INSERT INTO inventory VALUES (?, ?, ?, ?)")
                .bind(material)
                .bind(factory)
                .bind(status)
                .bind(quantity)
                .execute(&pool)
                .await
                .unwrap();
        }
        SqliteExecutor::new("sqlite_test", pool)
    }

    #[tokio::test]
    async fn rows_map_to_json_by_storage_class() {
        let exec = seeded_executor().await;
        let rows = exec
            .execute(request("SELECT * FROM inventory ORDER BY material"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["material"], json!("M-1001"));
        assert_eq!(rows[0]["quantity"], json!(120));
        assert_eq!(rows[1]["status"], json!("风险"));
    }

    #[tokio::test]
    async fn bad_sql_is_a_response_error() {
        let exec = seeded_executor().await;
        let err = exec
            .execute(request("SELECT * FROM missing_table"))
            .await
            .unwrap_err();
        match err {
            EngineError::Response { .. } => {}
            other => panic!("expected Response, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn health_check_reports_reachability() {
        let exec = seeded_executor().await;
        assert!(exec.health_check().await.unwrap());
    }
}
