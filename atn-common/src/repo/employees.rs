//! SQLite-backed employee lookup

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::EmployeeRepository;
use crate::db::models::Employee;
use crate::Result;

/// Employee repository over the shared SQLite pool
#[derive(Clone)]
pub struct SqlEmployeeRepository {
    pool: SqlitePool,
}

impl SqlEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn find_by_matricule(
        &self,
        tenant_id: &str,
        matricule: &str,
    ) -> Result<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, tenant_id, matricule FROM employees \
             WHERE tenant_id = ? AND matricule = ? LIMIT 1",
        )
        .bind(tenant_id)
        .bind(matricule)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn find_by_matricule_any(
        &self,
        tenant_id: &str,
        candidates: &[String],
    ) -> Result<Option<Employee>> {
        if candidates.is_empty() {
            return Ok(None);
        }

        let placeholders = vec!["?"; candidates.len()].join(", ");
        let sql = format!(
            "SELECT id, tenant_id, matricule FROM employees \
             WHERE tenant_id = ? AND matricule IN ({}) LIMIT 1",
            placeholders
        );

        let mut query = sqlx::query_as::<_, Employee>(&sql).bind(tenant_id);
        for candidate in candidates {
            query = query.bind(candidate);
        }

        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn find_by_numeric_matricule(
        &self,
        tenant_id: &str,
        value: i64,
    ) -> Result<Option<Employee>> {
        // The GLOB filter restricts the CAST to purely-numeric matricules,
        // so "A12" never equals 12 by accident
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, tenant_id, matricule FROM employees \
             WHERE tenant_id = ? \
               AND matricule <> '' \
               AND matricule NOT GLOB '*[^0-9]*' \
               AND CAST(matricule AS INTEGER) = ? \
             LIMIT 1",
        )
        .bind(tenant_id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }
}
