//! SQLite implementation of the agent registry.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{AgentDefinition, DuplicatePolicy, HookSpec, ToolSpec};
use crate::domain::ports::AgentRegistry;

use super::parse_datetime;

/// Registry over a relational table with a unique name constraint.
///
/// Atomicity of `register` rests on the primary key: reject mode uses
/// `ON CONFLICT DO NOTHING` and inspects the affected row count, replace
/// mode uses `ON CONFLICT DO UPDATE`. Either way the check and the write
/// are one statement, so concurrent registrations cannot interleave.
#[derive(Clone)]
pub struct SqliteRegistry {
    pool: SqlitePool,
    policy: DuplicatePolicy,
}

impl SqliteRegistry {
    pub fn new(pool: SqlitePool, policy: DuplicatePolicy) -> Self {
        Self { pool, policy }
    }
}

#[async_trait]
impl AgentRegistry for SqliteRegistry {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn register(&self, agent: &AgentDefinition) -> StorageResult<()> {
        agent.validate().map_err(StorageError::Validation)?;

        let tools_json = serde_json::to_string(&agent.tools)?;
        let hooks_json = serde_json::to_string(&agent.hooks)?;
        let created_at = agent.created_at.to_rfc3339();

        let sql = match self.policy {
            DuplicatePolicy::Reject => {
                r#"INSERT INTO agents (name, instructions, model, tools, hooks, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)
                   ON CONFLICT(name) DO NOTHING"#
            }
            DuplicatePolicy::Replace => {
                r#"INSERT INTO agents (name, instructions, model, tools, hooks, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)
                   ON CONFLICT(name) DO UPDATE SET
                       instructions = excluded.instructions,
                       model = excluded.model,
                       tools = excluded.tools,
                       hooks = excluded.hooks,
                       created_at = excluded.created_at"#
            }
        };

        let result = sqlx::query(sql)
            .bind(&agent.name)
            .bind(&agent.instructions)
            .bind(&agent.model)
            .bind(&tools_json)
            .bind(&hooks_json)
            .bind(&created_at)
            .execute(&self.pool)
            .await?;

        if self.policy == DuplicatePolicy::Reject && result.rows_affected() == 0 {
            return Err(StorageError::AgentExists(agent.name.clone()));
        }

        tracing::debug!(agent = %agent.name, "registered agent");
        Ok(())
    }

    async fn get(&self, name: &str) -> StorageResult<AgentDefinition> {
        self.get_optional(name)
            .await?
            .ok_or_else(|| StorageError::AgentNotFound(name.to_string()))
    }

    async fn get_optional(&self, name: &str) -> StorageResult<Option<AgentDefinition>> {
        let row: Option<AgentRow> = sqlx::query_as(
            "SELECT name, instructions, model, tools, hooks, created_at FROM agents WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AgentDefinition::try_from).transpose()
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        // rowid order matches insertion order for this table
        let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM agents ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(n,)| n).collect())
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    name: String,
    instructions: String,
    model: String,
    tools: Option<String>,
    hooks: Option<String>,
    created_at: String,
}

impl TryFrom<AgentRow> for AgentDefinition {
    type Error = StorageError;

    fn try_from(row: AgentRow) -> Result<Self, Self::Error> {
        let tools: Vec<ToolSpec> = row
            .tools
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?
            .unwrap_or_default();
        let hooks: Vec<HookSpec> = row
            .hooks
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?
            .unwrap_or_default();

        Ok(AgentDefinition {
            name: row.name,
            instructions: row.instructions,
            model: row.model,
            tools,
            hooks,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}
