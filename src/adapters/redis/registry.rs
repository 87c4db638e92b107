//! Redis implementation of the agent registry.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::models::{AgentDefinition, DuplicatePolicy};
use crate::domain::ports::AgentRegistry;

/// Reject-mode registration: conditional write plus index append as one
/// server-side unit, so a dropped future or connection loss cannot commit
/// the data key without its index entry. Returns 1 when the name was new.
const REGISTER_REJECT_SCRIPT: &str = r"
if redis.call('SET', KEYS[1], ARGV[1], 'NX') then
    redis.call('RPUSH', KEYS[2], ARGV[2])
    return 1
end
return 0
";

/// Replace-mode registration: unconditional write, index appended only on
/// first registration. Returns 1 when the name was new.
const REGISTER_REPLACE_SCRIPT: &str = r"
local existed = redis.call('EXISTS', KEYS[1])
redis.call('SET', KEYS[1], ARGV[1])
if existed == 0 then
    redis.call('RPUSH', KEYS[2], ARGV[2])
end
return 1 - existed
";

/// Registry over Redis string keys plus an insertion-order index list.
///
/// `register` runs as a single Lua script, so the check, the data write,
/// and the index append commit together server-side: a register race has
/// exactly one winner and no partial state is ever visible.
#[derive(Clone)]
pub struct RedisRegistry {
    conn: ConnectionManager,
    prefix: String,
    policy: DuplicatePolicy,
}

impl RedisRegistry {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, policy: DuplicatePolicy) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
            policy,
        }
    }

    fn agent_key(&self, name: &str) -> String {
        format!("{}agent:{}", self.prefix, name)
    }

    fn index_key(&self) -> String {
        format!("{}agents:index", self.prefix)
    }
}

#[async_trait]
impl AgentRegistry for RedisRegistry {
    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let mut conn = self.conn.clone();
        let found: bool = conn.exists(self.agent_key(name)).await?;
        Ok(found)
    }

    async fn register(&self, agent: &AgentDefinition) -> StorageResult<()> {
        agent.validate().map_err(StorageError::Validation)?;

        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(agent)?;
        let script = match self.policy {
            DuplicatePolicy::Reject => Script::new(REGISTER_REJECT_SCRIPT),
            DuplicatePolicy::Replace => Script::new(REGISTER_REPLACE_SCRIPT),
        };

        let created: i64 = script
            .key(self.agent_key(&agent.name))
            .key(self.index_key())
            .arg(&payload)
            .arg(&agent.name)
            .invoke_async(&mut conn)
            .await?;

        if self.policy == DuplicatePolicy::Reject && created == 0 {
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
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.agent_key(name)).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(StorageError::from))
            .transpose()
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let names: Vec<String> = conn.lrange(self.index_key(), 0, -1).await?;
        Ok(names)
    }
}
