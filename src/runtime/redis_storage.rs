use async_trait::async_trait;
use anyhow::Result;
use redis::AsyncCommands;
use crate::model::ActionEntity;
use crate::runtime::storage::ActionStore;

/// Action entities stored as JSON strings under `{prefix}:action:{id}`.
///
/// Property updates use the trait's read-modify-write default, so two writers
/// touching the same action race and the last one wins.
pub struct RedisActionStore {
    client: redis::Client,
    prefix: String,
}

impl RedisActionStore {
    pub fn new(client: redis::Client, prefix: String) -> Self {
        Self { client, prefix }
    }

    fn action_key(&self, id: &str) -> String {
        format!("{}:action:{}", self.prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}:actions", self.prefix)
    }

    pub async fn action_ids(&self) -> Result<Vec<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut ids: Vec<String> = conn.smembers(self.index_key()).await?;
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl ActionStore for RedisActionStore {
    async fn get_action(&self, id: &str) -> Result<Option<ActionEntity>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.action_key(id)).await?;

        if let Some(s) = raw {
            let action: ActionEntity = serde_json::from_str(&s)?;
            Ok(Some(action))
        } else {
            Ok(None)
        }
    }

    async fn put_action(&self, action: ActionEntity) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(&action)?;
        let _: () = redis::pipe()
            .atomic()
            .set(self.action_key(action.id()), serialized)
            .ignore()
            .sadd(self.index_key(), action.id())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete_action(&self, id: &str) -> Result<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (removed, _): (usize, usize) = redis::pipe()
            .atomic()
            .del(self.action_key(id))
            .srem(self.index_key(), id)
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }
}
