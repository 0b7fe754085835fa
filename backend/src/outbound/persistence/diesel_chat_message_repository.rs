//! PostgreSQL-backed `ChatMessageRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ChatMessage;
use crate::domain::ports::{ChatMessageRepository, ChatMessageRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ChatMessageRow, NewChatMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::chat_messages;

#[derive(Clone)]
pub struct DieselChatMessageRepository {
    pool: DbPool,
}

impl DieselChatMessageRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ChatMessageRepositoryError {
    map_pool_error(error, ChatMessageRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ChatMessageRepositoryError {
    map_diesel_error(
        error,
        ChatMessageRepositoryError::query,
        ChatMessageRepositoryError::connection,
    )
}

#[async_trait]
impl ChatMessageRepository for DieselChatMessageRepository {
    async fn list_for_task(
        &self,
        task_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, ChatMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<ChatMessageRow> = chat_messages::table
            .filter(chat_messages::task_id.eq(task_id))
            .order((chat_messages::created_at.asc(), chat_messages::id.asc()))
            .select(ChatMessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter()
            .map(|row| ChatMessage::try_from(row).map_err(ChatMessageRepositoryError::query))
            .collect()
    }

    async fn append(&self, message: &ChatMessage) -> Result<(), ChatMessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(chat_messages::table)
            .values(NewChatMessageRow::from(message))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}
