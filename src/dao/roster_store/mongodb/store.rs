use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{MongoGameDocument, MongoJoinDocument, game_filter, join_filter, roster_filter},
};
use crate::dao::{
    models::{GameEntity, JoinEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const JOIN_COLLECTION_NAME: &str = "joins";

/// [`RosterStore`] backed by two MongoDB collections: `games` and `joins`.
#[derive(Clone)]
pub struct MongoRosterStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: RwLock<Database>,
    config: MongoConfig,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = self.database.read().await.clone();
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database = self.config.open().await?;
        *self.database.write().await = database;
        Ok(())
    }
}

impl MongoRosterStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = config.open().await?;
        let store = Self {
            inner: Arc::new(MongoInner {
                database: RwLock::new(database),
                config,
            }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let games = self.games().await;
        let schedule_index = IndexModel::builder()
            .keys(doc! {"scheduled_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_schedule_idx".to_owned()))
                    .build(),
            )
            .build();
        games
            .create_index(schedule_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "scheduled_at",
                source,
            })?;

        let joins = self.joins().await;
        let roster_index = IndexModel::builder()
            .keys(doc! {"game_id": 1, "joined_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("join_roster_idx".to_owned()))
                    .build(),
            )
            .build();
        joins
            .create_index(roster_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: JOIN_COLLECTION_NAME,
                index: "game_id,joined_at",
                source,
            })?;

        // One join per contact per game; anonymous joins are left out of the index.
        let contact_index = IndexModel::builder()
            .keys(doc! {"game_id": 1, "player_phone": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("join_contact_idx".to_owned()))
                    .unique(Some(true))
                    .partial_filter_expression(Some(doc! {"player_phone": {"$type": "string"}}))
                    .build(),
            )
            .build();
        joins
            .create_index(contact_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: JOIN_COLLECTION_NAME,
                index: "game_id,player_phone",
                source,
            })?;

        Ok(())
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.inner
            .database
            .read()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn joins(&self) -> Collection<MongoJoinDocument> {
        self.inner
            .database
            .read()
            .await
            .collection::<MongoJoinDocument>(JOIN_COLLECTION_NAME)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.games()
            .await
            .replace_one(game_filter(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(game_filter(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        document.map(TryInto::try_into).transpose()
    }

    async fn list_games(&self) -> MongoResult<Vec<GameEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(doc! {})
            .sort(doc! {"scheduled_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .games()
            .await
            .delete_one(game_filter(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;

        // The game record is gone at this point; joins left behind are never
        // reachable and get swept by a later delete of the same id.
        if let Err(source) = self.joins().await.delete_many(roster_filter(id)).await {
            warn!(game_id = %id, error = %source, "failed to delete roster of deleted game");
        }

        Ok(result.deleted_count > 0)
    }

    async fn list_joins(&self, game_id: Uuid) -> MongoResult<Vec<JoinEntity>> {
        let documents: Vec<MongoJoinDocument> = self
            .joins()
            .await
            .find(roster_filter(game_id))
            .sort(doc! {"joined_at": 1})
            .await
            .map_err(|source| MongoDaoError::LoadRoster { game_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadRoster { game_id, source })?;

        documents.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_joins(&self, game_id: Uuid) -> MongoResult<usize> {
        let count = self
            .joins()
            .await
            .count_documents(roster_filter(game_id))
            .await
            .map_err(|source| MongoDaoError::LoadRoster { game_id, source })?;
        Ok(count as usize)
    }

    async fn insert_join(&self, join: JoinEntity) -> MongoResult<()> {
        let game_id = join.game_id;
        let player_id = join.player.id;
        let document: MongoJoinDocument = join.into();
        self.joins()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveJoin {
                game_id,
                player_id,
                source,
            })?;
        Ok(())
    }

    async fn update_join_skill(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        skill_level: Option<u8>,
    ) -> MongoResult<bool> {
        let result = self
            .joins()
            .await
            .update_one(
                join_filter(game_id, player_id),
                doc! {"$set": {"skill_level": skill_level.map(i32::from)}},
            )
            .await
            .map_err(|source| MongoDaoError::SaveJoin {
                game_id,
                player_id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_join(&self, game_id: Uuid, player_id: Uuid) -> MongoResult<bool> {
        let result = self
            .joins()
            .await
            .delete_one(join_filter(game_id, player_id))
            .await
            .map_err(|source| MongoDaoError::DeleteJoin {
                game_id,
                player_id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn find_join_by_contact(
        &self,
        game_id: Uuid,
        phone: String,
    ) -> MongoResult<Option<JoinEntity>> {
        let document = self
            .joins()
            .await
            .find_one(doc! {"game_id": game_id.to_string(), "player_phone": phone})
            .await
            .map_err(|source| MongoDaoError::LoadRoster { game_id, source })?;

        document.map(TryInto::try_into).transpose()
    }
}

impl RosterStore for MongoRosterStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn list_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<JoinEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_joins(game_id).await.map_err(Into::into) })
    }

    fn count_joins(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<usize>> {
        let store = self.clone();
        Box::pin(async move { store.count_joins(game_id).await.map_err(Into::into) })
    }

    fn insert_join(&self, join: JoinEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_join(join).await.map_err(Into::into) })
    }

    fn update_join_skill(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        skill_level: Option<u8>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_join_skill(game_id, player_id, skill_level)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_join(
        &self,
        game_id: Uuid,
        player_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_join(game_id, player_id)
                .await
                .map_err(Into::into)
        })
    }

    fn find_join_by_contact(
        &self,
        game_id: Uuid,
        phone: String,
    ) -> BoxFuture<'static, StorageResult<Option<JoinEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_join_by_contact(game_id, phone)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
