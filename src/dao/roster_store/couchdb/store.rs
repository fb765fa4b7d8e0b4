use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::warn;
use uuid::Uuid;

use crate::dao::{
    models::{GameEntity, JoinEntity},
    roster_store::RosterStore,
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchGameDocument, CouchJoinDocument, END_SUFFIX, GAME_PREFIX,
        game_doc_id, join_doc_id, roster_prefix,
    },
};

/// [`RosterStore`] talking to CouchDB over its HTTP API. Games and joins
/// live in one database, separated by document id prefixes.
#[derive(Clone)]
pub struct CouchRosterStore {
    client: Client,
    config: Arc<CouchConfig>,
}

impl CouchRosterStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            config: Arc::new(config),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.credentials {
            Some(ref credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.config.database_url(), path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.config.database.clone();
        let url = self.config.database_url();

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::Transport {
                        path: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::UnexpectedStatus {
                        path: database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::UnexpectedStatus {
                path: database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::Decode {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::UnexpectedStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::UnexpectedStatus {
                path: doc_id.to_string(),
                status: response.status(),
            })
        }
    }

    async fn delete_document(&self, doc_id: &str, rev: Option<String>) -> CouchResult<()> {
        let rev = rev.ok_or_else(|| CouchDaoError::MissingRevision {
            doc_id: doc_id.to_string(),
        })?;

        let response = self
            .request(Method::DELETE, doc_id)
            .query(&[("rev", rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            // Already gone counts as deleted.
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            other => Err(CouchDaoError::UnexpectedStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::UnexpectedStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::Decode {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed = from_value(doc).map_err(|source| CouchDaoError::Document {
                    path: ALL_DOCS.to_string(),
                    source,
                })?;
                documents.push(parsed);
            }
        }

        Ok(documents)
    }

    async fn roster_documents(&self, game_id: Uuid) -> CouchResult<Vec<CouchJoinDocument>> {
        let mut documents = self
            .list_documents::<CouchJoinDocument>(&roster_prefix(game_id))
            .await?;
        documents.sort_by_key(|doc| doc.join.joined_at);
        Ok(documents)
    }

    async fn save_game(&self, game: GameEntity) -> CouchResult<()> {
        let doc_id = game_doc_id(game.id);
        let rev = self
            .get_document::<CouchGameDocument>(&doc_id)
            .await?
            .and_then(|existing| existing.rev);
        let doc = CouchGameDocument::from((game, rev));
        self.put_document(&doc_id, &doc).await
    }

    async fn find_game(&self, id: Uuid) -> CouchResult<Option<GameEntity>> {
        self.get_document::<CouchGameDocument>(&game_doc_id(id))
            .await?
            .map(TryInto::try_into)
            .transpose()
    }

    async fn list_games(&self) -> CouchResult<Vec<GameEntity>> {
        let mut games = self
            .list_documents::<CouchGameDocument>(GAME_PREFIX)
            .await?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<CouchResult<Vec<GameEntity>>>()?;
        games.sort_by_key(|game| game.scheduled_at);
        Ok(games)
    }

    async fn delete_game(&self, id: Uuid) -> CouchResult<bool> {
        let doc_id = game_doc_id(id);
        let existing = self.get_document::<CouchGameDocument>(&doc_id).await?;
        if let Some(ref game) = existing {
            self.delete_document(&doc_id, game.rev.clone()).await?;
        }

        // Joins without a game document are unreachable; sweep them best effort.
        match self.roster_documents(id).await {
            Ok(roster) => {
                for join in roster {
                    if let Err(err) = self.delete_document(&join.id, join.rev).await {
                        warn!(game_id = %id, error = %err, "failed to delete join of deleted game");
                    }
                }
            }
            Err(err) => warn!(game_id = %id, error = %err, "failed to list roster of deleted game"),
        }

        Ok(existing.is_some())
    }

    async fn list_joins(&self, game_id: Uuid) -> CouchResult<Vec<JoinEntity>> {
        Ok(self
            .roster_documents(game_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn insert_join(&self, join: JoinEntity) -> CouchResult<()> {
        let doc = CouchJoinDocument::from((join, None));
        self.put_document(&doc.id, &doc).await
    }

    async fn update_join_skill(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        skill_level: Option<u8>,
    ) -> CouchResult<bool> {
        let doc_id = join_doc_id(game_id, player_id);
        let Some(mut doc) = self.get_document::<CouchJoinDocument>(&doc_id).await? else {
            return Ok(false);
        };
        doc.join.skill_level = skill_level;
        self.put_document(&doc_id, &doc).await?;
        Ok(true)
    }

    async fn delete_join(&self, game_id: Uuid, player_id: Uuid) -> CouchResult<bool> {
        let doc_id = join_doc_id(game_id, player_id);
        let Some(doc) = self.get_document::<CouchJoinDocument>(&doc_id).await? else {
            return Ok(false);
        };
        self.delete_document(&doc_id, doc.rev).await?;
        Ok(true)
    }

    async fn health_check(&self) -> CouchResult<()> {
        let url = self.config.database_url();
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: url.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::UnexpectedStatus {
                path: url,
                status: response.status(),
            })
        }
    }
}

impl RosterStore for CouchRosterStore {
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
        Box::pin(async move {
            let roster = store.roster_documents(game_id).await?;
            Ok(roster.len())
        })
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
            let joins = store.list_joins(game_id).await?;
            Ok(joins
                .into_iter()
                .find(|join| join.player.phone.as_deref() == Some(phone.as_str())))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.health_check().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
