use std::{env, time::Duration};

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "pickup_games";
const PING_ATTEMPTS: u32 = 10;
const FIRST_PING_DELAY: Duration = Duration::from_millis(250);
const MAX_PING_DELAY: Duration = Duration::from_secs(5);

/// Parsed connection settings for the MongoDB roster store.
#[derive(Clone)]
pub struct MongoConfig {
    options: ClientOptions,
    database_name: String,
}

impl MongoConfig {
    /// Parse a connection string; `database` falls back to `pickup_games`.
    pub async fn from_uri(uri: &str, database: Option<&str>) -> MongoResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;

        Ok(Self {
            options,
            database_name: database
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_DATABASE)
                .to_owned(),
        })
    }

    /// Read `MONGO_URI` (required) and `MONGO_DB` (optional).
    pub async fn from_env() -> MongoResult<Self> {
        let uri =
            env::var("MONGO_URI").map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
        let database = env::var("MONGO_DB").ok();
        Self::from_uri(&uri, database.as_deref()).await
    }

    /// Open the database, pinging until the server answers or the attempts run out.
    pub(super) async fn open(&self) -> MongoResult<Database> {
        let client = Client::with_options(self.options.clone())
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database = client.database(&self.database_name);

        let mut delay = FIRST_PING_DELAY;
        let mut attempt = 1;
        loop {
            match database.run_command(doc! { "ping": 1 }).await {
                Ok(_) => return Ok(database),
                Err(source) if attempt >= PING_ATTEMPTS => {
                    return Err(MongoDaoError::InitialPing {
                        attempts: attempt,
                        source,
                    });
                }
                Err(err) => {
                    debug!(attempt, error = %err, "MongoDB ping failed; retrying");
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_PING_DELAY);
                    attempt += 1;
                }
            }
        }
    }
}
