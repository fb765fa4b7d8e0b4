use std::env;

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_DATABASE: &str = "pickup_games";

/// Basic-auth pair sent with every request.
#[derive(Debug, Clone)]
pub struct CouchCredentials {
    pub username: String,
    pub password: String,
}

/// Where the CouchDB roster store lives.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root without trailing slash, e.g. `http://localhost:5984`.
    pub server_url: String,
    pub database: String,
    pub credentials: Option<CouchCredentials>,
}

impl CouchConfig {
    pub fn new(server_url: &str, database: Option<&str>) -> Self {
        Self {
            server_url: server_url.trim_end_matches('/').to_owned(),
            database: database
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_DATABASE)
                .to_owned(),
            credentials: None,
        }
    }

    /// Read `COUCH_BASE_URL` (required), `COUCH_DB` (defaults to `pickup_games`)
    /// and the optional `COUCH_USERNAME` / `COUCH_PASSWORD` pair.
    pub fn from_env() -> CouchResult<Self> {
        let server_url = env::var("COUCH_BASE_URL").map_err(|_| CouchDaoError::MissingEnvVar {
            var: "COUCH_BASE_URL",
        })?;
        let database = env::var("COUCH_DB").ok();

        let mut config = Self::new(&server_url, database.as_deref());
        config.credentials = match (env::var("COUCH_USERNAME"), env::var("COUCH_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(CouchCredentials { username, password }),
            _ => None,
        };

        Ok(config)
    }

    /// URL of the database itself.
    pub fn database_url(&self) -> String {
        format!("{}/{}", self.server_url, self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_defaults_and_trailing_slash() {
        let config = CouchConfig::new("http://couch:5984/", None);
        assert_eq!(config.database_url(), "http://couch:5984/pickup_games");

        let config = CouchConfig::new("http://couch:5984", Some("league"));
        assert_eq!(config.database_url(), "http://couch:5984/league");
    }
}
