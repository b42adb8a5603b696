//! PostgREST-backed row store.
//!
//! | Operation | Request                                                     |
//! |-----------|-------------------------------------------------------------|
//! | select    | `GET    /rest/v1/<table>?select=*&<col>=<op>.<value>`       |
//! | insert    | `POST   /rest/v1/<table>` + `Prefer: return=representation` |
//! | update    | `PATCH  /rest/v1/<table>?<col>=<op>.<value>` + same header  |
//! | delete    | `DELETE /rest/v1/<table>?<col>=<op>.<value>` + same header  |
//!
//! Every request carries the service key both as `apikey` and as a bearer
//! token. Requests are blocking and sent one at a time.

use std::time::Duration;

use enlighter_core::Credentials;

use crate::error::StoreError;
use crate::filter::{Filter, Row};
use crate::RowStore;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the backend's REST endpoint.
pub struct RestStore {
    agent: ureq::Agent,
    base_url: String,
    key: String,
}

impl RestStore {
    pub fn new(credentials: &Credentials) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(TIMEOUT).build();
        Self {
            agent,
            base_url: rest_base_url(&credentials.url),
            key: credentials.key.clone(),
        }
    }

    fn request(&self, method: &str, table: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{}/{}", self.base_url, table))
            .set("apikey", &self.key)
            .set("Authorization", &format!("Bearer {}", self.key))
            .set("Accept", "application/json")
    }

    fn filtered(&self, method: &str, table: &str, filter: &Filter) -> ureq::Request {
        self.request(method, table)
            .query(filter.column(), &filter.query_value())
    }
}

impl RowStore for RestStore {
    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        tracing::debug!("GET {table} {}={}", filter.column(), filter.query_value());
        let response = self
            .filtered("GET", table, filter)
            .query("select", "*")
            .call()
            .map_err(|e| map_err("GET", table, e))?;
        read_rows(table, response)
    }

    fn insert(&self, table: &str, row: &Row) -> Result<Row, StoreError> {
        tracing::debug!("POST {table}");
        let response = self
            .request("POST", table)
            .set("Prefer", "return=representation")
            .send_json(row)
            .map_err(|e| map_err("POST", table, e))?;
        read_rows(table, response)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyInsert {
                table: table.to_string(),
            })
    }

    fn update(&self, table: &str, filter: &Filter, patch: &Row) -> Result<Vec<Row>, StoreError> {
        tracing::debug!("PATCH {table} {}={}", filter.column(), filter.query_value());
        let response = self
            .filtered("PATCH", table, filter)
            .set("Prefer", "return=representation")
            .send_json(patch)
            .map_err(|e| map_err("PATCH", table, e))?;
        read_rows(table, response)
    }

    fn delete(&self, table: &str, filter: &Filter) -> Result<usize, StoreError> {
        tracing::debug!("DELETE {table} {}={}", filter.column(), filter.query_value());
        let response = self
            .filtered("DELETE", table, filter)
            .set("Prefer", "return=representation")
            .call()
            .map_err(|e| map_err("DELETE", table, e))?;
        Ok(read_rows(table, response)?.len())
    }
}

/// `https://x.supabase.co/` -> `https://x.supabase.co/rest/v1`
fn rest_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/rest/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/rest/v1")
    }
}

fn read_rows(table: &str, response: ureq::Response) -> Result<Vec<Row>, StoreError> {
    response
        .into_json::<Vec<Row>>()
        .map_err(|source| StoreError::Decode {
            table: table.to_string(),
            source,
        })
}

fn map_err(method: &'static str, table: &str, err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(status, response) => StoreError::Http {
            method,
            table: table.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(transport) => StoreError::Transport {
            method,
            table: table.to_string(),
            message: transport.to_string(),
        },
    }
}
