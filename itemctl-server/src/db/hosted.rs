//! Hosted backend over PostgREST (the REST surface of hosted Postgres services)
//!
//! Requests go to `<url>/rest/v1/<table>` with row filters in the query
//! string (`id=eq.42`). Writes ask for `Prefer: return=representation` so an
//! empty array means nothing matched.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{DbError, ItemStore};
use crate::models::{Item, ItemId, ItemUpdate, NewItem, TableName, UpdatedItem};

/// Default per-request timeout for the hosted API
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const RETURN_REPRESENTATION: &str = "return=representation";

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct HostedConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Service or anon key, sent as `apikey` and bearer token
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HostedConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// PostgREST error body
#[derive(Deserialize)]
struct RemoteError {
    message: String,
}

/// Item repository over a hosted REST endpoint
#[derive(Clone)]
pub struct HostedItemStore {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HostedItemStore {
    pub fn new(config: &HostedConfig, table: TableName) -> Result<Self, DbError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let endpoint = format!("{}/rest/v1/{}", config.url.trim_end_matches('/'), table);

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let builder = self.client.request(method, &self.endpoint);
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }

    fn id_filter(id: ItemId) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    /// Decode a row array, turning non-2xx statuses into `DbError::Remote`.
    async fn rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, DbError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<RemoteError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(DbError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    async fn first_row<T: DeserializeOwned>(response: Response, id: ItemId) -> Result<T, DbError> {
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::item_not_found(id))
    }
}

#[async_trait]
impl ItemStore for HostedItemStore {
    fn backend(&self) -> &'static str {
        "hosted"
    }

    async fn list_all(&self) -> Result<Vec<Item>, DbError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*")])
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Item, DbError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*")])
            .query(&Self::id_filter(id))
            .send()
            .await?;
        Self::first_row(response, id).await
    }

    async fn insert(&self, item: NewItem) -> Result<Item, DbError> {
        let response = self
            .request(Method::POST)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&item)
            .send()
            .await?;

        Self::rows::<Item>(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Remote {
                status: 200,
                message: "insert returned no rows".to_string(),
            })
    }

    async fn update_by_id(&self, id: ItemId, update: ItemUpdate) -> Result<UpdatedItem, DbError> {
        let response = self
            .request(Method::PATCH)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("select", "id,name,description")])
            .query(&Self::id_filter(id))
            .json(&update)
            .send()
            .await?;
        Self::first_row(response, id).await
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<(), DbError> {
        let response = self
            .request(Method::DELETE)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(&[("select", "id")])
            .query(&Self::id_filter(id))
            .send()
            .await?;
        Self::first_row::<serde_json::Value>(response, id)
            .await
            .map(|_| ())
    }

    async fn ping(&self) -> Result<Duration, DbError> {
        let started = Instant::now();
        let response = self
            .request(Method::GET)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        Self::rows::<serde_json::Value>(response).await?;
        Ok(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Minimal PostgREST stand-in: one table, `id=eq.N` filters only.
    #[derive(Clone, Default)]
    struct FakeRest {
        rows: Arc<Mutex<BTreeMap<ItemId, Value>>>,
        seen_keys: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl FakeRest {
        fn record(&self, headers: &HeaderMap) {
            let key = headers
                .get("apikey")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            self.seen_keys.lock().unwrap().push(key);
        }

        fn filtered(&self, params: &HashMap<String, String>) -> Vec<ItemId> {
            let rows = self.rows.lock().unwrap();
            match params.get("id").and_then(|f| f.strip_prefix("eq.")) {
                Some(id) => id
                    .parse::<ItemId>()
                    .ok()
                    .filter(|id| rows.contains_key(id))
                    .into_iter()
                    .collect(),
                None => rows.keys().copied().collect(),
            }
        }
    }

    async fn select(
        State(fake): State<FakeRest>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Vec<Value>> {
        fake.record(&headers);
        let ids = fake.filtered(&params);
        let rows = fake.rows.lock().unwrap();
        Json(ids.iter().map(|id| rows[id].clone()).collect())
    }

    async fn insert(
        State(fake): State<FakeRest>,
        headers: HeaderMap,
        Json(mut body): Json<Value>,
    ) -> (StatusCode, Json<Vec<Value>>) {
        fake.record(&headers);
        assert_eq!(headers["prefer"], RETURN_REPRESENTATION);
        let mut rows = fake.rows.lock().unwrap();
        let id = rows.keys().last().copied().unwrap_or(0) + 1;
        body["id"] = json!(id);
        rows.insert(id, body.clone());
        (StatusCode::CREATED, Json(vec![body]))
    }

    async fn patch(
        State(fake): State<FakeRest>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
        Json(body): Json<Value>,
    ) -> Json<Vec<Value>> {
        fake.record(&headers);
        let ids = fake.filtered(&params);
        let mut rows = fake.rows.lock().unwrap();
        let mut out = Vec::new();
        for id in ids {
            let row = rows.get_mut(&id).unwrap();
            row["name"] = body["name"].clone();
            row["description"] = body["description"].clone();
            out.push(json!({ "id": id, "name": row["name"], "description": row["description"] }));
        }
        Json(out)
    }

    async fn remove(
        State(fake): State<FakeRest>,
        headers: HeaderMap,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Vec<Value>> {
        fake.record(&headers);
        let ids = fake.filtered(&params);
        let mut rows = fake.rows.lock().unwrap();
        Json(
            ids.into_iter()
                .filter_map(|id| rows.remove(&id).map(|_| json!({ "id": id })))
                .collect(),
        )
    }

    async fn broken() -> (StatusCode, Json<Value>) {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "code": "PGRST000", "message": "could not connect to server" })),
        )
    }

    async fn spawn_fake(fake: FakeRest) -> String {
        let app = Router::new()
            .route(
                "/rest/v1/items",
                get(select).post(insert).patch(patch).delete(remove),
            )
            .route("/rest/v1/broken", get(broken))
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn store(url: &str, table: &str) -> HostedItemStore {
        let config = HostedConfig {
            api_key: Some("test-key".into()),
            ..HostedConfig::new(url)
        };
        HostedItemStore::new(&config, TableName::new(table).unwrap()).unwrap()
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let store = store("https://example.supabase.co/", "android");
        assert_eq!(store.endpoint(), "https://example.supabase.co/rest/v1/android");
    }

    #[tokio::test]
    async fn crud_through_rest() {
        let fake = FakeRest::default();
        let url = spawn_fake(fake.clone()).await;
        let store = store(&url, "items");

        let created = store
            .insert(NewItem {
                location: Some(json!("L")),
                sms: Some(json!("S")),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.location, Some(json!("L")));

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.sms, Some(json!("S")));

        let updated = store
            .update_by_id(
                created.id,
                ItemUpdate {
                    name: Some("N".into()),
                    description: Some("D".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("D"));

        assert_eq!(store.list_all().await.unwrap().len(), 1);

        store.delete_by_id(created.id).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());

        let keys = fake.seen_keys.lock().unwrap();
        assert!(keys.iter().all(|k| k.as_deref() == Some("test-key")));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let url = spawn_fake(FakeRest::default()).await;
        let store = store(&url, "items");

        assert!(store.get_by_id(42).await.unwrap_err().is_not_found());
        assert!(store.delete_by_id(42).await.unwrap_err().is_not_found());
        assert!(store
            .update_by_id(42, ItemUpdate::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn remote_errors_carry_message() {
        let url = spawn_fake(FakeRest::default()).await;
        let store = store(&url, "broken");

        match store.ping().await.unwrap_err() {
            DbError::Remote { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "could not connect to server");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn ping_succeeds_against_live_table() {
        let url = spawn_fake(FakeRest::default()).await;
        assert!(store(&url, "items").ping().await.is_ok());
    }
}
