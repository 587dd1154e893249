//! A backend that stores transactions in a Supabase table via its PostgREST API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    backend::TransactionBackend,
    config::BackendConfig,
    timezone::UTC_TIMEZONE,
    transaction::{Transaction, TransactionId, TransactionType, date::parse_date_or_now},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the `rest/v1/{table}` endpoint of a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    client: Client,
    table_url: String,
    api_key: String,
}

impl SupabaseBackend {
    /// Create a client for the project and table in `config`.
    ///
    /// # Errors
    /// Returns [Error::Backend] if the HTTP client could not be created.
    pub fn new(config: &BackendConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| {
                tracing::error!("Could not create the HTTP client: {error}");
                Error::Backend(error.to_string())
            })?;

        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{}", config.url, config.table),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await.map_err(|error| {
            tracing::error!("Could not reach Supabase: {error}");
            Error::Backend(format!("could not reach the backend: {error}"))
        })?;

        check_status(response).await
    }
}

/// The error body PostgREST returns with 4xx and 5xx responses.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
}

async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<PostgrestError>(&body) {
        Ok(error) => error.message,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => body,
    };

    tracing::error!("Supabase responded with {status}: {message}");

    Err(Error::Backend(message))
}

/// Shown in place of a blank description so every transaction has one.
const MISSING_DESCRIPTION: &str = "(no description)";

/// A row as stored in the table.
///
/// Rows may have been written by other clients, so everything but the ID and
/// type is read leniently.
#[derive(Debug, Deserialize)]
struct TransactionRow {
    id: String,
    #[serde(rename = "type")]
    type_: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl TransactionRow {
    /// Convert the row into a transaction, or `None` if the row has no usable ID or type.
    fn into_transaction(self, now: OffsetDateTime) -> Option<Transaction> {
        let id = match self.id.parse::<TransactionId>() {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!("Skipping row with invalid ID \"{}\": {error}", self.id);
                return None;
            }
        };

        let type_ = match self.type_.parse::<TransactionType>() {
            Ok(type_) => type_,
            Err(error) => {
                tracing::warn!("Skipping row {id}: {error}");
                return None;
            }
        };

        let amount = match self.amount {
            Some(amount) if amount < 0.0 => {
                tracing::warn!("Row {id} has the negative amount {amount}, using {}", -amount);
                -amount
            }
            Some(amount) => amount,
            None => {
                tracing::warn!("Row {id} has no amount, using 0");
                0.0
            }
        };

        let description = match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => description.to_owned(),
            _ => {
                tracing::warn!("Row {id} has no description, using \"{MISSING_DESCRIPTION}\"");
                MISSING_DESCRIPTION.to_owned()
            }
        };

        // Rows written by this app carry an offset, older rows are read as UTC.
        let date = parse_date_or_now(
            self.date.as_deref().unwrap_or_default(),
            UTC_TIMEZONE,
            now,
        );

        let category = self
            .category
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty());

        Some(Transaction {
            id,
            type_,
            description,
            amount,
            date,
            category,
        })
    }
}

impl TransactionBackend for SupabaseBackend {
    async fn query_transactions(&self) -> Result<Vec<Transaction>, Error> {
        tracing::debug!("Fetching transactions from {}", self.table_url);

        let response = self
            .send(self.request(Method::GET).query(&[("select", "*")]))
            .await?;

        let rows: Vec<TransactionRow> = response.json().await.map_err(|error| {
            tracing::error!("Could not parse the transactions from Supabase: {error}");
            Error::Backend(format!("unexpected response from the backend: {error}"))
        })?;

        let now = OffsetDateTime::now_utc();

        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_transaction(now))
            .collect())
    }

    async fn persist_transaction(&self, transaction: &Transaction) -> Result<(), Error> {
        tracing::debug!("Saving transaction {} to Supabase", transaction.id);

        self.send(
            self.request(Method::POST)
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&[transaction]),
        )
        .await?;

        Ok(())
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        tracing::debug!("Deleting transaction {id} from Supabase");

        self.send(
            self.request(Method::DELETE)
                .query(&[("id", format!("eq.{id}"))]),
        )
        .await?;

        Ok(())
    }

    async fn check_connection(&self) -> Result<(), Error> {
        tracing::debug!("Checking the connection to {}", self.table_url);

        self.send(
            self.request(Method::GET)
                .query(&[("select", "id"), ("limit", "1")]),
        )
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{RawQuery, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::{Value, json};
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        backend::{SupabaseBackend, TransactionBackend},
        config::BackendConfig,
        transaction::{SequentialIdGenerator, Transaction, TransactionType},
    };

    const API_KEY: &str = "test-key";

    /// The parts of a request the fake PostgREST server saw.
    #[derive(Debug, Clone)]
    struct RecordedRequest {
        method: &'static str,
        query: Option<String>,
        prefer: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    struct FakePostgrest {
        rows: Arc<Mutex<Vec<Value>>>,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl FakePostgrest {
        fn with_rows(rows: Vec<Value>) -> Self {
            Self {
                rows: Arc::new(Mutex::new(rows)),
                requests: Arc::default(),
            }
        }

        fn record(&self, method: &'static str, query: Option<String>, headers: &HeaderMap) {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                query,
                prefer: headers
                    .get("prefer")
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned),
            });
        }

        fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn authorized(headers: &HeaderMap) -> Result<(), Response> {
        let api_key = headers.get("apikey").and_then(|value| value.to_str().ok());
        let bearer = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok());

        let expected_bearer = format!("Bearer {API_KEY}");

        if api_key == Some(API_KEY) && bearer == Some(expected_bearer.as_str()) {
            Ok(())
        } else {
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid API key" })),
            )
                .into_response())
        }
    }

    async fn select(
        State(fake): State<FakePostgrest>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> Response {
        fake.record("GET", query, &headers);

        if let Err(response) = authorized(&headers) {
            return response;
        }

        Json(fake.rows.lock().unwrap().clone()).into_response()
    }

    async fn upsert(
        State(fake): State<FakePostgrest>,
        headers: HeaderMap,
        Json(body): Json<Vec<Value>>,
    ) -> Response {
        fake.record("POST", None, &headers);

        if let Err(response) = authorized(&headers) {
            return response;
        }

        let mut rows = fake.rows.lock().unwrap();

        for row in body {
            match rows.iter().position(|stored| stored["id"] == row["id"]) {
                Some(index) => rows[index] = row,
                None => rows.push(row),
            }
        }

        StatusCode::CREATED.into_response()
    }

    async fn remove(
        State(fake): State<FakePostgrest>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> Response {
        fake.record("DELETE", query.clone(), &headers);

        if let Err(response) = authorized(&headers) {
            return response;
        }

        let id = query
            .as_deref()
            .and_then(|query| query.strip_prefix("id=eq."))
            .unwrap_or_default()
            .to_owned();

        fake.rows
            .lock()
            .unwrap()
            .retain(|row| row["id"].as_str() != Some(id.as_str()));

        StatusCode::NO_CONTENT.into_response()
    }

    async fn spawn_fake(fake: FakePostgrest) -> String {
        let app = Router::new()
            .route(
                "/rest/v1/transactions",
                get(select).post(upsert).delete(remove),
            )
            .with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        format!("http://{address}")
    }

    fn backend_for(url: String, api_key: &str) -> SupabaseBackend {
        SupabaseBackend::new(&BackendConfig {
            url,
            api_key: api_key.to_owned(),
            table: "transactions".to_owned(),
        })
        .unwrap()
    }

    fn salary() -> Transaction {
        Transaction {
            id: SequentialIdGenerator::nth(1),
            type_: TransactionType::Income,
            description: "Salary".to_owned(),
            amount: 1000.0,
            date: datetime!(2024-01-01 0:00 UTC),
            category: Some("Work".to_owned()),
        }
    }

    #[tokio::test]
    async fn persists_and_queries_transactions() {
        let fake = FakePostgrest::default();
        let backend = backend_for(spawn_fake(fake.clone()).await, API_KEY);

        backend.persist_transaction(&salary()).await.unwrap();
        let got = backend.query_transactions().await.unwrap();

        assert_eq!(got, vec![salary()]);

        let requests = fake.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(
            requests[0].prefer.as_deref(),
            Some("resolution=merge-duplicates,return=minimal")
        );
        assert_eq!(requests[1].method, "GET");
        assert_eq!(requests[1].query.as_deref(), Some("select=*"));
    }

    #[tokio::test]
    async fn persist_replaces_row_with_same_id() {
        let fake = FakePostgrest::default();
        let backend = backend_for(spawn_fake(fake.clone()).await, API_KEY);
        let edited = Transaction {
            description: "Bonus".to_owned(),
            ..salary()
        };

        backend.persist_transaction(&salary()).await.unwrap();
        backend.persist_transaction(&edited).await.unwrap();

        assert_eq!(backend.query_transactions().await.unwrap(), vec![edited]);
    }

    #[tokio::test]
    async fn deletes_by_id() {
        let fake = FakePostgrest::default();
        let backend = backend_for(spawn_fake(fake.clone()).await, API_KEY);
        backend.persist_transaction(&salary()).await.unwrap();

        backend.delete_transaction(salary().id).await.unwrap();

        assert!(backend.query_transactions().await.unwrap().is_empty());
        let delete_request = &fake.requests()[1];
        assert_eq!(delete_request.method, "DELETE");
        assert_eq!(
            delete_request.query.as_deref(),
            Some("id=eq.00000000-0000-0000-0000-000000000001")
        );
    }

    #[tokio::test]
    async fn reads_rows_leniently() {
        let fake = FakePostgrest::with_rows(vec![
            json!({
                "id": "00000000-0000-0000-0000-000000000001",
                "type": "receita",
                "description": "Freelance",
                "date": "not-a-date",
                "category": "",
            }),
            json!({
                "id": "not-a-uuid",
                "type": "income",
                "description": "Skipped",
                "amount": 1.0,
                "date": "2024-01-01",
            }),
            json!({
                "id": "00000000-0000-0000-0000-000000000002",
                "type": "despesa",
                "description": "Rent",
                "amount": 300.0,
                "date": "2024-02-01T00:00:00+00:00",
                "category": null,
            }),
            json!({
                "id": "00000000-0000-0000-0000-000000000003",
                "type": "income",
                "amount": 1.0,
                "date": "2024-01-01",
            }),
            json!({
                "id": "00000000-0000-0000-0000-000000000004",
                "type": "expense",
                "description": "   ",
                "amount": 2.0,
                "date": "2024-01-01",
            }),
        ]);
        let backend = backend_for(spawn_fake(fake).await, API_KEY);
        let before = OffsetDateTime::now_utc();

        let got = backend.query_transactions().await.unwrap();

        assert_eq!(got.len(), 4);
        assert_eq!(got[0].type_, TransactionType::Income);
        assert_eq!(got[0].amount, 0.0);
        assert_eq!(got[0].category, None);
        assert!(got[0].date >= before, "malformed date should become now");
        assert_eq!(got[1].type_, TransactionType::Expense);
        assert_eq!(got[1].amount, 300.0);
        assert_eq!(got[1].date, datetime!(2024-02-01 0:00 UTC));
        assert_eq!(got[1].description, "Rent");
        assert_eq!(got[2].description, "(no description)");
        assert_eq!(got[2].date, datetime!(2024-01-01 0:00 UTC));
        assert_eq!(got[3].description, "(no description)");
    }

    #[tokio::test]
    async fn rejected_request_uses_postgrest_message() {
        let backend = backend_for(spawn_fake(FakePostgrest::default()).await, "wrong-key");

        let result = backend.persist_transaction(&salary()).await;

        assert_eq!(result, Err(Error::Backend("Invalid API key".to_owned())));
    }

    #[tokio::test]
    async fn connection_check_selects_one_id() {
        let fake = FakePostgrest::default();
        let backend = backend_for(spawn_fake(fake.clone()).await, API_KEY);

        assert_eq!(backend.check_connection().await, Ok(()));
        assert_eq!(
            fake.requests()[0].query.as_deref(),
            Some("select=id&limit=1")
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let backend = backend_for(format!("http://{address}"), API_KEY);

        assert!(matches!(
            backend.check_connection().await,
            Err(Error::Backend(_))
        ));
    }
}
