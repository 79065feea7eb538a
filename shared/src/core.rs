use crate::configuration::{ApiConfig, Credentials, PublicConfig};
use crate::error::ProxyError;
use async_trait::async_trait;
use lambda_http::tracing;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Debug;

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

const GURU_LIST_QUERY: &str = "fields=Id,nama_guru,mapel&sort=nama_guru&limit=100";
const DEFAULT_ROLE: &str = "guru";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
}

/// A single call to the NocoDB REST API.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: UpstreamMethod,
    pub url: String,
    pub token: String,
    pub body: Option<Value>,
}

impl UpstreamRequest {
    pub fn get(url: String, credentials: &Credentials<'_>) -> Self {
        Self {
            method: UpstreamMethod::Get,
            url,
            token: credentials.api_token.to_string(),
            body: None,
        }
    }

    pub fn post(url: String, credentials: &Credentials<'_>, body: Value) -> Self {
        Self {
            method: UpstreamMethod::Post,
            url,
            token: credentials.api_token.to_string(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait UpstreamApi: Debug {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError>;
}

/// Request body accepted by the proxy function. Fields keep whatever JSON type
/// the caller sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProxyRequest {
    pub action: Option<Value>,
    pub data: Option<Value>,
    pub table: Option<Value>,
    pub query: Option<Value>,
}

impl ProxyRequest {
    /// An empty body, or any JSON value other than an object or `null`, reads as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, ProxyError> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(body).map_err(ProxyError::InvalidBody)? {
            Value::Null => Err(ProxyError::NullBody),
            Value::Object(mut fields) => Ok(Self {
                action: fields.remove("action"),
                data: fields.remove("data"),
                table: fields.remove("table"),
                query: fields.remove("query"),
            }),
            _ => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProxyAction {
    GetGuruList,
    Login { nama_guru: String, password: Value },
    SaveData { table: String, data: Value },
    Query { table: String, query: Option<String> },
}

impl TryFrom<ProxyRequest> for ProxyAction {
    type Error = ProxyError;

    fn try_from(request: ProxyRequest) -> Result<Self, Self::Error> {
        let table = request.table.filter(is_truthy).map(|t| interpolated(&t));

        match request.action.as_ref().and_then(Value::as_str) {
            Some("get_guru_list") => Ok(ProxyAction::GetGuruList),
            Some("login") => {
                let data = request.data.unwrap_or(Value::Null);
                let field = |name: &str| data.get(name).filter(|v| is_truthy(v)).cloned();
                match (field("nama_guru"), field("password")) {
                    (Some(nama_guru), Some(password)) => Ok(ProxyAction::Login {
                        nama_guru: interpolated(&nama_guru),
                        password,
                    }),
                    _ => Err(ProxyError::BadRequest("Nama guru dan password diperlukan")),
                }
            }
            Some("save_data") => match (table, request.data.filter(is_truthy)) {
                (Some(table), Some(data)) => Ok(ProxyAction::SaveData { table, data }),
                _ => Err(ProxyError::BadRequest("Table dan data diperlukan")),
            },
            Some("query") => match table {
                Some(table) => Ok(ProxyAction::Query {
                    table,
                    query: request.query.filter(is_truthy).map(|q| interpolated(&q)),
                }),
                None => Err(ProxyError::BadRequest("Table diperlukan")),
            },
            _ => Err(ProxyError::UnknownAction),
        }
    }
}

/// Row of the `guru` table. Only the columns the proxy reads are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuruRecord {
    #[serde(rename = "Id", default)]
    pub row_id: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "text")]
    pub nama_guru: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub mapel: Option<String>,
    #[serde(default)]
    pub pwd: Option<Value>,
    #[serde(default, deserialize_with = "text")]
    pub role: Option<String>,
}

impl GuruRecord {
    /// NocoDB names the primary key `Id`; older tables use `id`.
    pub fn record_id(&self) -> Option<Value> {
        self.row_id
            .clone()
            .filter(is_truthy)
            .or_else(|| self.id.clone())
    }

    fn mapel_or_empty(&self) -> String {
        self.mapel.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct RowList {
    #[serde(default)]
    list: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuruSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub nama_guru: String,
    pub mapel: String,
}

#[derive(Debug, Serialize)]
pub struct GuruListResponse {
    pub success: bool,
    #[serde(rename = "guruList")]
    pub guru_list: Vec<GuruSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nama_guru: Option<String>,
    pub mapel: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: UserProfile,
    pub config: PublicConfig,
}

#[derive(Debug, Serialize)]
pub struct SaveDataResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: Value,
}

#[derive(Debug)]
pub enum ProxyResponse {
    GuruList(GuruListResponse),
    Login(LoginResponse),
    Saved(SaveDataResponse),
    /// Upstream body, returned untouched.
    Passthrough(String),
}

#[derive(Debug)]
pub struct NocoDbProxy<U: UpstreamApi> {
    config: ApiConfig,
    upstream: U,
}

impl<U: UpstreamApi> NocoDbProxy<U> {
    pub fn new(config: ApiConfig, upstream: U) -> Self {
        Self { config, upstream }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Parses a raw request body and runs the action it selects.
    pub async fn handle_body(&self, body: &[u8]) -> Result<ProxyResponse, ProxyError> {
        let request = ProxyRequest::from_body(body)?;
        tracing::info!(action = ?request.action.as_ref().map(interpolated), "Proxy action");

        let credentials = self.config.credentials()?;
        let action = ProxyAction::try_from(request)?;

        self.execute(&credentials, action).await
    }

    pub async fn execute(
        &self,
        credentials: &Credentials<'_>,
        action: ProxyAction,
    ) -> Result<ProxyResponse, ProxyError> {
        match action {
            ProxyAction::GetGuruList => self
                .get_guru_list(credentials)
                .await
                .map(ProxyResponse::GuruList),
            ProxyAction::Login {
                nama_guru,
                password,
            } => self
                .login(credentials, &nama_guru, &password)
                .await
                .map(ProxyResponse::Login),
            ProxyAction::SaveData { table, data } => self
                .save_data(credentials, &table, data)
                .await
                .map(ProxyResponse::Saved),
            ProxyAction::Query { table, query } => self
                .query(credentials, &table, query.as_deref())
                .await
                .map(ProxyResponse::Passthrough),
        }
    }

    async fn get_guru_list(
        &self,
        credentials: &Credentials<'_>,
    ) -> Result<GuruListResponse, ProxyError> {
        let url = format!(
            "{}{}?{}",
            credentials.base_url, self.config.tables.data, GURU_LIST_QUERY
        );
        tracing::info!("Fetching guru list from: {}", url);

        let response = self
            .upstream
            .send(UpstreamRequest::get(url, credentials))
            .await?;
        if !response.is_success() {
            return Err(ProxyError::Database {
                status: response.status,
            });
        }

        let guru_list: Vec<GuruSummary> = parse_rows(&response.body)?
            .into_iter()
            .filter_map(|row| serde_json::from_value::<GuruRecord>(row).ok())
            .filter_map(|record| {
                let mapel = record.mapel_or_empty();
                let id = record.record_id();
                record
                    .nama_guru
                    .filter(|name| !name.trim().is_empty())
                    .map(|nama_guru| GuruSummary {
                        id,
                        nama_guru,
                        mapel,
                    })
            })
            .collect();

        Ok(GuruListResponse {
            success: true,
            count: guru_list.len(),
            guru_list,
        })
    }

    async fn login(
        &self,
        credentials: &Credentials<'_>,
        nama_guru: &str,
        password: &Value,
    ) -> Result<LoginResponse, ProxyError> {
        let url = format!(
            "{}{}?where=(nama_guru,eq,{})",
            credentials.base_url,
            self.config.tables.data,
            urlencoding::encode(nama_guru)
        );
        tracing::info!("Login query: {}", url);

        let response = self
            .upstream
            .send(UpstreamRequest::get(url, credentials))
            .await?;
        if !response.is_success() {
            return Err(ProxyError::Database {
                status: response.status,
            });
        }

        let user = match parse_rows(&response.body)?.into_iter().next() {
            None => return Err(ProxyError::Unauthorized("Nama guru tidak ditemukan")),
            Some(row) => serde_json::from_value::<GuruRecord>(row).unwrap_or_default(),
        };

        // TODO: compare against a salted hash once the table stores one instead of plain text.
        if user.pwd.as_ref().filter(|pwd| is_truthy(pwd)) != Some(password) {
            return Err(ProxyError::Unauthorized("Password salah"));
        }

        Ok(LoginResponse {
            success: true,
            message: "Login berhasil",
            user: UserProfile {
                mapel: user.mapel_or_empty(),
                role: user
                    .role
                    .clone()
                    .filter(|role| !role.is_empty())
                    .unwrap_or_else(|| DEFAULT_ROLE.to_string()),
                id: user.record_id(),
                nama_guru: user.nama_guru,
            },
            config: self.config.public_view(),
        })
    }

    async fn save_data(
        &self,
        credentials: &Credentials<'_>,
        table: &str,
        data: Value,
    ) -> Result<SaveDataResponse, ProxyError> {
        let url = format!("{}{}", credentials.base_url, table);
        tracing::info!("Saving to: {}", url);
        tracing::debug!("Data: {}", data);

        let response = self
            .upstream
            .send(UpstreamRequest::post(url, credentials, data))
            .await?;
        if !response.is_success() {
            return Err(ProxyError::SaveFailed {
                status: response.status,
                body: response.body,
            });
        }

        let data = serde_json::from_str(&response.body).map_err(ProxyError::InvalidUpstreamBody)?;

        Ok(SaveDataResponse {
            success: true,
            message: "Data berhasil disimpan",
            data,
        })
    }

    async fn query(
        &self,
        credentials: &Credentials<'_>,
        table: &str,
        query: Option<&str>,
    ) -> Result<String, ProxyError> {
        let url = match query {
            Some(query) => format!("{}{}?{}", credentials.base_url, table, query),
            None => format!("{}{}", credentials.base_url, table),
        };
        tracing::info!("Querying: {}", url);

        let response = self
            .upstream
            .send(UpstreamRequest::get(url, credentials))
            .await?;
        if !response.is_success() {
            return Err(ProxyError::QueryFailed {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response.body)
    }
}

fn parse_rows(body: &str) -> Result<Vec<Value>, ProxyError> {
    let rows: RowList = serde_json::from_str(body).map_err(ProxyError::InvalidUpstreamBody)?;
    Ok(rows.list.unwrap_or_default())
}

/// Text a value turns into when spliced into a URL: strings as-is, anything
/// else as its JSON form.
fn interpolated(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// Text columns: anything other than a JSON string reads as absent.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}
