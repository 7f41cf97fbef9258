//! PostgREST-style HTTP client for the remote row store.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use super::config::SyncConfig;
use super::error::SyncError;
use super::remote::{Filter, FilterOp, RemoteStore, SelectQuery};

const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const PREFER_INSERT: &str = "return=minimal";

/// Encode one filter as a query parameter: `col=eq.v`, `col=in.("a","b")`.
pub fn encode_filter(filter: &Filter) -> (String, String) {
    let value = match &filter.op {
        FilterOp::Eq(value) => format!("eq.{value}"),
        FilterOp::In(values) => {
            let list = values
                .iter()
                .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
                .collect::<Vec<_>>()
                .join(",");
            format!("in.({list})")
        }
    };
    (filter.column.clone(), value)
}

/// Query parameters for a select: `select`, filters, `order`, `limit`.
pub fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(query.filters.iter().map(encode_filter));
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Human-readable message for a failed response: the JSON `message`
/// field, else the raw body, else the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let reason = || {
        status
            .canonical_reason()
            .unwrap_or("remote request failed")
            .to_string()
    };
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(reason),
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => reason(),
    }
}

/// HTTP client for one store.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base: String,
    api_key: String,
}

impl RestStore {
    /// Client for a configured store; [`SyncError::NotConfigured`] otherwise.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let base = config.rest_base()?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base,
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, table: &str) -> String {
        format!("{}/{table}", self.base)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Option<Value>, SyncError> {
        let response = request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::debug!(status = status.as_u16(), %message, "remote request rejected");
            return Err(SyncError::Http {
                status: status.as_u16(),
                message,
            });
        }
        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, SyncError> {
        let request = self.client.get(self.url(table)).query(&select_params(query));
        match self.send(request).await? {
            Some(Value::Array(rows)) => Ok(rows),
            None => Ok(Vec::new()),
            Some(other) => Err(SyncError::Decode(format!(
                "expected an array of rows from {table}, got {other}"
            ))),
        }
    }

    async fn upsert(&self, table: &str, rows: &[Value], on_conflict: &str) -> Result<(), SyncError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut request = self
            .client
            .post(self.url(table))
            .header("Prefer", PREFER_UPSERT)
            .json(rows);
        if !on_conflict.is_empty() {
            request = request.query(&[("on_conflict", on_conflict)]);
        }
        self.send(request).await.map(drop)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<(), SyncError> {
        let params: Vec<(String, String)> = filters.iter().map(encode_filter).collect();
        let request = self.client.delete(self.url(table)).query(&params);
        self.send(request).await.map(drop)
    }

    async fn insert(&self, table: &str, rows: &[Value]) -> Result<(), SyncError> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .post(self.url(table))
            .header("Prefer", PREFER_INSERT)
            .json(rows);
        self.send(request).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::remote::Order;

    #[test]
    fn filter_encoding() {
        assert_eq!(
            encode_filter(&Filter::eq("workspace_id", "default")),
            ("workspace_id".to_string(), "eq.default".to_string())
        );
        assert_eq!(
            encode_filter(&Filter::any_of("uid", ["a", "b\"c"])).1,
            r#"in.("a","b\"c")"#
        );
    }

    #[test]
    fn select_parameters() {
        let query = SelectQuery::new()
            .filter(Filter::eq("workspace_id", "w"))
            .order(Order::desc("updated_at"))
            .limit(5);
        let params = select_params(&query);
        assert_eq!(params[0], ("select".into(), "*".into()));
        assert!(params.contains(&("order".into(), "updated_at.desc".into())));
        assert!(params.contains(&("limit".into(), "5".into())));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            error_message(StatusCode::CONFLICT, r#"{"message":"duplicate key"}"#),
            "duplicate key"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, "upstream down"), "upstream down");
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(error_message(StatusCode::UNAUTHORIZED, "{}"), "Unauthorized");
    }

    #[test]
    fn unconfigured_store_is_rejected() {
        assert!(matches!(
            RestStore::new(&SyncConfig::default()),
            Err(SyncError::NotConfigured)
        ));
    }
}
