//! PostgREST client for the hosted prompt catalog

use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_RANGE, RANGE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{FetchError, FetchResult};
use crate::logging::log_fetch_operation;
use crate::model::{Category, PromptRecord, Tool};
use crate::store::{page_offset, PromptStore, PAGE_SIZE, RELATED_LIMIT};

/// Columns for the listing, with tool/category/type joined
pub const LIST_SELECT: &str = "id,title,prompt_text,output_text,rating,usage_count,created_at,updated_at,\
tags,output_status,version,ai_tool_model,attachment_filename,credits_used,is_favorite,\
ai_tools!inner(id,name,color_hex),categories!inner(id,name,image_url,color_hex),prompt_types(id,name)";

pub const DETAIL_SELECT: &str =
    "*,ai_tools(name,color_hex),categories(name,image_url,color_hex),prompt_types(name)";

pub const RELATED_SELECT: &str = "id,title,prompt_text,rating,usage_count,categories!inner(name)";

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

pub fn list_query(page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("select", LIST_SELECT.to_string()),
        ("order", "created_at.desc".to_string()),
        ("offset", page_offset(page, page_size).to_string()),
        ("limit", page_size.to_string()),
    ]
}

pub fn detail_query(id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", DETAIL_SELECT.to_string()),
        ("id", format!("eq.{}", id)),
    ]
}

pub fn related_query(category: &str, exclude_id: &str) -> Vec<(&'static str, String)> {
    vec![
        ("select", RELATED_SELECT.to_string()),
        ("categories.name", format!("eq.{}", category)),
        ("id", format!("neq.{}", exclude_id)),
        ("limit", RELATED_LIMIT.to_string()),
    ]
}

/// Total from a `Content-Range` header such as `0-19/42` or `*/0`
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

/// New counter from the RPC response. Accepts a bare number, an object with
/// `usage_count`, or a one-row array of either.
pub fn parse_increment_response(body: &Value) -> Option<u64> {
    match body {
        Value::Number(n) => n.as_u64(),
        Value::Object(map) => map.get("usage_count").and_then(Value::as_u64),
        Value::Array(rows) => rows.first().and_then(parse_increment_response),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    rest_url: String,
    client: reqwest::Client,
}

impl SupabaseClient {
    /// Build a client from config; endpoint and anon key are required
    pub fn new(config: &Config) -> FetchResult<Self> {
        let endpoint = config.endpoint_or_empty();
        if endpoint.is_empty() {
            return Err(FetchError::Config(
                "endpoint not set (PROMPT_LIBRARY_URL or config.toml)".to_string(),
            ));
        }
        let key = config.anon_key.as_deref().ok_or_else(|| {
            FetchError::Config("anon key not set (PROMPT_LIBRARY_ANON_KEY or config.toml)".to_string())
        })?;

        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(key)
            .map_err(|_| FetchError::Config("anon key contains invalid characters".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|_| FetchError::Config("anon key contains invalid characters".to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            rest_url: format!("{}/rest/v1", endpoint),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.rest_url, path.trim_start_matches('/'))
    }

    /// Send a request and hand back the response if its status is a success
    async fn send(&self, request: RequestBuilder) -> FetchResult<reqwest::Response> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http { status, body });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &'static str,
        request: RequestBuilder,
    ) -> FetchResult<T> {
        let response = self.send(request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| FetchError::Decode { what, source })
    }

    /// Run `fut`, logging the outcome and duration
    async fn timed<T, F>(&self, operation: &str, target: Option<&str>, fut: F) -> FetchResult<T>
    where
        F: std::future::Future<Output = FetchResult<T>>,
    {
        let start = Instant::now();
        let result = fut.await;
        log_fetch_operation(
            operation,
            target,
            result.is_ok(),
            start.elapsed().as_millis() as u64,
        );
        if let Err(ref e) = result {
            tracing::debug!(operation, error = %e, "Fetch failed");
        }
        result
    }
}

impl PromptStore for SupabaseClient {
    async fn list_prompts(&self, page: u32) -> FetchResult<Vec<PromptRecord>> {
        let request = self
            .client
            .get(self.url("prompts"))
            .query(&list_query(page, PAGE_SIZE));
        self.timed("list_prompts", None, self.get_json("prompt page", request))
            .await
    }

    async fn count_prompts(&self) -> FetchResult<u64> {
        let request = self
            .client
            .head(self.url("prompts"))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .header(RANGE, "0-0");

        self.timed("count_prompts", None, async {
            let response = self.send(request).await?;
            let total = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range)
                .unwrap_or(0);
            Ok(total)
        })
        .await
    }

    async fn get_prompt(&self, id: &str) -> FetchResult<PromptRecord> {
        let request = self
            .client
            .get(self.url("prompts"))
            .query(&detail_query(id))
            .header(ACCEPT, SINGLE_OBJECT);

        self.timed("get_prompt", Some(id), async {
            match self.get_json::<PromptRecord>("prompt", request).await {
                // PostgREST answers 406 when a single-object request matches no rows
                Err(FetchError::Http { status, .. })
                    if status == StatusCode::NOT_ACCEPTABLE.as_u16()
                        || status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    Err(FetchError::not_found(id))
                }
                other => other,
            }
        })
        .await
    }

    async fn related_prompts(&self, category: &str, exclude_id: &str) -> FetchResult<Vec<PromptRecord>> {
        let request = self
            .client
            .get(self.url("prompts"))
            .query(&related_query(category, exclude_id));
        self.timed(
            "related_prompts",
            Some(exclude_id),
            self.get_json("related prompts", request),
        )
        .await
    }

    async fn set_favorite(&self, id: &str, favorite: bool) -> FetchResult<()> {
        let request = self
            .client
            .patch(self.url("prompts"))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "is_favorite": favorite }));

        self.timed("set_favorite", Some(id), async {
            self.send(request).await?;
            Ok(())
        })
        .await
    }

    async fn increment_view_count(&self, id: &str) -> FetchResult<u64> {
        let request = self
            .client
            .post(self.url("rpc/increment_view_count"))
            .json(&json!({ "prompt_id": id }));

        self.timed("increment_view_count", Some(id), async {
            let body: Value = self.get_json("view count", request).await?;
            parse_increment_response(&body).ok_or_else(|| FetchError::Decode {
                what: "view count",
                source: serde::de::Error::custom(format!("unexpected response: {}", body)),
            })
        })
        .await
    }

    async fn list_tools(&self) -> FetchResult<Vec<Tool>> {
        let request = self
            .client
            .get(self.url("ai_tools"))
            .query(&[("select", "id,name,color_hex"), ("order", "name")]);
        self.timed("list_tools", None, self.get_json("tools", request))
            .await
    }

    async fn list_categories(&self) -> FetchResult<Vec<Category>> {
        let request = self
            .client
            .get(self.url("categories"))
            .query(&[("select", "id,name,image_url,color_hex"), ("order", "name")]);
        self.timed("list_categories", None, self.get_json("categories", request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        Config {
            endpoint: Some("https://abc.supabase.co/".to_string()),
            anon_key: Some("anon-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_requires_endpoint_and_key() {
        let mut config = configured();
        config.endpoint = None;
        assert!(matches!(SupabaseClient::new(&config), Err(FetchError::Config(_))));

        let mut config = configured();
        config.anon_key = None;
        assert!(matches!(SupabaseClient::new(&config), Err(FetchError::Config(_))));
    }

    #[test]
    fn test_client_builds_rest_urls() {
        let client = SupabaseClient::new(&configured()).unwrap();
        assert_eq!(client.url("prompts"), "https://abc.supabase.co/rest/v1/prompts");
        assert_eq!(
            client.url("/rpc/increment_view_count"),
            "https://abc.supabase.co/rest/v1/rpc/increment_view_count"
        );
    }

    #[test]
    fn test_list_query_paginates() {
        let query = list_query(3, 20);
        assert!(query.contains(&("order", "created_at.desc".to_string())));
        assert!(query.contains(&("offset", "40".to_string())));
        assert!(query.contains(&("limit", "20".to_string())));
        assert!(LIST_SELECT.contains("ai_tools!inner(id,name,color_hex)"));
    }

    #[test]
    fn test_related_query_excludes_current() {
        let query = related_query("Writing", "17");
        assert!(query.contains(&("categories.name", "eq.Writing".to_string())));
        assert!(query.contains(&("id", "neq.17".to_string())));
        assert!(query.contains(&("limit", "3".to_string())));
    }

    #[test]
    fn test_detail_query_filters_by_id() {
        assert!(detail_query("9").contains(&("id", "eq.9".to_string())));
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-19/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-0/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_parse_increment_response_shapes() {
        assert_eq!(parse_increment_response(&json!(8)), Some(8));
        assert_eq!(parse_increment_response(&json!({"usage_count": 3})), Some(3));
        assert_eq!(parse_increment_response(&json!([{"usage_count": 5}])), Some(5));
        assert_eq!(parse_increment_response(&json!([])), None);
        assert_eq!(parse_increment_response(&json!("x")), None);
    }
}
