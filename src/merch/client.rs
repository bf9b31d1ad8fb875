//! # Item API Client
//!
//! [`MerchClient`] talks to the marketplace REST API. All endpoints live
//! under `{api_url}/api/v1/` and answer JSON. Endpoints that know about the
//! user take the api token as `Authorization: Token <token>`.
//!
//! ```text
//! GET    items/                          all items
//! GET    items/?name=..&tag=..&prices=true   search, latest price embedded
//! GET    items/{id}/                     one item (404 when unknown)
//! GET    items/{id}/prices/              price history of an item
//! GET    prices/                         latest price of every item
//! GET    favorites/                      the token owner's favorites
//! POST   items/{id}/favorite/            201 when favorited
//! DELETE items/{id}/favorite/            204 when unfavorited
//! GET    auth/user/                      the token owner (200 only)
//! ```
//!
//! The commands layer only sees the [`Catalog`] trait, so it can be tested
//! without a server.

use crate::error::{MerchError, Result};
use crate::model::{Item, PriceLog, User};
use crate::search::ItemSource;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Everything the client can ask the item API, beyond searching.
#[async_trait]
pub trait Catalog: ItemSource {
    /// Every item, unfiltered.
    async fn items(&self) -> Result<Vec<Item>>;

    /// One item, with favorite status when `token` is given.
    async fn item(&self, item_id: u32, token: Option<&str>) -> Result<Option<Item>>;

    async fn price_logs(&self, item_id: u32) -> Result<Option<Vec<PriceLog>>>;

    async fn latest_prices(&self) -> Result<Vec<PriceLog>>;

    async fn favorites(&self, token: &str) -> Result<Vec<Item>>;

    async fn favorite(&self, item_id: u32, token: &str) -> Result<bool>;

    async fn unfavorite(&self, item_id: u32, token: &str) -> Result<bool>;

    /// The user `token` belongs to, or `None` when the server rejects it.
    async fn user(&self, token: &str) -> Result<Option<User>>;
}

#[derive(Debug, Clone)]
pub struct MerchClient {
    base_url: String,
    http: reqwest::Client,
}

impl MerchClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the search request without sending it.
    pub fn search_request(&self, name: &str, tags: &[String]) -> Result<reqwest::Request> {
        Ok(self.search_builder(name, tags).build()?)
    }

    fn search_builder(&self, name: &str, tags: &[String]) -> RequestBuilder {
        let tag_pairs: Vec<(&str, &str)> = tags.iter().map(|tag| ("tag", tag.as_str())).collect();
        self.http
            .get(self.url("items/"))
            .query(&[("name", name)])
            .query(&tag_pairs)
            .query(&[("prices", "true")])
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "api request");
        let response = self.http.execute(request).await?;
        tracing::debug!(status = response.status().as_u16(), "api response");
        Ok(response)
    }
}

fn success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MerchError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl ItemSource for MerchClient {
    async fn search_items(&self, name: &str, tags: &[String]) -> Result<Vec<Item>> {
        let response = self.send(self.search_builder(name, tags)).await?;
        json(success(response)?).await
    }
}

#[async_trait]
impl Catalog for MerchClient {
    async fn items(&self) -> Result<Vec<Item>> {
        let response = self.send(self.http.get(self.url("items/"))).await?;
        json(success(response)?).await
    }

    async fn item(&self, item_id: u32, token: Option<&str>) -> Result<Option<Item>> {
        let builder = self.http.get(self.url(&format!("items/{}/", item_id)));
        let response = self.send(Self::with_token(builder, token)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        json(success(response)?).await.map(Some)
    }

    async fn price_logs(&self, item_id: u32) -> Result<Option<Vec<PriceLog>>> {
        let builder = self.http.get(self.url(&format!("items/{}/prices/", item_id)));
        let response = self.send(builder).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        json(success(response)?).await.map(Some)
    }

    async fn latest_prices(&self) -> Result<Vec<PriceLog>> {
        let response = self.send(self.http.get(self.url("prices/"))).await?;
        json(success(response)?).await
    }

    async fn favorites(&self, token: &str) -> Result<Vec<Item>> {
        let builder = self.http.get(self.url("favorites/"));
        let response = self.send(Self::with_token(builder, Some(token))).await?;
        json(success(response)?).await
    }

    async fn favorite(&self, item_id: u32, token: &str) -> Result<bool> {
        let builder = self.http.post(self.url(&format!("items/{}/favorite/", item_id)));
        let response = self.send(Self::with_token(builder, Some(token))).await?;
        Ok(response.status() == StatusCode::CREATED)
    }

    async fn unfavorite(&self, item_id: u32, token: &str) -> Result<bool> {
        let builder = self.http.delete(self.url(&format!("items/{}/favorite/", item_id)));
        let response = self.send(Self::with_token(builder, Some(token))).await?;
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn user(&self, token: &str) -> Result<Option<User>> {
        let builder = self.http.get(self.url("auth/user/"));
        let response = self.send(Self::with_token(builder, Some(token))).await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }
        json(response).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped_from_base_url() {
        let client = MerchClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("items/"), "http://localhost:8000/api/v1/items/");
    }

    #[test]
    fn search_request_repeats_tag_parameter() {
        let client = MerchClient::new("http://localhost:8000");
        let tags = vec!["rune".to_string(), "2h".to_string()];
        let request = client.search_request("sword of", &tags).unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/api/v1/items/");
        assert_eq!(
            request.url().query(),
            Some("name=sword+of&tag=rune&tag=2h&prices=true")
        );
    }

    #[test]
    fn search_request_without_tags() {
        let client = MerchClient::new("http://localhost:8000");
        let request = client.search_request("", &[]).unwrap();
        assert_eq!(request.url().query(), Some("name=&prices=true"));
    }

    #[test]
    fn token_goes_into_authorization_header() {
        let client = MerchClient::new("http://localhost:8000");
        let builder = client.http.get(client.url("favorites/"));
        let request = MerchClient::with_token(builder, Some("deadbeef"))
            .build()
            .unwrap();
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Token deadbeef"
        );

        let anonymous = MerchClient::with_token(client.http.get(client.url("items/")), None)
            .build()
            .unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn unreachable_server_is_an_http_error() {
        // TEST-NET-1 is reserved and never routed
        let client = MerchClient::new("http://192.0.2.1:9");
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let client = MerchClient { http, ..client };

        let result = client.search_items("whip", &[]).await;
        assert!(matches!(result, Err(MerchError::Http(_))));
    }
}
