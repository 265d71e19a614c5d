//! Client for the superhero REST service

use std::sync::Arc;

use crate::error::E2eResult;
use crate::hero::{Hero, HeroDraft};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Thin wrapper issuing the five superhero calls.
///
/// Every call returns the raw [`HttpResponse`] so cases can assert on the
/// transport-level outcome before decoding anything.
#[derive(Clone)]
pub struct SuperheroClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl SuperheroClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/superheroes", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/superheroes/{}", self.base_url, id)
    }

    /// GET /superheroes
    pub async fn list(&self) -> E2eResult<HttpResponse> {
        self.transport.execute(HttpRequest::get(self.collection_url())).await
    }

    /// GET /superheroes, decoded
    pub async fn list_heroes(&self) -> E2eResult<Vec<Hero>> {
        self.list().await?.json()
    }

    /// GET /superheroes/{id}
    pub async fn get(&self, id: i64) -> E2eResult<HttpResponse> {
        self.transport.execute(HttpRequest::get(self.item_url(id))).await
    }

    /// POST /superheroes
    pub async fn create(&self, draft: &HeroDraft) -> E2eResult<HttpResponse> {
        let request = HttpRequest::post(self.collection_url()).json(draft)?;
        self.transport.execute(request).await
    }

    /// PUT /superheroes/{id}
    pub async fn update(&self, id: i64, draft: &HeroDraft) -> E2eResult<HttpResponse> {
        let request = HttpRequest::put(self.item_url(id)).json(draft)?;
        self.transport.execute(request).await
    }

    /// DELETE /superheroes/{id}
    pub async fn delete(&self, id: i64) -> E2eResult<HttpResponse> {
        self.transport.execute(HttpRequest::delete(self.item_url(id))).await
    }
}
