//! REST adapter for the hosted entity store.
//!
//! `GET    {base}/entities/{Entity}?q=<json>&sort=<field|-field>&limit=<n>`
//! `PUT    {base}/entities/{Entity}/{id}`
//! `DELETE {base}/entities/{Entity}/{id}`

use boardkeep_core::RecordId;
use reqwest::{RequestBuilder, Response, StatusCode};

use super::{Criteria, EntityStore, Record, Sort, StoreError};

pub struct HttpEntityStore {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpEntityStore {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn collection_url(&self, entity: &str) -> String {
        format!("{}/entities/{}", self.base_url, entity)
    }

    fn record_url(&self, entity: &str, id: &RecordId) -> String {
        format!("{}/entities/{}/{}", self.base_url, entity, id)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("api_key", key),
            None => req,
        }
    }

    async fn query(
        &self,
        entity: &str,
        criteria: Option<&Criteria>,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(criteria) = criteria {
            params.push(("q", criteria.to_json().to_string()));
        }
        if let Some(sort) = sort {
            params.push(("sort", sort.to_param()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let req = self.authorize(self.client.get(self.collection_url(entity)).query(&params));
        let resp = send(req, entity, None).await?;
        resp.json::<Vec<Record>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

async fn send(req: RequestBuilder, entity: &str, id: Option<&RecordId>) -> Result<Response, StoreError> {
    let resp = req.send().await.map_err(|e| StoreError::Transport(e.to_string()))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StoreError::NotFound {
                entity: entity.to_string(),
                id: id.clone(),
            });
        }
    }

    let message = resp.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        message,
    })
}

#[async_trait::async_trait]
impl EntityStore for HttpEntityStore {
    async fn filter(
        &self,
        entity: &str,
        criteria: &Criteria,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>, StoreError> {
        self.query(entity, Some(criteria), sort, limit).await
    }

    async fn list(&self, entity: &str, sort: Option<&Sort>, limit: Option<usize>) -> Result<Vec<Record>, StoreError> {
        self.query(entity, None, sort, limit).await
    }

    async fn update(&self, entity: &str, id: &RecordId, fields: Record) -> Result<Record, StoreError> {
        let req = self.authorize(self.client.put(self.record_url(entity, id)).json(&fields));
        let resp = send(req, entity, Some(id)).await?;
        resp.json::<Record>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn delete(&self, entity: &str, id: &RecordId) -> Result<(), StoreError> {
        let req = self.authorize(self.client.delete(self.record_url(entity, id)));
        send(req, entity, Some(id)).await.map(|_| ())
    }
}
