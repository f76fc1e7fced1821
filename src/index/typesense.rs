use async_trait::async_trait;
use log::{ debug, error, info };
use reqwest::{ Client, Method, StatusCode };
use serde::{ Deserialize, Serialize };
use serde::de::DeserializeOwned;

use super::{ HealthStatus, IndexConfig, IndexError, SearchIndex };
use crate::schema::{ CollectionInfo, CollectionSchema, FieldOp };

const API_KEY_HEADER: &str = "X-TYPESENSE-API-KEY";

#[derive(Debug, Serialize)]
struct UpdateFieldsRequest<'a> {
    fields: &'a [FieldOp],
}

/// Error body the backend returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct TypesenseIndex {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TypesenseIndex {
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(config.connection_timeout)
            .build()
            .map_err(|e| IndexError::transport("failed to build HTTP client").with_source(e))?;

        info!("Typesense client initialized for {}", config.base_url());

        Ok(Self {
            client,
            base_url: config.base_url(),
            api_key: config.api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
    }

    async fn dispatch(
        &self,
        request: reqwest::RequestBuilder,
        context: &str
    ) -> Result<(StatusCode, String), IndexError> {
        let response = request
            .send().await
            .map_err(|e| {
                IndexError::transport(format!("{} request failed", context)).with_source(e)
            })?;
        let status = response.status();
        let text = response
            .text().await
            .map_err(|e| {
                IndexError::transport(format!("failed to read {} response", context)).with_source(e)
            })?;
        Ok((status, text))
    }
}

/// Fold the backend's `{"message": ...}` error body into a readable string,
/// falling back to the raw body when it is not JSON.
fn backend_message(text: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(text) {
        Ok(body) => body.message,
        Err(_) => text.to_string(),
    }
}

fn parse<T: DeserializeOwned>(text: &str, context: &str) -> Result<T, IndexError> {
    serde_json::from_str(text).map_err(|e| {
        error!("Failed to parse {} response: {}. Text: {}", context, e, text);
        IndexError::transport(format!("malformed {} response", context)).with_source(e)
    })
}

#[async_trait]
impl SearchIndex for TypesenseIndex {
    async fn retrieve_collection(&self, name: &str) -> Result<CollectionInfo, IndexError> {
        debug!("Retrieving collection '{}'", name);
        let request = self.request(Method::GET, &format!("/collections/{}", name));
        let (status, text) = self.dispatch(request, "retrieve collection").await?;

        if status == StatusCode::NOT_FOUND {
            debug!("Collection '{}' not found", name);
            return Err(IndexError::not_found(name));
        }
        if !status.is_success() {
            error!("Retrieving collection '{}' failed (Status: {}): {}", name, status, text);
            return Err(
                IndexError::transport(
                    format!("retrieving collection '{}' failed: {}", name, backend_message(&text))
                )
            );
        }

        parse(&text, "collection")
    }

    async fn create_collection(
        &self,
        schema: &CollectionSchema
    ) -> Result<CollectionInfo, IndexError> {
        debug!("Creating collection '{}' with {} fields", schema.name, schema.fields.len());
        let request = self.request(Method::POST, "/collections").json(schema);
        let (status, text) = self.dispatch(request, "create collection").await?;

        if status == StatusCode::CONFLICT {
            return Err(IndexError::conflict(&schema.name));
        }
        if !status.is_success() {
            error!("Creating collection '{}' failed (Status: {}): {}", schema.name, status, text);
            return Err(
                IndexError::transport(
                    format!(
                        "creating collection '{}' failed: {}",
                        schema.name,
                        backend_message(&text)
                    )
                )
            );
        }

        parse(&text, "collection")
    }

    async fn update_collection_fields(
        &self,
        name: &str,
        ops: &[FieldOp]
    ) -> Result<CollectionInfo, IndexError> {
        debug!("Updating collection '{}' with {} field ops", name, ops.len());
        let request = self
            .request(Method::PATCH, &format!("/collections/{}", name))
            .json(&(UpdateFieldsRequest { fields: ops }));
        let (status, text) = self.dispatch(request, "update collection").await?;

        if !status.is_success() {
            error!("Updating collection '{}' failed (Status: {}): {}", name, status, text);
            return Err(
                IndexError::transport(
                    format!("updating collection '{}' failed: {}", name, backend_message(&text))
                )
            );
        }

        parse(&text, "collection")
    }

    async fn health(&self) -> Result<HealthStatus, IndexError> {
        let request = self.request(Method::GET, "/health");
        let (status, text) = self.dispatch(request, "health").await?;

        if !status.is_success() {
            error!("Health check failed (Status: {}): {}", status, text);
            return Err(
                IndexError::transport(format!("health check failed: {}", backend_message(&text)))
            );
        }

        parse(&text, "health")
    }
}
