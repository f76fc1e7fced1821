use log::{ error, info };
use serde_json::{ json, Value };

use crate::index::SearchIndex;
use crate::reconcile::reconcile;
use crate::schema::CollectionSchema;

/// Side channel for forwarding failures to an external error tracker. The
/// trigger invokes it after receiving a failure result; the reconciler and
/// the index client never touch it.
pub trait FailureSink: Send + Sync {
    fn capture(&self, error: &(dyn std::error::Error + 'static));
}

/// Transport-shaped outcome the surrounding system returns to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerResponse {
    pub status: u16,
    pub body: Value,
}

/// Run the schema reconciler against its build-time target and translate the
/// outcome into a response.
pub async fn run_schema_trigger(
    index: &dyn SearchIndex,
    target: &CollectionSchema,
    sink: Option<&dyn FailureSink>
) -> TriggerResponse {
    match reconcile(index, target).await {
        Ok(_) =>
            TriggerResponse {
                status: 200,
                body: json!({ "message": "Schema created/updated successfully" }),
            },
        Err(err) => {
            error!("Error creating/updating schema: {}", err);
            if let Some(sink) = sink {
                sink.capture(&err);
            }
            TriggerResponse {
                status: 500,
                body: json!({ "error": err.to_string() }),
            }
        }
    }
}

/// Probe backend liveness and translate the outcome into a response.
pub async fn run_connection_probe(
    index: &dyn SearchIndex,
    sink: Option<&dyn FailureSink>
) -> TriggerResponse {
    match index.health().await {
        Ok(health) => {
            info!("Index health check: ok={}", health.ok);
            TriggerResponse {
                status: 200,
                body: json!({ "success": true, "health": health }),
            }
        }
        Err(err) => {
            error!("Index health check failed: {}", err);
            if let Some(sink) = sink {
                sink.capture(&err);
            }
            TriggerResponse {
                status: 400,
                body: json!({ "success": false, "error": err.to_string() }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ HealthStatus, IndexError };
    use crate::schema::{ CollectionInfo, CollectionSchema, FieldOp, FieldSpec, FieldType };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StubIndex {
        healthy: bool,
        retrievable: bool,
    }

    #[async_trait]
    impl SearchIndex for StubIndex {
        async fn retrieve_collection(&self, name: &str) -> Result<CollectionInfo, IndexError> {
            if self.retrievable {
                Ok(CollectionInfo {
                    name: name.to_string(),
                    fields: Vec::new(),
                    num_documents: 0,
                })
            } else {
                Err(IndexError::transport("backend unreachable"))
            }
        }

        async fn create_collection(
            &self,
            schema: &CollectionSchema
        ) -> Result<CollectionInfo, IndexError> {
            Ok(CollectionInfo {
                name: schema.name.clone(),
                fields: schema.fields.clone(),
                num_documents: 0,
            })
        }

        async fn update_collection_fields(
            &self,
            name: &str,
            _ops: &[FieldOp]
        ) -> Result<CollectionInfo, IndexError> {
            Ok(CollectionInfo {
                name: name.to_string(),
                fields: Vec::new(),
                num_documents: 0,
            })
        }

        async fn health(&self) -> Result<HealthStatus, IndexError> {
            if self.healthy {
                Ok(HealthStatus { ok: true })
            } else {
                Err(IndexError::transport("connection refused"))
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        captured: Mutex<Vec<String>>,
    }

    impl FailureSink for RecordingSink {
        fn capture(&self, error: &(dyn std::error::Error + 'static)) {
            self.captured.lock().unwrap().push(error.to_string());
        }
    }

    fn target() -> CollectionSchema {
        CollectionSchema {
            name: "spaces".to_string(),
            fields: vec![FieldSpec::new("title", FieldType::String)],
        }
    }

    #[tokio::test]
    async fn successful_reconcile_maps_to_200_and_skips_the_sink() {
        let index = StubIndex { healthy: true, retrievable: true };
        let sink = RecordingSink::default();

        let response = run_schema_trigger(&index, &target(), Some(&sink)).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["message"], "Schema created/updated successfully");
        assert!(sink.captured.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_reconcile_maps_to_500_and_reports_once() {
        let index = StubIndex { healthy: true, retrievable: false };
        let sink = RecordingSink::default();

        let response = run_schema_trigger(&index, &target(), Some(&sink)).await;

        assert_eq!(response.status, 500);
        assert_eq!(response.body["error"], "failed to inspect collection 'spaces'");
        assert_eq!(sink.captured.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn healthy_probe_maps_to_200() {
        let index = StubIndex { healthy: true, retrievable: true };

        let response = run_connection_probe(&index, None).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["success"], true);
        assert_eq!(response.body["health"]["ok"], true);
    }

    #[tokio::test]
    async fn failed_probe_maps_to_400_and_reports() {
        let index = StubIndex { healthy: false, retrievable: true };
        let sink = RecordingSink::default();

        let response = run_connection_probe(&index, Some(&sink)).await;

        assert_eq!(response.status, 400);
        assert_eq!(response.body["success"], false);
        assert_eq!(response.body["error"], "connection refused");
        assert_eq!(sink.captured.lock().unwrap().len(), 1);
    }
}
