use log::{ debug, info };
use thiserror::Error;

use crate::index::{ ErrorKind, IndexError, SearchIndex };
use crate::schema::{ CollectionInfo, CollectionSchema, FieldOp, RESERVED_ID_FIELD };

/// Failure of one reconcile phase, with the backend error as its cause.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to inspect collection '{collection}'")]
    Retrieve {
        collection: String,
        #[source]
        source: IndexError,
    },
    #[error("failed to create collection '{collection}'")]
    Create {
        collection: String,
        #[source]
        source: IndexError,
    },
    #[error("failed to drop existing fields from collection '{collection}'")]
    DropFields {
        collection: String,
        #[source]
        source: IndexError,
    },
    #[error("failed to add target fields to collection '{collection}'")]
    AddFields {
        collection: String,
        #[source]
        source: IndexError,
    },
}

/// Converge the remote collection named by `target` to the declared schema.
///
/// A missing collection is created outright. An existing one is rebuilt in
/// two batched calls: drop every current field except the reserved `id`
/// field, then add the full target field list. The rebuild is deliberately
/// not diff-minimal, so a run against an already-converged collection
/// repeats the same drop+add shape; every run is safe to repeat, including
/// after a failed add left the collection with no custom fields.
///
/// Phases never overlap and any failure aborts the run with the backend
/// error attached. Overlapping invocations against the same collection are
/// not coordinated here; callers that can receive concurrent triggers must
/// serialize them per collection name.
pub async fn reconcile(
    index: &dyn SearchIndex,
    target: &CollectionSchema
) -> Result<CollectionInfo, ReconcileError> {
    info!("Checking if collection '{}' exists...", target.name);

    let existing = match index.retrieve_collection(&target.name).await {
        Ok(info) => info,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("Collection '{}' not found, creating...", target.name);
            let created = index
                .create_collection(target).await
                .map_err(|source| ReconcileError::Create {
                    collection: target.name.clone(),
                    source,
                })?;
            info!("Collection '{}' created with {} fields.", target.name, target.fields.len());
            return Ok(created);
        }
        Err(source) => {
            return Err(ReconcileError::Retrieve { collection: target.name.clone(), source });
        }
    };

    info!(
        "Collection '{}' exists with {} fields, rebuilding schema...",
        target.name,
        existing.fields.len()
    );

    let drops: Vec<FieldOp> = existing.fields
        .iter()
        .filter(|field| field.name != RESERVED_ID_FIELD)
        .map(|field| FieldOp::drop(&field.name))
        .collect();

    if drops.is_empty() {
        debug!("No droppable fields on '{}', skipping drop call.", target.name);
    } else {
        info!("Dropping {} existing fields from '{}'.", drops.len(), target.name);
        index
            .update_collection_fields(&target.name, &drops).await
            .map_err(|source| ReconcileError::DropFields {
                collection: target.name.clone(),
                source,
            })?;
        info!("Existing fields dropped.");
    }

    let adds: Vec<FieldOp> = target.fields
        .iter()
        .cloned()
        .map(FieldOp::add)
        .collect();

    info!("Adding {} target fields to '{}'.", adds.len(), target.name);
    let updated = index
        .update_collection_fields(&target.name, &adds).await
        .map_err(|source| ReconcileError::AddFields {
            collection: target.name.clone(),
            source,
        })?;
    info!("Schema for '{}' updated.", target.name);

    Ok(updated)
}
