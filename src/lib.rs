pub mod index;
pub mod reconcile;
pub mod schema;
pub mod spaces;
pub mod trigger;

pub use index::{
    create_search_index,
    ConfigError,
    ErrorKind,
    HealthStatus,
    IndexConfig,
    IndexError,
    SearchIndex,
};
pub use reconcile::{ reconcile, ReconcileError };
pub use schema::{ CollectionInfo, CollectionSchema, FieldOp, FieldSpec, FieldType };
pub use trigger::{ run_connection_probe, run_schema_trigger, FailureSink, TriggerResponse };
