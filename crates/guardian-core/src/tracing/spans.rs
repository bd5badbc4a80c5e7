//! Span definitions per operation: initialize, migration, audit.

/// Create the span wrapping a whole `Initialize` run.
#[macro_export]
macro_rules! initialize_span {
    ($namespace:expr, $instance:expr) => {
        tracing::info_span!("guardian.initialize", namespace = %$namespace, instance = %$instance)
    };
}

/// Create the span for applying one migration version.
#[macro_export]
macro_rules! migration_span {
    ($version:expr, $description:expr) => {
        tracing::info_span!("guardian.migration", version = $version, description = %$description)
    };
}

/// Create the span for one audit-store operation.
#[macro_export]
macro_rules! audit_span {
    ($op:expr, $resource_id:expr) => {
        tracing::info_span!("guardian.audit", op = %$op, resource_id = %$resource_id)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const INITIALIZE: &str = "guardian.initialize";
    pub const MIGRATION: &str = "guardian.migration";
    pub const AUDIT: &str = "guardian.audit";
}
