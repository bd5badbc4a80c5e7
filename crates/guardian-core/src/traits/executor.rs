use std::sync::Arc;

use crate::dialect::SqlDialect;
use crate::errors::ExecutorError;
use crate::models::{QueryOutput, Statement};

/// Runs one SQL statement against the backing store.
///
/// Implementations bind `statement.params` by name, never by string
/// interpolation, and classify every failure into an [`ExecutorError`]
/// kind. Each call is independent; there is no multi-statement transaction.
pub trait IQueryExecutor: Send + Sync {
    /// The dialect statements for this executor must be written in.
    fn dialect(&self) -> SqlDialect;

    fn execute(&self, statement: &Statement) -> Result<QueryOutput, ExecutorError>;
}

impl<T: IQueryExecutor + ?Sized> IQueryExecutor for Arc<T> {
    fn dialect(&self) -> SqlDialect {
        (**self).dialect()
    }

    fn execute(&self, statement: &Statement) -> Result<QueryOutput, ExecutorError> {
        (**self).execute(statement)
    }
}
