pub mod executor;

pub use executor::IQueryExecutor;
