//! Databricks SQL backend over the Statement Execution API.
//!
//! Request building, response decoding and error classification are pure
//! and always compiled. The HTTP transport (reqwest, blocking) is only
//! available with the `databricks` feature.

use serde::{Deserialize, Serialize};

use guardian_core::config::DatabricksConfig;
use guardian_core::dialect::databricks_param_type;
use guardian_core::errors::{ErrorKind, ExecutorError};
use guardian_core::models::{format_timestamp, parse_timestamp, QueryOutput, SqlValue, Statement};
use guardian_core::{IQueryExecutor, SqlDialect};

use super::truncate_sql;

pub const STATEMENTS_PATH: &str = "/api/2.0/sql/statements";

// ---- Wire types ----

/// Body of `POST /api/2.0/sql/statements`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRequest {
    pub warehouse_id: String,
    pub statement: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<StatementParameter>,
    pub wait_timeout: String,
    pub on_wait_timeout: String,
    pub format: String,
    pub disposition: String,
}

/// A named, typed parameter. A missing `value` is SQL NULL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementParameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl StatementRequest {
    pub fn build(warehouse_id: &str, wait_timeout_secs: u64, statement: &Statement) -> Self {
        let parameters = statement
            .params
            .iter()
            .map(|(name, value)| StatementParameter {
                name: name.clone(),
                value: param_value(value),
                type_name: databricks_param_type(value).to_string(),
            })
            .collect();
        Self {
            warehouse_id: warehouse_id.to_string(),
            statement: statement.sql.clone(),
            parameters,
            wait_timeout: format!("{wait_timeout_secs}s"),
            on_wait_timeout: "CANCEL".to_string(),
            format: "JSON_ARRAY".to_string(),
            disposition: "INLINE".to_string(),
        }
    }
}

fn param_value(value: &SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        SqlValue::Bool(b) => Some(b.to_string()),
        SqlValue::Int(i) => Some(i.to_string()),
        SqlValue::Double(d) => Some(d.to_string()),
        SqlValue::Text(s) => Some(s.clone()),
        SqlValue::Timestamp(ts) => Some(format_timestamp(ts)),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResponse {
    #[serde(default)]
    pub statement_id: Option<String>,
    #[serde(default)]
    pub status: StatementStatus,
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<ResultData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementStatus {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultManifest {
    #[serde(default)]
    pub schema: Option<ResultSchema>,
    #[serde(default)]
    pub total_chunk_count: Option<u32>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultData {
    #[serde(default)]
    pub data_array: Option<Vec<Vec<Option<String>>>>,
}

/// Error body of a non-2xx HTTP response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---- Decoding ----

/// Turn a statement response into rows, or a classified error.
pub fn decode_response(response: StatementResponse) -> Result<QueryOutput, ExecutorError> {
    match response.status.state.as_str() {
        "SUCCEEDED" => decode_success(response),
        "FAILED" => {
            let error = response.status.error.unwrap_or_default();
            Err(classify_databricks_error(
                None,
                error.error_code.as_deref(),
                error.message.as_deref().unwrap_or("statement failed"),
            ))
        }
        "CANCELED" => Err(ExecutorError::Timeout {
            message: "statement canceled after wait timeout".to_string(),
        }),
        "PENDING" | "RUNNING" => Err(ExecutorError::Timeout {
            message: format!("statement still {} after wait timeout", response.status.state),
        }),
        other => Err(ExecutorError::Unknown {
            message: format!("unexpected statement state '{other}'"),
        }),
    }
}

fn decode_success(response: StatementResponse) -> Result<QueryOutput, ExecutorError> {
    let manifest = response.manifest.unwrap_or_default();
    if manifest.total_chunk_count.unwrap_or(1) > 1 || manifest.truncated {
        return Err(ExecutorError::Unknown {
            message: "result exceeds a single inline chunk".to_string(),
        });
    }
    let descriptors = manifest.schema.unwrap_or_default().columns;
    let data = response.result.and_then(|r| r.data_array).unwrap_or_default();

    let mut rows = Vec::with_capacity(data.len());
    for raw_row in data {
        let mut values = Vec::with_capacity(descriptors.len());
        for (idx, descriptor) in descriptors.iter().enumerate() {
            let cell = raw_row.get(idx).cloned().flatten();
            values.push(decode_cell(descriptor, cell)?);
        }
        rows.push(values);
    }

    let columns: Vec<String> = descriptors.into_iter().map(|c| c.name).collect();
    let mut output = QueryOutput {
        columns,
        rows,
        affected_rows: 0,
    };
    // DML results carry their counts as a one-row result set.
    let affected = match output.first() {
        Some(row) if row.get("num_affected_rows").is_some() => Some(row.int("num_affected_rows")?),
        _ => None,
    };
    if let Some(affected) = affected {
        output.affected_rows = u64::try_from(affected).unwrap_or(0);
    }
    Ok(output)
}

fn decode_cell(column: &ColumnDescriptor, cell: Option<String>) -> Result<SqlValue, ExecutorError> {
    let Some(raw) = cell else {
        return Ok(SqlValue::Null);
    };
    let type_name = column.type_name.as_deref().unwrap_or("STRING").to_ascii_uppercase();
    let bad = |expected: &str| ExecutorError::SyntaxOrSchema {
        message: format!("column '{}': cannot decode {expected} value", column.name),
    };
    Ok(match type_name.as_str() {
        "BOOLEAN" => SqlValue::Bool(raw.eq_ignore_ascii_case("true")),
        "BYTE" | "SHORT" | "INT" | "LONG" | "TINYINT" | "SMALLINT" | "BIGINT" => {
            SqlValue::Int(raw.trim().parse().map_err(|_| bad("integer"))?)
        }
        "FLOAT" | "DOUBLE" => SqlValue::Double(raw.trim().parse().map_err(|_| bad("double"))?),
        "TIMESTAMP" | "TIMESTAMP_NTZ" => {
            SqlValue::Timestamp(parse_timestamp(&raw).ok_or_else(|| bad("timestamp"))?)
        }
        _ => SqlValue::Text(raw),
    })
}

const PERMISSION_MARKERS: &[&str] = &["PERMISSION_DENIED", "INSUFFICIENT_PERMISSIONS", "UNAUTHORIZED"];
const CONFLICT_MARKERS: &[&str] = &["ALREADY_EXISTS", "DELTA_CONCURRENT", "CONCURRENTAPPEND", "CONCURRENT_WRITE"];
const NOT_FOUND_MARKERS: &[&str] = &[
    "TABLE_OR_VIEW_NOT_FOUND",
    "SCHEMA_NOT_FOUND",
    "NO_SUCH_CATALOG",
    "CATALOG_NOT_FOUND",
    "RESOURCE_DOES_NOT_EXIST",
    "NOT_FOUND",
];
const TIMEOUT_MARKERS: &[&str] = &["CANCELED", "CANCELLED", "TIMEOUT", "DEADLINE_EXCEEDED", "TEMPORARILY_UNAVAILABLE"];
const SYNTAX_MARKERS: &[&str] = &[
    "PARSE_SYNTAX_ERROR",
    "UNRESOLVED_COLUMN",
    "DATATYPE_MISMATCH",
    "UNBOUND_SQL_PARAMETER",
    "INVALID_PARAMETER_VALUE",
    "BAD_REQUEST",
];

/// Map an HTTP status and/or Databricks error code and message onto the
/// backend-neutral kinds. Specific error classes in the message win over
/// generic codes such as `BAD_REQUEST`.
pub fn classify_databricks_error(
    http_status: Option<u16>,
    error_code: Option<&str>,
    message: &str,
) -> ExecutorError {
    let haystack = format!("{} {}", error_code.unwrap_or(""), message).to_ascii_uppercase();
    let has = |markers: &[&str]| markers.iter().any(|m| haystack.contains(m));

    let kind = if has(PERMISSION_MARKERS) || matches!(http_status, Some(401 | 403)) {
        ErrorKind::PermissionDenied
    } else if has(CONFLICT_MARKERS) || http_status == Some(409) {
        ErrorKind::Conflict
    } else if has(NOT_FOUND_MARKERS) || http_status == Some(404) {
        ErrorKind::NotFound
    } else if has(TIMEOUT_MARKERS) || matches!(http_status, Some(408 | 429 | 503 | 504)) {
        ErrorKind::Timeout
    } else if has(SYNTAX_MARKERS) || http_status == Some(400) {
        ErrorKind::SyntaxOrSchemaError
    } else {
        ErrorKind::Unknown
    };

    let message = match (http_status, error_code) {
        (Some(status), Some(code)) => format!("HTTP {status} {code}: {message}"),
        (Some(status), None) => format!("HTTP {status}: {message}"),
        (None, Some(code)) => format!("{code}: {message}"),
        (None, None) => message.to_string(),
    };
    ExecutorError::new(kind, message)
}

// ---- Executor ----

/// Executes statements on a SQL warehouse.
#[derive(Debug)]
pub struct DatabricksExecutor {
    config: DatabricksConfig,
    #[cfg(feature = "databricks")]
    client: reqwest::blocking::Client,
}

impl DatabricksExecutor {
    pub fn new(config: DatabricksConfig) -> Result<Self, ExecutorError> {
        #[cfg(feature = "databricks")]
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs()))
            .gzip(true)
            .build()
            .map_err(|e| ExecutorError::Unknown {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config,
            #[cfg(feature = "databricks")]
            client,
        })
    }

    pub fn statements_url(&self) -> String {
        format!("{}{STATEMENTS_PATH}", self.config.host.trim_end_matches('/'))
    }

    pub fn build_request(&self, statement: &Statement) -> StatementRequest {
        StatementRequest::build(
            &self.config.warehouse_id,
            self.config.wait_timeout_secs,
            statement,
        )
    }

    /// One POST per statement. Throttling (429/503) surfaces as `Timeout`
    /// and is left to the caller to retry.
    #[cfg(feature = "databricks")]
    fn send(&self, request: &StatementRequest) -> Result<QueryOutput, ExecutorError> {
        let response = self
            .client
            .post(self.statements_url())
            .bearer_auth(&self.config.token)
            .json(request)
            .send()
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    ErrorKind::Timeout
                } else {
                    ErrorKind::Unknown
                };
                ExecutorError::new(kind, format!("request to statement API failed: {e}"))
            })?;

        let status = response.status();
        if status.is_success() {
            let body: StatementResponse = response.json().map_err(|e| ExecutorError::Unknown {
                message: format!("undecodable statement response: {e}"),
            })?;
            return decode_response(body);
        }

        let body: ApiErrorBody = response.json().unwrap_or_default();
        Err(classify_databricks_error(
            Some(status.as_u16()),
            body.error_code.as_deref(),
            body.message.as_deref().unwrap_or("request rejected"),
        ))
    }
}

impl IQueryExecutor for DatabricksExecutor {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Databricks
    }

    fn execute(&self, statement: &Statement) -> Result<QueryOutput, ExecutorError> {
        tracing::debug!(
            sql = %truncate_sql(&statement.sql),
            params = statement.params.len(),
            "executing databricks statement"
        );
        let request = self.build_request(statement);

        #[cfg(feature = "databricks")]
        {
            self.send(&request)
        }

        #[cfg(not(feature = "databricks"))]
        {
            let _ = request;
            Err(ExecutorError::Unknown {
                message: "databricks feature not enabled".to_string(),
            })
        }
    }
}
