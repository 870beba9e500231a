use std::{env, time::Duration};

/// Access-layer configuration, resolved once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Table holding every entity (default: "Twitter")
    pub table_name: String,
    /// Name of the overloaded secondary index (default: "GSI1")
    pub index_name: String,
    /// AWS region (default: "us-west-2")
    pub region: String,
    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local
    pub endpoint_url: Option<String>,
    /// Deadline applied to each access-layer operation (default: 5s)
    pub operation_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `TABLE_NAME`
    /// - `GSI1_INDEX_NAME`
    /// - `AWS_REGION`
    /// - `DYNAMODB_ENDPOINT_URL`
    /// - `OPERATION_TIMEOUT_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolve every setting through `lookup`, falling back to the defaults.
    /// An unparsable `OPERATION_TIMEOUT_MS` keeps the default deadline.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new("Twitter");
        Self {
            table_name: lookup("TABLE_NAME").unwrap_or(defaults.table_name),
            index_name: lookup("GSI1_INDEX_NAME").unwrap_or(defaults.index_name),
            region: lookup("AWS_REGION").unwrap_or(defaults.region),
            endpoint_url: lookup("DYNAMODB_ENDPOINT_URL"),
            operation_timeout: lookup("OPERATION_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.operation_timeout),
        }
    }

    /// Defaults for everything but the table name.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: "GSI1".to_string(),
            region: "us-west-2".to_string(),
            endpoint_url: None,
            operation_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}
