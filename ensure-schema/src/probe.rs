//! Connectivity smoke test: connect, run one query, show a few rows.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info};

use ensure_core::Connector;

use crate::connector::SchemaConnector;
use crate::error::{Result, SchemaError};

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub query: String,
    pub rows: Vec<String>,
    pub connect_ms: u64,
    pub query_ms: u64,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Connect through `connector`, run `query` and collect up to `limit` rows.
pub async fn smoke_test(connector: &SchemaConnector, query: &str, limit: usize) -> Result<ProbeReport> {
    let started = Instant::now();
    if !connector.authenticate().await {
        return Err(SchemaError::NotConnected);
    }
    let connect_ms = millis(started.elapsed());

    let started = Instant::now();
    let rows = connector.sample_rows(query, limit).await;
    let query_ms = millis(started.elapsed());
    connector.close().await;

    match rows {
        Ok(rows) => {
            for row in &rows {
                info!(value = %row, "Row");
            }
            info!(rows = rows.len(), connect_ms, query_ms, "Probe query succeeded");
            Ok(ProbeReport {
                query: query.to_string(),
                rows,
                connect_ms,
                query_ms,
            })
        }
        Err(e) => {
            error!(query = %query, error = %e, "Probe query failed");
            Err(e)
        }
    }
}
