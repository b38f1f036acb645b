use scylla::client::pager::QueryPager;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::deserialize::row::DeserializeRow;
use scylla::deserialize::TypeCheckError;
use scylla::errors::{
    ExecutionError, IntoRowsResultError, MaybeFirstRowError, NextRowError, PagerExecutionError,
    PrepareError,
};
use scylla::response::query_result::QueryResult;
use scylla::serialize::row::SerializeRow;
use scylla::statement::prepared::PreparedStatement;
use scylla::statement::Consistency;

use crate::settings::ConfigurationError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to prepare statement {0}")]
    Prepare(#[from] PrepareError),

    #[error("Failed to execute statement {0}")]
    Execution(#[from] ExecutionError),

    #[error("Failed to start paged query {0}")]
    Pager(#[from] PagerExecutionError),

    #[error("Failed to fetch next row {0}")]
    NextRow(#[from] NextRowError),

    #[error("Response is not a rows result {0}")]
    IntoRows(#[from] IntoRowsResultError),

    #[error("Failed to deserialize row {0}")]
    FirstRow(#[from] MaybeFirstRowError),

    #[error("Row does not match expected columns {0}")]
    TypeCheck(#[from] TypeCheckError),

    #[error("Stored date {0} is out of supported range")]
    DateOutOfRange(u32),

    #[error("Unexpected response {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub contact_points: Vec<String>,
    pub keyspace: String,
    pub consistency: Option<Consistency>,
}

/// Session bound to a single keyspace.
///
/// Shared by all callers without additional locking, the driver session is thread safe.
pub struct StoreSession {
    session: Session,
    keyspace: String,
    consistency: Option<Consistency>,
}

impl StoreSession {
    pub async fn connect(config: StoreConfig) -> Result<Self, ConfigurationError> {
        tracing::info!(
            "Connecting to {:?}, keyspace: {}",
            config.contact_points,
            config.keyspace
        );
        let session = SessionBuilder::new()
            .known_nodes(&config.contact_points)
            .use_keyspace(&config.keyspace, false)
            .build()
            .await?;

        Ok(Self {
            session,
            keyspace: config.keyspace,
            consistency: config.consistency,
        })
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Prepares a statement with the configured consistency applied
    pub async fn prepare(&self, cql: &str) -> Result<PreparedStatement, StoreError> {
        let mut prepared = self.session.prepare(cql).await?;
        if let Some(consistency) = self.consistency {
            prepared.set_consistency(consistency);
        }
        Ok(prepared)
    }

    pub async fn execute(
        &self,
        statement: &PreparedStatement,
        values: impl SerializeRow,
    ) -> Result<QueryResult, StoreError> {
        Ok(self.session.execute_unpaged(statement, values).await?)
    }

    /// Executes with driver side paging, pages are fetched as the pager is consumed
    pub async fn execute_iter(
        &self,
        statement: &PreparedStatement,
        values: impl SerializeRow,
    ) -> Result<QueryPager, StoreError> {
        Ok(self.session.execute_iter(statement.clone(), values).await?)
    }

    pub fn close(self) {
        tracing::info!("Closing session for keyspace {}", self.keyspace);
        drop(self.session);
    }
}

/// First row of a rows response, None for an empty result
pub fn maybe_first_row<R>(result: QueryResult) -> Result<Option<R>, StoreError>
where
    R: for<'frame> DeserializeRow<'frame, 'frame>,
{
    let rows = result.into_rows_result()?;
    Ok(rows.maybe_first_row::<R>()?)
}
