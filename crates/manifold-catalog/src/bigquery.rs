//! BigQuery-backed schema source and loader
//!
//! The schema source reads the flat data model table; the loader
//! replaces one destination table per component with an explicit schema
//! (write-truncate, no type autodetection).
//!
//! ## Authentication
//!
//! Both clients support:
//! 1. Service account JSON file (explicit path)
//! 2. Application Default Credentials (ADC)
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Using ADC
//! let source = BigQuerySchemaSource::with_adc("htan-dcc", "metadata", "data-model").await?;
//! let loader = BigQueryLoader::with_adc().await?;
//! ```

use crate::source::{
    FetchError, LoadError, SchemaSource, TableIdentifier, TableLoader,
};
use async_trait::async_trait;
use manifold_core::{FieldType, Table, TableSchema};
use manifold_model::DataModelRow;

#[cfg(feature = "bigquery")]
use gcp_bigquery_client::{
    model::query_request::QueryRequest,
    model::query_response::ResultSet,
    model::table::Table as BqTable,
    model::table_data_insert_all_request::TableDataInsertAllRequest,
    model::table_field_schema::TableFieldSchema,
    model::table_schema::TableSchema as BqTableSchema,
    Client as BigQueryClient,
};

#[cfg(feature = "bigquery")]
const INSERT_BATCH_SIZE: usize = 500;

fn split_list(cell: Option<String>) -> Vec<String> {
    cell.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(feature = "bigquery")]
async fn connect_adc() -> Result<BigQueryClient, FetchError> {
    BigQueryClient::from_application_default_credentials()
        .await
        .map_err(|e| {
            FetchError::AuthenticationError(format!(
                "Failed to authenticate with ADC: {}. \
                 Ensure GOOGLE_APPLICATION_CREDENTIALS is set or run \
                 'gcloud auth application-default login'",
                e
            ))
        })
}

#[cfg(feature = "bigquery")]
async fn connect_service_account(key_path: &str) -> Result<BigQueryClient, FetchError> {
    BigQueryClient::from_service_account_key_file(key_path)
        .await
        .map_err(|e| {
            FetchError::AuthenticationError(format!(
                "Failed to read service account key file '{}': {}",
                key_path, e
            ))
        })
}

/// Schema source reading the data model table from BigQuery
pub struct BigQuerySchemaSource {
    /// Fully qualified data model table
    table: TableIdentifier,

    /// BigQuery client (only available with bigquery feature)
    #[cfg(feature = "bigquery")]
    client: BigQueryClient,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "bigquery"))]
    _phantom: std::marker::PhantomData<()>,
}

impl BigQuerySchemaSource {
    /// Create a schema source using Application Default Credentials
    #[cfg(feature = "bigquery")]
    pub async fn with_adc(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            table: TableIdentifier::new(project, dataset, table),
            client: connect_adc().await?,
        })
    }

    /// Create a source without the bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let _ = TableIdentifier::new(project, dataset, table);
        Err(FetchError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        ))
    }

    /// Create a schema source using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        let key_path = key_path.as_ref().to_string_lossy().to_string();
        Ok(Self {
            table: TableIdentifier::new(project, dataset, table),
            client: connect_service_account(&key_path).await?,
        })
    }

    /// Create a source without the bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
        _key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, FetchError> {
        Self::with_adc(project, dataset, table).await
    }
}

#[async_trait]
impl SchemaSource for BigQuerySchemaSource {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn fetch_data_model(&self) -> Result<Vec<DataModelRow>, FetchError> {
        let query = format!(
            "SELECT Attribute, DependsOn, Valid_Values, Description FROM `{}`",
            self.table.fqn()
        );

        let request = QueryRequest::new(query);
        let response = self
            .client
            .job()
            .query(&self.table.project, request)
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("Not found") {
                    FetchError::SourceNotFound(self.table.fqn())
                } else if err_str.contains("Access Denied") || err_str.contains("Permission") {
                    FetchError::PermissionDenied(format!(
                        "Cannot access {}: {}",
                        self.table.fqn(),
                        err_str
                    ))
                } else {
                    FetchError::QueryError(err_str)
                }
            })?;

        let mut rows = Vec::new();
        let mut rs = ResultSet::new_from_query_response(response);

        while rs.next_row() {
            let attribute = rs
                .get_string_by_name("Attribute")
                .map_err(|e| FetchError::InvalidResponse(format!("Failed to get Attribute: {}", e)))?;
            let Some(attribute) = attribute else { continue };

            let depends_on = rs
                .get_string_by_name("DependsOn")
                .map_err(|e| FetchError::InvalidResponse(format!("Failed to get DependsOn: {}", e)))?;
            let valid_values = rs.get_string_by_name("Valid_Values").map_err(|e| {
                FetchError::InvalidResponse(format!("Failed to get Valid_Values: {}", e))
            })?;
            let description = rs.get_string_by_name("Description").map_err(|e| {
                FetchError::InvalidResponse(format!("Failed to get Description: {}", e))
            })?;

            rows.push(DataModelRow::new(
                attribute,
                split_list(depends_on),
                split_list(valid_values),
                description,
            ));
        }

        Ok(rows)
    }

    #[cfg(not(feature = "bigquery"))]
    async fn fetch_data_model(&self) -> Result<Vec<DataModelRow>, FetchError> {
        Err(FetchError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        ))
    }
}

/// Loader replacing destination tables in BigQuery
pub struct BigQueryLoader {
    /// BigQuery client (only available with bigquery feature)
    #[cfg(feature = "bigquery")]
    client: BigQueryClient,

    /// Placeholder for when feature is disabled
    #[cfg(not(feature = "bigquery"))]
    _phantom: std::marker::PhantomData<()>,
}

impl BigQueryLoader {
    /// Create a loader using Application Default Credentials
    #[cfg(feature = "bigquery")]
    pub async fn with_adc() -> Result<Self, LoadError> {
        let client = connect_adc()
            .await
            .map_err(|e| LoadError::AuthenticationError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a loader without the bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn with_adc() -> Result<Self, LoadError> {
        Err(LoadError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        ))
    }

    /// Create a loader using a service account key file
    #[cfg(feature = "bigquery")]
    pub async fn from_service_account_file(
        key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, LoadError> {
        let key_path = key_path.as_ref().to_string_lossy().to_string();
        let client = connect_service_account(&key_path)
            .await
            .map_err(|e| LoadError::AuthenticationError(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a loader without the bigquery feature (returns error)
    #[cfg(not(feature = "bigquery"))]
    pub async fn from_service_account_file(
        _key_path: impl AsRef<std::path::Path>,
    ) -> Result<Self, LoadError> {
        Self::with_adc().await
    }

    /// Map a destination schema onto BigQuery field definitions
    #[cfg(feature = "bigquery")]
    fn bq_schema(schema: &TableSchema) -> BqTableSchema {
        let fields = schema
            .fields
            .iter()
            .map(|field| {
                let mut bq_field = match field.field_type {
                    FieldType::String => TableFieldSchema::string(&field.name),
                    FieldType::Integer => TableFieldSchema::integer(&field.name),
                };
                bq_field.description = Some(field.description.clone());
                bq_field
            })
            .collect();

        BqTableSchema::new(fields)
    }
}

#[async_trait]
impl TableLoader for BigQueryLoader {
    fn name(&self) -> &'static str {
        "BigQuery"
    }

    #[cfg(feature = "bigquery")]
    async fn load(
        &self,
        table: &Table,
        schema: &TableSchema,
        destination: &TableIdentifier,
    ) -> Result<(), LoadError> {
        // Write-truncate: drop any previous version of the table, then
        // recreate it with the explicit schema.
        let _ = self
            .client
            .table()
            .delete(&destination.project, &destination.dataset, &destination.table)
            .await;

        self.client
            .table()
            .create(BqTable::new(
                &destination.project,
                &destination.dataset,
                &destination.table,
                Self::bq_schema(schema),
            ))
            .await
            .map_err(|e| LoadError::Rejected(format!("{}: {}", destination.fqn(), e)))?;

        for chunk in table.rows().chunks(INSERT_BATCH_SIZE) {
            let mut request = TableDataInsertAllRequest::new();
            for row in chunk {
                let mut object = serde_json::Map::new();
                for (field, cell) in schema.fields.iter().zip(row) {
                    let value = match cell {
                        Some(text) => serde_json::Value::String(text.clone()),
                        None => serde_json::Value::Null,
                    };
                    object.insert(field.name.clone(), value);
                }
                request
                    .add_row(None, serde_json::Value::Object(object))
                    .map_err(|e| LoadError::WriteError(e.to_string()))?;
            }

            self.client
                .tabledata()
                .insert_all(
                    &destination.project,
                    &destination.dataset,
                    &destination.table,
                    request,
                )
                .await
                .map_err(|e| LoadError::WriteError(format!("{}: {}", destination.fqn(), e)))?;
        }

        Ok(())
    }

    #[cfg(not(feature = "bigquery"))]
    async fn load(
        &self,
        _table: &Table,
        _schema: &TableSchema,
        _destination: &TableIdentifier,
    ) -> Result<(), LoadError> {
        Err(LoadError::ConfigError(
            "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                .to_string(),
        ))
    }
}
