//! PostgreSQL warehouse over `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, PgConnection, Postgres, Row};

use dash_core::table::{Column, Table};
use dash_core::types::{ColumnType, Value};
use dash_core::DashError;

use crate::config::WarehouseConfig;
use crate::source::{Warehouse, WarehouseSession};
use crate::sql::{PointUpdate, SelectColumn, SelectQuery};

const COLUMNS_SQL: &str = "SELECT column_name::text, data_type::text \
     FROM information_schema.columns \
     WHERE table_schema = $1 AND table_name = $2 \
     ORDER BY ordinal_position";

/// Warehouse reached through a fresh `PgConnection` per session.
#[derive(Debug, Clone)]
pub struct PgWarehouse {
    config: WarehouseConfig,
}

impl PgWarehouse {
    pub fn new(config: WarehouseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.database)
            .options([("search_path", self.config.schema.as_str())])
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn connect(&self) -> Result<Box<dyn WarehouseSession>, DashError> {
        let conn = PgConnection::connect_with(&self.connect_options())
            .await
            .map_err(|e| DashError::ConnectionError(e.to_string()))?;
        Ok(Box::new(PgSession { conn }))
    }

    fn schema(&self) -> &str {
        &self.config.schema
    }

    fn describe(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.config.user, self.config.host, self.config.port, self.config.database
        )
    }
}

struct PgSession {
    conn: PgConnection,
}

/// A result column with the declared database type it came from.
struct SourceColumn {
    name: String,
    data_type: String,
    column_type: ColumnType,
}

impl PgSession {
    async fn source_columns(&mut self, query: &SelectQuery) -> Result<Vec<SourceColumn>, DashError> {
        let rows = sqlx::query(COLUMNS_SQL)
            .bind(&query.schema)
            .bind(&query.table)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| DashError::ConnectionError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get(0).map_err(decode_error)?;
                let data_type: String = row.try_get(1).map_err(decode_error)?;
                Ok(SourceColumn {
                    name,
                    column_type: column_type_for(&data_type),
                    data_type,
                })
            })
            .collect()
    }
}

#[async_trait]
impl WarehouseSession for PgSession {
    async fn fetch_table(&mut self, query: &SelectQuery) -> Result<Table, DashError> {
        let columns = self.source_columns(query).await?;
        if columns.is_empty() {
            return Err(DashError::TableNotFound {
                table: format!("{}.{}", query.schema, query.table),
            });
        }

        let rows = sqlx::query(&query.to_sql_with_columns(&select_list(&columns)))
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| DashError::ConnectionError(e.to_string()))?;

        let mut undecodable = 0usize;
        let data: Vec<Vec<Value>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, column)| {
                        decode_cell(row, idx, column).unwrap_or_else(|e| {
                            undecodable += 1;
                            tracing::trace!("Undecodable cell in '{}': {}", column.name, e);
                            Value::Null
                        })
                    })
                    .collect()
            })
            .collect();

        if undecodable > 0 {
            tracing::warn!(
                "{} cells of '{}' could not be decoded and were loaded as null",
                undecodable,
                query.table
            );
        }

        Table::from_rows(
            query.table.clone(),
            columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.column_type))
                .collect(),
            data,
        )
    }

    async fn execute_update(&mut self, update: &PointUpdate) -> Result<u64, DashError> {
        // Text keys may come from uuid or other text-cast columns.
        let sql = match update.key {
            Value::Text(_) => update.to_sql_text_key(),
            _ => update.to_sql(),
        };
        let mut query = sqlx::query(&sql);
        for field in &update.assignments {
            query = bind_value(query, &field.value, field.column_type);
        }
        let key_type = update.key.column_type().unwrap_or(ColumnType::Text);
        query = bind_value(query, &update.key, key_type);

        let result = query
            .execute(&mut self.conn)
            .await
            .map_err(|e| DashError::WriteError(e.to_string()))?;
        Ok(result.rows_affected())
    }

    async fn close(self: Box<Self>) -> Result<(), DashError> {
        self.conn
            .close()
            .await
            .map_err(|e| DashError::ConnectionError(e.to_string()))
    }
}

/// Columns without a native mapping are read as text so they decode.
fn select_list(columns: &[SourceColumn]) -> Vec<SelectColumn> {
    columns
        .iter()
        .map(|column| SelectColumn {
            name: column.name.clone(),
            as_text: column.column_type == ColumnType::Text,
        })
        .collect()
}

/// Maps an `information_schema` data type to a column type.
fn column_type_for(data_type: &str) -> ColumnType {
    match data_type {
        "smallint" | "integer" | "bigint" => ColumnType::Integer,
        "real" | "double precision" | "numeric" => ColumnType::Float,
        "boolean" => ColumnType::Boolean,
        "date" | "timestamp without time zone" | "timestamp with time zone" => {
            ColumnType::Temporal
        }
        _ => ColumnType::Text,
    }
}

fn decode_cell(row: &PgRow, idx: usize, column: &SourceColumn) -> Result<Value, sqlx::Error> {
    let value = match column.data_type.as_str() {
        "smallint" => row.try_get::<Option<i16>, _>(idx)?.map(|v| Value::Integer(v.into())),
        "integer" => row.try_get::<Option<i32>, _>(idx)?.map(|v| Value::Integer(v.into())),
        "bigint" => row.try_get::<Option<i64>, _>(idx)?.map(Value::Integer),
        "real" => row.try_get::<Option<f32>, _>(idx)?.map(|v| Value::Float(v.into())),
        "double precision" => row.try_get::<Option<f64>, _>(idx)?.map(Value::Float),
        "numeric" => row
            .try_get::<Option<Decimal>, _>(idx)?
            .and_then(|v| v.to_f64())
            .map(Value::Float),
        "boolean" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Boolean),
        "date" => row
            .try_get::<Option<NaiveDate>, _>(idx)?
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Value::Temporal),
        "timestamp without time zone" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(Value::Temporal),
        "timestamp with time zone" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|t| Value::Temporal(t.naive_utc())),
        _ => row.try_get::<Option<String>, _>(idx)?.map(Value::Text),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Binds a value with the SQL type of its column, so nulls stay typed.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
    column_type: ColumnType,
) -> Query<'q, Postgres, PgArguments> {
    match (value, column_type) {
        (Value::Integer(v), _) => query.bind(*v),
        (Value::Float(v), _) => query.bind(*v),
        (Value::Boolean(v), _) => query.bind(*v),
        (Value::Text(v), _) => query.bind(v.clone()),
        (Value::Temporal(v), _) => query.bind(*v),
        (Value::Null, ColumnType::Integer) => query.bind(None::<i64>),
        (Value::Null, ColumnType::Float) => query.bind(None::<f64>),
        (Value::Null, ColumnType::Boolean) => query.bind(None::<bool>),
        (Value::Null, ColumnType::Temporal) => query.bind(None::<NaiveDateTime>),
        (Value::Null, ColumnType::Text) => query.bind(None::<String>),
    }
}

fn decode_error(error: sqlx::Error) -> DashError {
    DashError::SerializationError(error.to_string())
}
