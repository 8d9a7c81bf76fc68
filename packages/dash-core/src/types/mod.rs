//! Column types, cell values, and load-time coercion.

mod coercion;
mod column_type;
mod value;

pub use coercion::{coerce_date_columns, parse_temporal};
pub use column_type::ColumnType;
pub use value::Value;
