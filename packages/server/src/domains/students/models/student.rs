use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{FromRow, MySql, MySqlConnection, Row, TypeInfo, ValueRef};

use crate::common::ApiError;

/// A row of the `estudiantes` table.
///
/// The table belongs to the database, so decoding accepts any numeric
/// column type for `nota_final` and a signed or unsigned `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub carnet: Option<String>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub nota_final: Option<Decimal>,
}

impl<'r> FromRow<'r, MySqlRow> for Student {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: decode_id(row, "id")?,
            nombre: row.try_get("nombre")?,
            apellido: row.try_get("apellido")?,
            carnet: row.try_get("carnet")?,
            nota_final: decode_grade(row, "nota_final")?,
        })
    }
}

fn decode_id(row: &MySqlRow, column: &str) -> Result<i64, sqlx::Error> {
    match row.try_get::<i64, _>(column) {
        Ok(id) => Ok(id),
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let id: u64 = row.try_get(column)?;
            i64::try_from(id).map_err(|e| sqlx::Error::ColumnDecode {
                index: column.to_string(),
                source: Box::new(e),
            })
        }
        Err(e) => Err(e),
    }
}

/// Decode a DECIMAL, FLOAT, DOUBLE or integer column as a decimal.
fn decode_grade(row: &MySqlRow, column: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let raw = row.try_get_raw(column)?;
    if raw.is_null() {
        return Ok(None);
    }
    let type_name = raw.type_info().name().to_string();

    let grade = match type_name.as_str() {
        name if name.starts_with("FLOAT") => {
            decimal_from_float(column, row.try_get::<f32, _>(column)?)?
        }
        name if name.starts_with("DOUBLE") => {
            decimal_from_float(column, row.try_get::<f64, _>(column)?)?
        }
        name if name.contains("INT") && name.ends_with("UNSIGNED") => {
            Decimal::from(row.try_get::<u64, _>(column)?)
        }
        name if name.contains("INT") || name == "BOOLEAN" => {
            Decimal::from(row.try_get::<i64, _>(column)?)
        }
        _ => row.try_get::<Decimal, _>(column)?,
    };

    Ok(Some(grade))
}

/// Convert through the shortest round-trip text so a FLOAT `0.1` stays `0.1`.
fn decimal_from_float<F: Display>(column: &str, value: F) -> Result<Decimal, sqlx::Error> {
    let text = value.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

/// A JSON scalar ready to be bound as a statement parameter.
///
/// Field values are not type-checked; the column types of the table decide
/// what is accepted.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    fn from_json(field: &str, value: &Value) -> Result<Self, ApiError> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Integer(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(FieldValue::Unsigned(u))
                } else {
                    n.as_f64().map(FieldValue::Float).ok_or_else(|| {
                        ApiError::InvalidParameters(format!(
                            "Valor numérico no soportado para '{}'",
                            field
                        ))
                    })
                }
            }
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(ApiError::InvalidParameters(format!(
                "Tipo no soportado para el campo '{}'",
                field
            ))),
        }
    }

    fn bind<'q>(
        &self,
        query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        match self {
            FieldValue::Null => query.bind(None::<String>),
            FieldValue::Bool(b) => query.bind(*b),
            FieldValue::Integer(i) => query.bind(*i),
            FieldValue::Unsigned(u) => query.bind(*u),
            FieldValue::Float(f) => query.bind(*f),
            FieldValue::Text(s) => query.bind(s.clone()),
        }
    }
}

/// The four mutable fields of a student, as supplied by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInput {
    pub nombre: FieldValue,
    pub apellido: FieldValue,
    pub carnet: FieldValue,
    pub nota_final: FieldValue,
}

impl StudentInput {
    /// Build statement parameters from a request body.
    ///
    /// Every field is required here; a missing key is a parameter construction
    /// failure, not a validation failure.
    pub fn from_json(body: &Value) -> Result<Self, ApiError> {
        let object = body.as_object().ok_or_else(|| {
            ApiError::InvalidParameters("El cuerpo debe ser un objeto JSON".to_string())
        })?;

        let field = |name: &str| -> Result<FieldValue, ApiError> {
            let value = object
                .get(name)
                .ok_or_else(|| ApiError::InvalidParameters(format!("Falta el campo '{}'", name)))?;
            FieldValue::from_json(name, value)
        };

        Ok(Self {
            nombre: field("nombre")?,
            apellido: field("apellido")?,
            carnet: field("carnet")?,
            nota_final: field("nota_final")?,
        })
    }

    fn bind_all<'q>(
        &self,
        query: Query<'q, MySql, MySqlArguments>,
    ) -> Query<'q, MySql, MySqlArguments> {
        let query = self.nombre.bind(query);
        let query = self.apellido.bind(query);
        let query = self.carnet.bind(query);
        self.nota_final.bind(query)
    }
}

impl Student {
    /// All students, most recently created first
    pub async fn find_all(conn: &mut MySqlConnection) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, nombre, apellido, carnet, nota_final
            FROM estudiantes
            ORDER BY id DESC
            "#,
        )
        .fetch_all(conn)
        .await
    }

    /// Whether a student with this id exists, without decoding the row.
    pub async fn exists(id: u64, conn: &mut MySqlConnection) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM estudiantes WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn find_by_id(
        id: u64,
        conn: &mut MySqlConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, nombre, apellido, carnet, nota_final
            FROM estudiantes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Insert a student and return the identifier assigned by the database.
    pub async fn create(input: &StudentInput, conn: &mut MySqlConnection) -> Result<u64, sqlx::Error> {
        let query = sqlx::query(
            r#"
            INSERT INTO estudiantes (nombre, apellido, carnet, nota_final)
            VALUES (?, ?, ?, ?)
            "#,
        );

        let result = input.bind_all(query).execute(conn).await?;
        Ok(result.last_insert_id())
    }

    /// Replace all mutable fields of a student.
    pub async fn update(
        id: u64,
        input: &StudentInput,
        conn: &mut MySqlConnection,
    ) -> Result<(), sqlx::Error> {
        let query = sqlx::query(
            r#"
            UPDATE estudiantes
            SET nombre = ?, apellido = ?, carnet = ?, nota_final = ?
            WHERE id = ?
            "#,
        );

        input.bind_all(query).bind(id).execute(conn).await?;
        Ok(())
    }

    pub async fn delete(id: u64, conn: &mut MySqlConnection) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM estudiantes WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
