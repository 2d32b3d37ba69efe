//! PostgreSQL sink over the blocking `postgres` client.
//!
//! The loader is strictly sequential, so the synchronous client fits;
//! each batch runs through one prepared statement inside one
//! transaction, which is what makes a batch atomic.

use bytes::BytesMut;
use postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use postgres::{Client, NoTls};

use flatload_model::{TypedRow, Value};

use crate::error::SinkError;
use crate::sink::Sink;

/// Connection parameters for the destination database.
#[derive(Debug, Clone)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

/// Destination sink backed by a live PostgreSQL connection.
pub struct PostgresSink {
    client: Client,
}

impl PostgresSink {
    /// Connects to the destination.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Database`] when the connection cannot be
    /// established.
    pub fn connect(params: &ConnectParams) -> Result<Self, SinkError> {
        let client = postgres::Config::new()
            .host(&params.host)
            .port(params.port)
            .dbname(&params.dbname)
            .user(&params.user)
            .password(&params.password)
            .connect(NoTls)?;
        Ok(Self { client })
    }
}

impl Sink for PostgresSink {
    fn execute(&mut self, sql: &str) -> Result<(), SinkError> {
        self.client.batch_execute(sql)?;
        Ok(())
    }

    fn execute_many(&mut self, sql: &str, rows: &[TypedRow]) -> Result<u64, SinkError> {
        let mut transaction = self.client.transaction()?;
        let statement = transaction.prepare(sql)?;
        let mut affected = 0;
        for row in rows {
            let values: Vec<PgValue<'_>> = row.iter().map(PgValue).collect();
            let params: Vec<&(dyn ToSql + Sync)> = values
                .iter()
                .map(|value| value as &(dyn ToSql + Sync))
                .collect();
            affected += transaction.execute(&statement, &params)?;
        }
        transaction.commit()?;
        Ok(affected)
    }

    fn commit(&mut self) -> Result<(), SinkError> {
        // the client autocommits standalone statements and
        // `execute_many` commits its own transaction
        Ok(())
    }
}

/// Parameter bridge from [`Value`] to the driver's wire encoding.
#[derive(Debug)]
struct PgValue<'a>(&'a Value);

impl ToSql for PgValue<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Integer(v) => {
                if *ty == Type::INT8 {
                    v.to_sql(ty, out)
                } else if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else {
                    i32::try_from(*v)?.to_sql(ty, out)
                }
            }
            Value::Decimal(v) => v.to_sql(ty, out),
            Value::Text(v) => v.as_str().to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        [
            Type::INT2,
            Type::INT4,
            Type::INT8,
            Type::NUMERIC,
            Type::TEXT,
            Type::VARCHAR,
            Type::BPCHAR,
            Type::DATE,
            Type::TIME,
        ]
        .contains(ty)
    }

    to_sql_checked!();
}
