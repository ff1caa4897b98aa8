use quarry_core::{
    ColumnType, Comparison, Condition, Query, Result, StatementBuilder, StatementError, TableSpec,
    Value, write_separated,
};
use std::fmt::Write;

/// Generates postgres SQL text from query descriptors and row data.
///
/// Every statement ends with a plain `;` terminator; insert statements rely
/// on this so the orchestrator can rewrite the terminator into a
/// `RETURNING id;` clause.
pub struct PostgresStatementBuilder;

impl PostgresStatementBuilder {
    pub const fn new() -> Self {
        Self
    }

    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push('"');
        for c in value.chars() {
            if c == '"' {
                out.push('"');
            }
            out.push(c);
        }
        out.push('"');
    }

    fn write_literal(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Boolean(v) => out.push_str(if *v { "TRUE" } else { "FALSE" }),
            Value::Integer(v) => {
                let _ = write!(out, "{}", v);
            }
            Value::Float(v) => {
                let _ = write!(out, "{}", v);
            }
            Value::Text(v) => {
                out.push('\'');
                for c in v.chars() {
                    if c == '\'' {
                        out.push('\'');
                    }
                    out.push(c);
                }
                out.push('\'');
            }
        }
    }

    fn write_condition(&self, out: &mut String, condition: &Condition) {
        self.write_identifier(out, &condition.column);
        if condition.value == Value::Null {
            match condition.op {
                Comparison::Equal => {
                    out.push_str(" IS NULL");
                    return;
                }
                Comparison::NotEqual => {
                    out.push_str(" IS NOT NULL");
                    return;
                }
                _ => {}
            }
        }
        out.push_str(match condition.op {
            Comparison::Equal => " = ",
            Comparison::NotEqual => " <> ",
            Comparison::Less => " < ",
            Comparison::Greater => " > ",
            Comparison::LessEqual => " <= ",
            Comparison::GreaterEqual => " >= ",
            Comparison::Like => " LIKE ",
        });
        self.write_literal(out, &condition.value);
    }

    fn write_where(&self, out: &mut String, conditions: &[Condition]) {
        if conditions.is_empty() {
            return;
        }
        out.push_str(" WHERE ");
        write_separated(out, conditions, " AND ", |out, condition| {
            self.write_condition(out, condition)
        });
    }

    fn column_type(&self, ty: ColumnType) -> &'static str {
        match ty {
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMP WITH TIME ZONE",
            ColumnType::Serial => "BIGSERIAL",
        }
    }
}

impl StatementBuilder for PostgresStatementBuilder {
    fn select(&self, query: &Query) -> Result<String> {
        if query.table.is_empty() {
            return Err(StatementError("select needs a target table".into()).into());
        }
        let mut sql = String::with_capacity(128);
        if query.opts.count {
            sql.push_str("SELECT COUNT(*) AS count FROM ");
        } else {
            sql.push_str("SELECT * FROM ");
        }
        self.write_identifier(&mut sql, &query.table);
        self.write_where(&mut sql, &query.conditions);
        if !query.opts.count {
            if let Some(limit) = query.opts.limit {
                let _ = write!(sql, " LIMIT {}", limit);
            }
        }
        sql.push(';');
        Ok(sql)
    }

    fn insert(&self, table: &str, row: &[(String, Value)], autoincrement: bool) -> Result<String> {
        if table.is_empty() {
            return Err(StatementError("insert needs a target table".into()).into());
        }
        let row: Vec<&(String, Value)> = row
            .iter()
            .filter(|(column, _)| !(autoincrement && column == "id"))
            .collect();
        if row.is_empty() {
            return Err(StatementError("insert needs at least one column".into()).into());
        }
        let mut sql = String::with_capacity(128);
        sql.push_str("INSERT INTO ");
        self.write_identifier(&mut sql, table);
        sql.push_str(" (");
        write_separated(&mut sql, &row, ", ", |out, (column, _)| {
            self.write_identifier(out, column)
        });
        sql.push_str(") VALUES (");
        write_separated(&mut sql, &row, ", ", |out, (_, value)| {
            self.write_literal(out, value)
        });
        sql.push_str(");");
        Ok(sql)
    }

    fn update(&self, row: &[(String, Value)], query: &Query) -> Result<String> {
        if query.table.is_empty() {
            return Err(StatementError("update needs a target table".into()).into());
        }
        if row.is_empty() {
            return Err(StatementError("update needs at least one assignment".into()).into());
        }
        let mut sql = String::with_capacity(128);
        sql.push_str("UPDATE ");
        self.write_identifier(&mut sql, &query.table);
        sql.push_str(" SET ");
        write_separated(&mut sql, row, ", ", |out, (column, value)| {
            self.write_identifier(out, column);
            out.push_str(" = ");
            self.write_literal(out, value);
        });
        self.write_where(&mut sql, &query.conditions);
        sql.push(';');
        Ok(sql)
    }

    fn delete(&self, query: &Query) -> Result<String> {
        if query.table.is_empty() {
            return Err(StatementError("delete needs a target table".into()).into());
        }
        let mut sql = String::with_capacity(64);
        sql.push_str("DELETE FROM ");
        self.write_identifier(&mut sql, &query.table);
        self.write_where(&mut sql, &query.conditions);
        sql.push(';');
        Ok(sql)
    }

    fn create_table(&self, tables: &[TableSpec]) -> Result<String> {
        if tables.is_empty() {
            return Err(StatementError("create table needs at least one table".into()).into());
        }
        for table in tables {
            if table.columns.is_empty() {
                return Err(StatementError(format!(
                    "table `{}` needs at least one column",
                    table.name
                ))
                .into());
            }
        }
        let mut sql = String::with_capacity(256);
        write_separated(&mut sql, tables, "\n", |out, table| {
            out.push_str("CREATE TABLE ");
            self.write_identifier(out, &table.name);
            out.push_str(" (");
            write_separated(out, &table.columns, ", ", |out, column| {
                self.write_identifier(out, &column.name);
                out.push(' ');
                out.push_str(self.column_type(column.ty));
                if column.primary_key {
                    out.push_str(" PRIMARY KEY");
                }
            });
            out.push_str(");");
        });
        Ok(sql)
    }

    fn drop_table(&self, names: &[&str]) -> Result<String> {
        if names.is_empty() {
            return Err(StatementError("drop table needs at least one table".into()).into());
        }
        let mut sql = String::with_capacity(64);
        write_separated(&mut sql, names, "\n", |out, name| {
            out.push_str("DROP TABLE IF EXISTS ");
            self.write_identifier(out, name);
            out.push(';');
        });
        Ok(sql)
    }
}
