#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use pgtable_sync::connection::{BatchFailure, BatchStage, ColumnRow, SqlConnection};
use pgtable_sync::prelude::{Column, TableIdentity, TableState};
use regex::Regex;

/// In-memory stand-in for a PostgreSQL server.
///
/// Understands exactly the DDL the reconciler emits and answers the column
/// catalog query from its own tables. Types are normalized the way the
/// server reports them (`int` becomes `int4`).
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<BTreeMap<(String, String), Vec<(String, String)>>>,
    log: Mutex<Vec<String>>,
    fail_on: Mutex<Option<String>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later statement containing `marker` fail.
    pub fn fail_on(&self, marker: &str) {
        *self.fail_on.lock().unwrap() = Some(marker.to_string());
    }

    pub fn heal(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Every statement that ran successfully, in order.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Live `(name, udt_name)` pairs of a table.
    pub fn columns(&self, schema: &str, table: &str) -> Option<Vec<(String, String)>> {
        self.tables
            .lock()
            .unwrap()
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
    }

    fn run(
        &self,
        tables: &mut BTreeMap<(String, String), Vec<(String, String)>>,
        sql: &str,
    ) -> Result<(), sqlx::Error> {
        if let Some(marker) = self.fail_on.lock().unwrap().as_deref() {
            if sql.contains(marker) {
                return Err(sqlx::Error::Protocol(format!("rejected: {sql}")));
            }
        }

        let create = Regex::new(r#"^CREATE TABLE IF NOT EXISTS (\w+)\."(\w+)" \((.*)\)$"#).unwrap();
        let alter = Regex::new(r#"^ALTER TABLE (\w+)\."(\w+)" (.*)$"#).unwrap();
        let column = Regex::new(r#"^"(\w+)" (\w+)$"#).unwrap();
        let rename_to = Regex::new(r#"^RENAME TO "(\w+)"$"#).unwrap();
        let add = Regex::new(r#"^ADD COLUMN "(\w+)" (\w+)$"#).unwrap();
        let drop = Regex::new(r#"^DROP COLUMN "(\w+)" RESTRICT$"#).unwrap();
        let rename = Regex::new(r#"^RENAME COLUMN "(\w+)" TO "(\w+)"$"#).unwrap();
        let retype = Regex::new(r#"^ALTER COLUMN "(\w+)" TYPE (\w+) USING \("(\w+)"::(\w+)\)$"#)
            .unwrap();

        if let Some(caps) = create.captures(sql) {
            let key = (caps[1].to_string(), caps[2].to_string());
            let columns = if caps[3].is_empty() {
                Vec::new()
            } else {
                caps[3]
                    .split(", ")
                    .map(|def| {
                        let c = column.captures(def).unwrap();
                        (c[1].to_string(), normalize(&c[2]))
                    })
                    .collect()
            };
            tables.entry(key).or_insert(columns);
            return Ok(());
        }

        let caps = alter
            .captures(sql)
            .unwrap_or_else(|| panic!("unexpected statement: {sql}"));
        let key = (caps[1].to_string(), caps[2].to_string());
        let action = caps[3].to_string();

        let Some(mut columns) = tables.remove(&key) else {
            return Err(sqlx::Error::Protocol(format!("relation {} does not exist", key.1)));
        };
        let position = |columns: &[(String, String)], name: &str| {
            columns.iter().position(|(n, _)| n == name)
        };

        let outcome = if let Some(c) = rename_to.captures(&action) {
            tables.insert((key.0.clone(), c[1].to_string()), columns);
            return Ok(());
        } else if let Some(c) = add.captures(&action) {
            if position(&columns, &c[1]).is_some() {
                Err(format!("column {} already exists", &c[1]))
            } else {
                columns.push((c[1].to_string(), normalize(&c[2])));
                Ok(())
            }
        } else if let Some(c) = drop.captures(&action) {
            match position(&columns, &c[1]) {
                Some(i) => {
                    columns.remove(i);
                    Ok(())
                }
                None => Err(format!("column {} does not exist", &c[1])),
            }
        } else if let Some(c) = rename.captures(&action) {
            match position(&columns, &c[1]) {
                Some(_) if position(&columns, &c[2]).is_some() => {
                    Err(format!("column {} already exists", &c[2]))
                }
                Some(i) => {
                    columns[i].0 = c[2].to_string();
                    Ok(())
                }
                None => Err(format!("column {} does not exist", &c[1])),
            }
        } else if let Some(c) = retype.captures(&action) {
            assert_eq!(&c[1], &c[3], "USING must cast the altered column");
            assert_eq!(&c[2], &c[4], "USING must cast to the new type");
            match position(&columns, &c[1]) {
                Some(i) => {
                    columns[i].1 = normalize(&c[2]);
                    Ok(())
                }
                None => Err(format!("column {} does not exist", &c[1])),
            }
        } else {
            panic!("unexpected ALTER TABLE action: {action}");
        };

        tables.insert(key, columns);
        outcome.map_err(sqlx::Error::Protocol)
    }
}

fn normalize(column_type: &str) -> String {
    match column_type {
        "int" | "integer" => "int4".to_string(),
        "bigint" => "int8".to_string(),
        "boolean" => "bool".to_string(),
        other => other.to_string(),
    }
}

impl SqlConnection for MemoryDatabase {
    async fn execute(&self, sql: &str) -> Result<(), sqlx::Error> {
        let mut tables = self.tables.lock().unwrap();
        self.run(&mut tables, sql)?;
        self.log.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn execute_in_transaction(&self, statements: &[String]) -> Result<(), BatchFailure> {
        let mut tables = self.tables.lock().unwrap();
        let mut working = tables.clone();
        for (index, sql) in statements.iter().enumerate() {
            self.run(&mut working, sql)
                .map_err(|source| BatchFailure::new(BatchStage::Statement(index), source))?;
        }
        *tables = working;
        self.log.lock().unwrap().extend(statements.iter().cloned());
        Ok(())
    }

    async fn query_columns(&self, _sql: &str, params: &[&str]) -> Result<Vec<ColumnRow>, sqlx::Error> {
        let [schema, table] = params else {
            return Err(sqlx::Error::Protocol("expected two parameters".into()));
        };
        Ok(self
            .columns(schema, table)
            .unwrap_or_default()
            .into_iter()
            .map(|(name, udt)| ColumnRow::new(name, udt))
            .collect())
    }
}

pub fn table(name: &str, columns: &[(&str, &str)]) -> TableState {
    TableState::new(
        TableIdentity::new("public", name),
        columns
            .iter()
            .map(|(n, t)| Column::new(*n, *t))
            .collect(),
    )
}

pub fn live(db: &MemoryDatabase, name: &str) -> Vec<(String, String)> {
    db.columns("public", name)
        .unwrap_or_else(|| panic!("table {name} does not exist"))
}

pub fn pairs(columns: &[(&str, &str)]) -> Vec<(String, String)> {
    columns
        .iter()
        .map(|(n, t)| ((*n).to_string(), (*t).to_string()))
        .collect()
}
