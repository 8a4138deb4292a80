//! In-memory storage engine.
//!
//! The store holds one table per list. Columns are typed with the [`ScalarType`] chosen by each
//! field, and the store enforces that representation, as well as not-null and unique constraints,
//! the way the relational engines it stands in for do. Ordering places nulls the way the
//! configured [`DatabaseProvider`] does.

use super::{
    fields::{FieldMode, IndexKind, ScalarType},
    filter::{FieldCondition, Filter},
    provider::DatabaseProvider,
    schema::types::OrderDirection,
    value::Value,
};
use async_std::sync::{Arc, RwLock};
use indexmap::IndexMap;
use snafu::Snafu;
use std::cmp::Ordering;
use std::collections::hash_map::{Entry, HashMap};

/// Errors returned by the store.
#[derive(Clone, Debug, Snafu, PartialEq, Eq)]
pub enum Error {
    #[snafu(display("the database connection is closed"))]
    Closed,
    #[snafu(display("table {table} already exists"))]
    TableExists { table: String },
    #[snafu(display("no such table {table}"))]
    NoSuchTable { table: String },
    #[snafu(display("table {table} has no column {column}"))]
    NoSuchColumn { table: String, column: String },
    #[snafu(display("null value in column {table}.{column} violates not-null constraint"))]
    NotNull { table: String, column: String },
    #[snafu(display("unique constraint failed on the fields: ({column})"))]
    Unique { table: String, column: String },
    #[snafu(display("column {table}.{column} holds {expected} values, got {value:?}"))]
    Representation {
        table: String,
        column: String,
        expected: ScalarType,
        value: Value,
    },
    #[snafu(display("no row in {table} with id {id:?}"))]
    NotFound { table: String, id: Value },
}

/// How a table generates row ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// Collision resistant string ids.
    #[default]
    Cuid,
    /// Sequential integers starting from 1.
    Autoincrement,
}

/// A column definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub scalar: ScalarType,
    pub mode: FieldMode,
    pub index: Option<IndexKind>,
    pub default: Option<Value>,
}

/// A table definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub id: IdKind,
    pub columns: Vec<Column>,
}

/// A row in a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: Value,
    values: IndexMap<String, Value>,
}

impl Row {
    /// The value of `column`, with the id available as column `id`.
    pub fn get(&self, column: &str) -> &Value {
        if column == "id" {
            return &self.id;
        }
        self.values.get(column).unwrap_or(&Value::Null)
    }

    fn test(&self, cond: &Condition) -> bool {
        match cond {
            Condition::All(conds) => conds.iter().all(|cond| self.test(cond)),
            Condition::Any(conds) => conds.iter().any(|cond| self.test(cond)),
            Condition::Not(cond) => !self.test(cond),
            Condition::Field { column, condition } => condition.matches(self.get(column)),
        }
    }
}

/// A condition selecting rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Every condition holds. Holds trivially if there are none.
    All(Vec<Condition>),
    /// Some condition holds.
    Any(Vec<Condition>),
    Not(Box<Condition>),
    Field {
        column: String,
        condition: FieldCondition,
    },
}

impl Default for Condition {
    fn default() -> Self {
        Self::All(vec![])
    }
}

impl Condition {
    /// Select the row with the given id.
    pub fn id(id: impl Into<Value>) -> Self {
        Self::column_equals("id", id)
    }

    /// Select rows where `column` equals `value`.
    pub fn column_equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            column: column.into(),
            condition: FieldCondition::Filter(Filter::equals(value)),
        }
    }
}

/// Order rows by a column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: OrderDirection,
}

/// A query selecting a page of rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub condition: Condition,
    pub order_by: Vec<OrderBy>,
    pub skip: usize,
    pub take: Option<usize>,
}

#[derive(Debug)]
struct Table {
    schema: TableSchema,
    rows: Vec<Row>,
    next_id: u64,
}

impl Table {
    fn column(&self, name: &str) -> Result<&Column, Error> {
        self.schema
            .columns
            .iter()
            .find(|col| col.name == name)
            .ok_or_else(|| Error::NoSuchColumn {
                table: self.schema.name.clone(),
                column: name.into(),
            })
    }

    fn generate_id(&mut self) -> Value {
        self.next_id += 1;
        match self.schema.id {
            IdKind::Autoincrement => Value::Int(self.next_id as i64),
            IdKind::Cuid => {
                let digest = md5::compute(format!("{}:{}", self.schema.name, self.next_id));
                Value::String(format!("c{digest:x}")[..25].to_string())
            }
        }
    }

    /// Check `values` against the column definitions, for a row with id `id`.
    fn check(&self, id: &Value, values: &IndexMap<String, Value>) -> Result<(), Error> {
        let table = &self.schema.name;
        for (name, value) in values {
            let col = self.column(name)?;
            let representable = matches!(
                (col.scalar, value),
                (_, Value::Null)
                    | (ScalarType::Int, Value::Int(_))
                    | (ScalarType::String, Value::String(_))
                    | (ScalarType::DateTime, Value::DateTime(_))
            );
            if !representable {
                return Err(Error::Representation {
                    table: table.clone(),
                    column: name.clone(),
                    expected: col.scalar,
                    value: value.clone(),
                });
            }
            if value.is_null() {
                if col.mode == FieldMode::Required {
                    return Err(Error::NotNull {
                        table: table.clone(),
                        column: name.clone(),
                    });
                }
                continue;
            }
            if col.index == Some(IndexKind::Unique)
                && self
                    .rows
                    .iter()
                    .any(|row| row.id != *id && row.get(name) == value)
            {
                return Err(Error::Unique {
                    table: table.clone(),
                    column: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Db {
    provider: DatabaseProvider,
    open: bool,
    tables: HashMap<String, Table>,
}

impl Db {
    fn table(&self, name: &str) -> Result<&Table, Error> {
        if !self.open {
            return Err(Error::Closed);
        }
        self.tables.get(name).ok_or_else(|| Error::NoSuchTable {
            table: name.into(),
        })
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table, Error> {
        if !self.open {
            return Err(Error::Closed);
        }
        self.tables.get_mut(name).ok_or_else(|| Error::NoSuchTable {
            table: name.into(),
        })
    }
}

/// A connection to an in-memory database.
///
/// Clones share the same database.
#[derive(Clone, Debug)]
pub struct Store(Arc<RwLock<Db>>);

impl Store {
    /// Create a fresh, empty, closed database emulating `provider`.
    pub fn new(provider: DatabaseProvider) -> Self {
        Self(Arc::new(RwLock::new(Db {
            provider,
            open: false,
            tables: Default::default(),
        })))
    }

    pub async fn open(&self) {
        self.0.write().await.open = true;
    }

    pub async fn close(&self) {
        self.0.write().await.open = false;
    }

    pub async fn is_open(&self) -> bool {
        self.0.read().await.open
    }

    /// Create a table.
    ///
    /// Tables can be created while the store is closed, before any connection is made.
    pub async fn create_table(&self, schema: TableSchema) -> Result<(), Error> {
        let mut db = self.0.write().await;
        match db.tables.entry(schema.name.clone()) {
            Entry::Occupied(e) => Err(Error::TableExists {
                table: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                tracing::debug!(table = %schema.name, "creating table");
                e.insert(Table {
                    schema,
                    rows: vec![],
                    next_id: 0,
                });
                Ok(())
            }
        }
    }

    /// Insert a row, applying column defaults to omitted columns.
    pub async fn insert(
        &self,
        table: &str,
        values: IndexMap<String, Value>,
    ) -> Result<Row, Error> {
        let mut db = self.0.write().await;
        let table = db.table_mut(table)?;
        let id = table.generate_id();
        insert_row(table, id, values)
    }

    /// Insert a row with a given id.
    pub async fn insert_with_id(
        &self,
        table: &str,
        id: Value,
        values: IndexMap<String, Value>,
    ) -> Result<Row, Error> {
        let mut db = self.0.write().await;
        let table = db.table_mut(table)?;
        if let Value::Int(n) = id {
            table.next_id = table.next_id.max(n.max(0) as u64);
        }
        if table.rows.iter().any(|row| row.id == id) {
            return Err(Error::Unique {
                table: table.schema.name.clone(),
                column: "id".into(),
            });
        }
        insert_row(table, id, values)
    }

    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, Error> {
        let db = self.0.read().await;
        let provider = db.provider;
        let table = db.table(table)?;
        for order in &query.order_by {
            if order.column != "id" {
                table.column(&order.column)?;
            }
        }

        let mut rows = table
            .rows
            .iter()
            .filter(|row| row.test(&query.condition))
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|l, r| {
            query
                .order_by
                .iter()
                .map(|order| compare_column(provider, order, l, r))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows
            .into_iter()
            .skip(query.skip)
            .take(query.take.unwrap_or(usize::MAX))
            .collect())
    }

    pub async fn count(&self, table: &str, condition: &Condition) -> Result<usize, Error> {
        let db = self.0.read().await;
        let table = db.table(table)?;
        Ok(table.rows.iter().filter(|row| row.test(condition)).count())
    }

    /// The first row matching `condition`, in insertion order.
    pub async fn find_first(
        &self,
        table: &str,
        condition: &Condition,
    ) -> Result<Option<Row>, Error> {
        let db = self.0.read().await;
        let table = db.table(table)?;
        Ok(table.rows.iter().find(|row| row.test(condition)).cloned())
    }

    /// Overwrite the given columns of the row with id `id`.
    pub async fn update(
        &self,
        table: &str,
        id: &Value,
        values: IndexMap<String, Value>,
    ) -> Result<Row, Error> {
        let mut db = self.0.write().await;
        let table = db.table_mut(table)?;
        table.check(id, &values)?;
        let name = table.schema.name.clone();
        let row = table
            .rows
            .iter_mut()
            .find(|row| row.id == *id)
            .ok_or_else(|| Error::NotFound {
                table: name,
                id: id.clone(),
            })?;
        row.values.extend(values);
        Ok(row.clone())
    }

    /// Delete the row with id `id`, returning it.
    pub async fn delete(&self, table: &str, id: &Value) -> Result<Row, Error> {
        let mut db = self.0.write().await;
        let table = db.table_mut(table)?;
        let pos = table
            .rows
            .iter()
            .position(|row| row.id == *id)
            .ok_or_else(|| Error::NotFound {
                table: table.schema.name.clone(),
                id: id.clone(),
            })?;
        Ok(table.rows.remove(pos))
    }
}

fn insert_row(table: &mut Table, id: Value, mut values: IndexMap<String, Value>) -> Result<Row, Error> {
    for col in &table.schema.columns {
        if !values.contains_key(&col.name) {
            values.insert(col.name.clone(), col.default.clone().unwrap_or_default());
        }
    }
    table.check(&id, &values)?;
    let row = Row { id, values };
    table.rows.push(row.clone());
    Ok(row)
}

/// Compare two rows by one ordering column, placing nulls the way `provider` does.
fn compare_column(provider: DatabaseProvider, order: &OrderBy, l: &Row, r: &Row) -> Ordering {
    let (l, r) = (l.get(&order.column), r.get(&order.column));
    let ord = match (l.is_null(), r.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) if provider.nulls_first_ascending() => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if provider.nulls_first_ascending() => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => l.compare(r).unwrap_or(Ordering::Equal),
    };
    match order.direction {
        OrderDirection::Asc => ord,
        OrderDirection::Desc => ord.reverse(),
    }
}
