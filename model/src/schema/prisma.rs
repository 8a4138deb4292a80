//! The storage schema, in Prisma schema language.

use super::{InitialisedField, InitialisedList, System};
use crate::{
    fields::{DbDefault, FieldMode, IndexKind, NativeType, ScalarType},
    store::IdKind,
    value::Value,
};
use std::fmt::{self, Display, Formatter};

/// Print the storage schema of `system`.
pub fn print_schema(system: &System) -> String {
    PrismaSchema(system).to_string()
}

struct PrismaSchema<'a>(&'a System);

impl<'a> Display for PrismaSchema<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let system = self.0;
        let provider = system.provider;
        writeln!(f, "datasource {provider} {{")?;
        writeln!(f, "  url = env(\"DATABASE_URL\")")?;
        if system.db.shadow_database_url.is_some() {
            writeln!(f, "  shadowDatabaseUrl = env(\"SHADOW_DATABASE_URL\")")?;
        }
        writeln!(f, "  provider = \"{provider}\"")?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, "generator client {{")?;
        writeln!(f, "  provider = \"prisma-client-js\"")?;
        writeln!(f, "}}")?;
        for list in system.lists.values() {
            writeln!(f)?;
            write_model(f, list)?;
        }
        Ok(())
    }
}

fn write_model(f: &mut Formatter, list: &InitialisedList) -> fmt::Result {
    let id = match list.id {
        IdKind::Cuid => "String @id @default(cuid())",
        IdKind::Autoincrement => "Int @id @default(autoincrement())",
    };
    writeln!(f, "model {} {{", list.key)?;
    writeln!(f, "  id {id}")?;
    for field in list.fields.values() {
        write_field(f, field)?;
    }
    for field in list.fields.values() {
        if field.descriptor.db.index == Some(IndexKind::Index) {
            writeln!(f, "  @@index([{}])", field.key)?;
        }
    }
    writeln!(f, "}}")
}

fn write_field(f: &mut Formatter, field: &InitialisedField) -> fmt::Result {
    let db = &field.descriptor.db;
    let scalar = match db.scalar {
        ScalarType::Int => "Int",
        ScalarType::String => "String",
        ScalarType::DateTime => "DateTime",
    };
    let optional = match db.mode {
        FieldMode::Required => "",
        FieldMode::Optional => "?",
    };
    write!(f, "  {} {scalar}{optional}", field.key)?;
    match &db.default {
        Some(DbDefault::Literal(value)) => {
            write!(f, " @default({})", print_literal(db.scalar, value))?
        }
        Some(DbDefault::Autoincrement) => write!(f, " @default(autoincrement())")?,
        None => {}
    }
    if db.index == Some(IndexKind::Unique) {
        write!(f, " @unique")?;
    }
    if let Some(column) = &db.map {
        write!(f, " @map({column:?})")?;
    }
    if let Some(native) = db.native_type {
        match native {
            NativeType::Date => write!(f, " @db.Date")?,
        }
    }
    writeln!(f)
}

fn print_literal(scalar: ScalarType, value: &Value) -> String {
    match (scalar, value) {
        // Date literals on date-time columns name midnight UTC.
        (ScalarType::DateTime, Value::String(date)) => format!("\"{date}T00:00:00.000Z\""),
        (_, Value::String(s)) => format!("{s:?}"),
        (_, Value::Int(n)) => n.to_string(),
        (_, Value::DateTime(t)) => format!("\"{}\"", t.to_rfc3339()),
        (_, Value::Null) => "null".into(),
    }
}
