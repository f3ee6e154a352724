use anyhow::{Context, Result};
use std::path::Path;
use crate::aggregator::distinct_values;
use crate::parser::{read_table, Field, SchemaCapabilities};
use crate::utils::config::SCHEMA_VERSION;

/// Describe an input file: size, columns and recognised fields
pub fn inspect_input(file_path: &Path) -> Result<()> {
    println!("Inspecting: {}", file_path.display());

    let table = read_table(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let caps = SchemaCapabilities::detect(&table);

    println!("✓ Readable transaction table");
    println!("  Rows: {}", table.row_count());
    println!("  Columns: {}", table.columns().len());
    println!();
    println!("Recognised fields:");
    for resolved in caps.describe() {
        match resolved.column {
            Some(column) => println!("  ✓ {:<20} <- {}", format!("{:?}", resolved.field), column),
            None => println!("  - {:<20} (absent)", format!("{:?}", resolved.field)),
        }
    }

    let unknown = caps.unrecognized_columns();
    if !unknown.is_empty() {
        println!();
        println!("Unrecognised columns: {}", unknown.join(", "));
    }

    Ok(())
}

/// List the distinct user IDs in an input file
pub fn list_users(file_path: &Path) -> Result<Vec<String>> {
    let table = read_table(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    let column = SchemaCapabilities::detect(&table)
        .column_name(Field::UserId)
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Input has no {} column", Field::UserId.canonical_name()))?;

    let users = distinct_values(&table, &column)?;

    println!("{} user(s):", users.len());
    for user in &users {
        println!("  {}", user);
    }

    Ok(users)
}

/// Display version information
pub fn display_version() {
    println!("Impulse Insights v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Descriptive statistics for impulse-labelled bank transactions.");
}
