//! Animal record database operations
//!
//! Records are append-only: inserted once, never updated or deleted.

use anidex_common::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::models::{Animal, AnimalFilter, NewAnimal};

/// Insert a record, returning it with its assigned id
pub async fn insert_animal(pool: &SqlitePool, animal: &NewAnimal) -> Result<Animal> {
    let created_at = animal
        .created_at
        .to_rfc3339_opts(SecondsFormat::Micros, true);

    let result = sqlx::query(
        "INSERT INTO animals (image, predicted_label, info, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&animal.image)
    .bind(&animal.predicted_label)
    .bind(&animal.info)
    .bind(&created_at)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    tracing::debug!(id, image = %animal.image, "Animal record inserted");

    Ok(Animal {
        id,
        image: animal.image.clone(),
        predicted_label: animal.predicted_label.clone(),
        info: animal.info.clone(),
        created_at: animal.created_at,
    })
}

/// Fetch one record by id
pub async fn get_animal(pool: &SqlitePool, id: i64) -> Result<Option<Animal>> {
    let row = sqlx::query(
        "SELECT id, image, predicted_label, info, created_at FROM animals WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_animal).transpose()
}

/// Count records matching the filter
pub async fn count_animals(pool: &SqlitePool, filter: &AnimalFilter) -> Result<i64> {
    let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM animals");
    push_filter(&mut query, filter);

    let count = query.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// List records matching the filter, newest first
pub async fn list_animals(
    pool: &SqlitePool,
    filter: &AnimalFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Animal>> {
    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, image, predicted_label, info, created_at FROM animals",
    );
    push_filter(&mut query, filter);
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = query.build().fetch_all(pool).await?;
    rows.iter().map(row_to_animal).collect()
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &AnimalFilter) {
    let mut prefix = " WHERE ";

    if let Some(label) = filter.predicted_label.as_deref().filter(|s| !s.is_empty()) {
        query
            .push(prefix)
            .push("predicted_label = ")
            .push_bind(label.to_string());
        prefix = " AND ";
    }

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(term));
        query
            .push(prefix)
            .push("(predicted_label LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR info LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Escape LIKE wildcards so search terms match literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_animal(row: &SqliteRow) -> Result<Animal> {
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Invalid created_at '{}': {}", created_at, e)))?
        .with_timezone(&Utc);

    Ok(Animal {
        id: row.try_get("id")?,
        image: row.try_get("image")?,
        predicted_label: row.try_get("predicted_label")?,
        info: row.try_get("info")?,
        created_at,
    })
}
