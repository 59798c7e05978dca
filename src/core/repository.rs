use std::marker::PhantomData;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::{
    core::schemas::{Pagination, PaginationResult, QueryAll},
    db::naming,
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
    Bytes,
    Bool,
    Int,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// Typed value bound into a query.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Uuid(Uuid),
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i64),
}

impl FieldValue {
    /// Converts a JSON filter value to the column's type.
    pub fn from_json(column: &Column, value: &Value) -> Result<Self, AppError> {
        let converted = match (column.kind, value) {
            (ColumnKind::Uuid, Value::String(s)) => s.parse().ok().map(FieldValue::Uuid),
            (ColumnKind::Text, Value::String(s)) => Some(FieldValue::Text(s.clone())),
            (ColumnKind::Bytes, Value::String(s)) => Some(FieldValue::Bytes(s.as_bytes().to_vec())),
            (ColumnKind::Bool, Value::Bool(b)) => Some(FieldValue::Bool(*b)),
            (ColumnKind::Int, Value::Number(n)) => n.as_i64().map(FieldValue::Int),
            _ => None,
        };
        converted.ok_or_else(|| {
            AppError::validation(
                column.name,
                format!("Invalid value {value} for field {}", column.name),
            )
        })
    }

    fn bind(self, qb: &mut QueryBuilder<'static, Postgres>) {
        match self {
            FieldValue::Uuid(v) => {
                qb.push_bind(v);
            }
            FieldValue::Text(v) => {
                qb.push_bind(v);
            }
            FieldValue::Bytes(v) => {
                qb.push_bind(v);
            }
            FieldValue::Bool(v) => {
                qb.push_bind(v);
            }
            FieldValue::Int(v) => {
                qb.push_bind(v);
            }
        }
    }
}

/// A persisted row type and its table layout.
pub trait Model: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static {
    /// Model name used in error messages and to derive the table name.
    const NAME: &'static str;
    const PRIMARY_KEY: &'static str = "id";
    const COLUMNS: &'static [Column];

    fn table() -> String {
        naming::table_name(Self::NAME)
    }

    fn column(name: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.name == name)
    }
}

/// Input of `create`: the columns to insert.
pub trait CreateSchema: Send + 'static {
    fn into_values(self) -> Vec<(&'static str, FieldValue)>;
}

/// Input of `update`: the target id and only the fields that were set.
pub trait UpdateSchema: Send + 'static {
    fn id(&self) -> Uuid;
    fn into_changes(self) -> Vec<(&'static str, FieldValue)>;
}

#[async_trait]
pub trait BaseRepository<R, C, U>: Send + Sync
where
    R: Send + 'static,
    C: Send + 'static,
    U: Send + 'static,
{
    async fn get_one(&self, id: Uuid) -> Result<R, AppError>;

    async fn get_all(&self) -> Result<Vec<R>, AppError>;

    async fn create(&self, create_object: C) -> Result<R, AppError>;

    async fn update(&self, update_object: U) -> Result<R, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn query_all(&self, query: QueryAll) -> Result<PaginationResult<R>, AppError>;
}

/// Postgres implementation of [`BaseRepository`] for one model `M`,
/// reading into `R` and writing from `C` / `U`.
pub struct BaseRepositoryImpl<M, R, C, U> {
    db: PgPool,
    _types: PhantomData<fn() -> (M, R, C, U)>,
}

impl<M, R, C, U> Clone for BaseRepositoryImpl<M, R, C, U> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

impl<M, R, C, U> BaseRepositoryImpl<M, R, C, U> {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            _types: PhantomData,
        }
    }
}

impl<M: Model, R, C, U> BaseRepositoryImpl<M, R, C, U> {
    /// Runs the filtered, sorted and paginated select and returns raw models.
    pub async fn find_models(&self, query: &QueryAll) -> Result<Vec<M>, AppError> {
        let mut qb = build_select::<M>(query)?;
        debug!(sql = qb.sql(), model = M::NAME, "query_all");
        let models = qb.build_query_as::<M>().fetch_all(&self.db).await?;
        Ok(models)
    }

    pub async fn count(&self, query: &QueryAll) -> Result<i64, AppError> {
        let mut qb = build_count::<M>(query)?;
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.db).await?;
        Ok(count)
    }
}

#[async_trait]
impl<M, R, C, U> BaseRepository<R, C, U> for BaseRepositoryImpl<M, R, C, U>
where
    M: Model,
    R: From<M> + Send + 'static,
    C: CreateSchema,
    U: UpdateSchema,
{
    async fn get_one(&self, id: Uuid) -> Result<R, AppError> {
        let mut qb = select_by_id::<M>(id);
        let model = qb.build_query_as::<M>().fetch_optional(&self.db).await?;
        model
            .map(R::from)
            .ok_or_else(|| AppError::not_found(M::NAME, id))
    }

    async fn get_all(&self) -> Result<Vec<R>, AppError> {
        let models = self.find_models(&QueryAll::default()).await?;
        Ok(models.into_iter().map(R::from).collect())
    }

    async fn create(&self, create_object: C) -> Result<R, AppError> {
        let mut qb = build_insert::<M>(create_object.into_values())?;
        let mut tx = self.db.begin().await?;
        let model = qb.build_query_as::<M>().fetch_one(&mut *tx).await?;
        tx.commit().await?;
        debug!(model = M::NAME, "row created");
        Ok(R::from(model))
    }

    async fn update(&self, update_object: U) -> Result<R, AppError> {
        let id = update_object.id();
        let changes = update_object.into_changes();
        if changes.is_empty() {
            return self.get_one(id).await;
        }
        let mut qb = build_update::<M>(id, changes)?;
        let mut tx = self.db.begin().await?;
        let model = qb.build_query_as::<M>().fetch_optional(&mut *tx).await?;
        let Some(model) = model else {
            return Err(AppError::not_found(M::NAME, id));
        };
        tx.commit().await?;
        Ok(R::from(model))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut qb = build_delete::<M>(id);
        let mut tx = self.db.begin().await?;
        let result = qb.build().execute(&mut *tx).await?;
        tx.commit().await?;
        debug!(model = M::NAME, %id, rows = result.rows_affected(), "row deleted");
        Ok(true)
    }

    async fn query_all(&self, query: QueryAll) -> Result<PaginationResult<R>, AppError> {
        let models = self.find_models(&query).await?;
        let count = self.count(&query).await?;
        Ok(PaginationResult {
            objects: models.into_iter().map(R::from).collect(),
            count,
        })
    }
}

fn column_list<M: Model>() -> String {
    M::COLUMNS
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_prefix<M: Model>() -> String {
    format!("SELECT {} FROM {}", column_list::<M>(), M::table())
}

fn known_column<M: Model>(name: &str) -> Result<&'static Column, AppError> {
    M::column(name).ok_or_else(|| {
        AppError::Internal(anyhow!("{} has no column {name}", M::NAME))
    })
}

fn select_by_id<M: Model>(id: Uuid) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(select_prefix::<M>());
    qb.push(" WHERE ").push(M::PRIMARY_KEY).push(" = ").push_bind(id);
    qb
}

/// Appends `WHERE field = $n AND ...`; unknown fields are rejected.
fn push_filters<M: Model>(
    qb: &mut QueryBuilder<'static, Postgres>,
    filters: &std::collections::BTreeMap<String, Value>,
) -> Result<(), AppError> {
    for (i, (field, value)) in filters.iter().enumerate() {
        let column =
            M::column(field).ok_or_else(|| AppError::FilteringFieldNotFound(field.clone()))?;
        let value = FieldValue::from_json(column, value)?;
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(column.name).push(" = ");
        value.bind(qb);
    }
    Ok(())
}

/// Resolves `field` / `-field` entries to `(column, descending)`.
pub fn order_by_expr<M: Model>(sorting: &[String]) -> Result<Vec<(&'static str, bool)>, AppError> {
    sorting
        .iter()
        .map(|entry| {
            let (name, descending) = match entry.strip_prefix('-') {
                Some(name) => (name, true),
                None => (entry.as_str(), false),
            };
            M::column(name)
                .map(|c| (c.name, descending))
                .ok_or_else(|| AppError::SortingFieldNotFound(entry.clone()))
        })
        .collect()
}

fn push_sorting<M: Model>(
    qb: &mut QueryBuilder<'static, Postgres>,
    sorting: &[String],
) -> Result<(), AppError> {
    let order = order_by_expr::<M>(sorting)?;
    for (i, (column, descending)) in order.into_iter().enumerate() {
        qb.push(if i == 0 { " ORDER BY " } else { ", " });
        qb.push(column).push(if descending { " DESC" } else { " ASC" });
    }
    Ok(())
}

fn push_pagination(
    qb: &mut QueryBuilder<'static, Postgres>,
    pagination: Option<&Pagination>,
) -> Result<(), AppError> {
    let Some(p) = pagination else {
        return Ok(());
    };
    if p.limit < 0 {
        return Err(AppError::validation("limit", "limit must not be negative"));
    }
    if p.offset < 0 {
        return Err(AppError::validation("offset", "offset must not be negative"));
    }
    qb.push(" LIMIT ").push_bind(p.limit);
    qb.push(" OFFSET ").push_bind(p.offset);
    Ok(())
}

pub fn build_select<M: Model>(query: &QueryAll) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let mut qb = QueryBuilder::new(select_prefix::<M>());
    push_filters::<M>(&mut qb, &query.filters)?;
    push_sorting::<M>(&mut qb, &query.sorting)?;
    push_pagination(&mut qb, query.pagination.as_ref())?;
    Ok(qb)
}

/// Counts rows of the filtered subquery; sorting and pagination do not apply,
/// so the result is the total across all pages.
pub fn build_count<M: Model>(query: &QueryAll) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    // Sorting is still validated so a bad field fails the same way as the select.
    order_by_expr::<M>(&query.sorting)?;
    let mut qb = QueryBuilder::new("SELECT count(*) FROM (");
    qb.push(select_prefix::<M>());
    push_filters::<M>(&mut qb, &query.filters)?;
    qb.push(") AS filtered");
    Ok(qb)
}

pub fn build_insert<M: Model>(
    values: Vec<(&'static str, FieldValue)>,
) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {}", M::table()));
    if values.is_empty() {
        qb.push(" DEFAULT VALUES");
    } else {
        let mut names = Vec::with_capacity(values.len());
        for (name, _) in &values {
            names.push(known_column::<M>(name)?.name);
        }
        qb.push(" (").push(names.join(", ")).push(") VALUES (");
        for (i, (_, value)) in values.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            value.bind(&mut qb);
        }
        qb.push(")");
    }
    qb.push(" RETURNING ").push(column_list::<M>());
    Ok(qb)
}

pub fn build_update<M: Model>(
    id: Uuid,
    changes: Vec<(&'static str, FieldValue)>,
) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", M::table()));
    for (i, (name, value)) in changes.into_iter().enumerate() {
        let column = known_column::<M>(name)?;
        if i > 0 {
            qb.push(", ");
        }
        qb.push(column.name).push(" = ");
        value.bind(&mut qb);
    }
    qb.push(" WHERE ").push(M::PRIMARY_KEY).push(" = ").push_bind(id);
    qb.push(" RETURNING ").push(column_list::<M>());
    Ok(qb)
}

pub fn build_delete<M: Model>(id: Uuid) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("DELETE FROM {}", M::table()));
    qb.push(" WHERE ").push(M::PRIMARY_KEY).push(" = ").push_bind(id);
    qb
}
