//! Window catalog repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use fenestra_core::{
    Covering, Daytime, ListWindowsRequest, ListWindowsResponse, Location, Material, OpenState,
    Panes, Result, WindowAttributes, WindowKind, WindowRecord, WindowRepository,
};

use crate::escape_like;

const SELECT_COLUMNS: &str = "id, content_hash, is_duplicate, created_at, image_ref, \
     description, daytime, location, window_type, material, panes, covering, open_state";

/// PostgreSQL implementation of WindowRepository.
#[derive(Clone)]
pub struct PgWindowRepository {
    pool: Pool<Postgres>,
}

impl PgWindowRepository {
    /// Create a new PgWindowRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// A value bound into a dynamically built query, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
enum Bind {
    Text(String),
    Bool(bool),
}

/// Build the WHERE clause and bind plan for a listing request.
///
/// Placeholders are numbered in the order binds are pushed, so the two must
/// stay in lockstep. Filtering on `Unknown` matches NULL columns and binds
/// nothing.
fn build_where(req: &ListWindowsRequest) -> (String, Vec<Bind>) {
    let mut sql = String::from("WHERE 1=1 ");
    let mut binds: Vec<Bind> = Vec::new();
    let mut idx = 1usize;

    let attribute_filters: [(&str, Option<Option<&'static str>>); 7] = [
        ("daytime", req.daytime.map(|v| v.as_db())),
        ("location", req.location.map(|v| v.as_db())),
        ("window_type", req.kind.map(|v| v.as_db())),
        ("material", req.material.map(|v| v.as_db())),
        ("panes", req.panes.map(|v| v.as_db())),
        ("covering", req.covering.map(|v| v.as_db())),
        ("open_state", req.open_state.map(|v| v.as_db())),
    ];

    for (column, filter) in attribute_filters {
        match filter {
            None => {}
            Some(None) => {
                sql.push_str(&format!("AND {} IS NULL ", column));
            }
            Some(Some(token)) => {
                sql.push_str(&format!("AND {} = ${} ", column, idx));
                binds.push(Bind::Text(token.to_string()));
                idx += 1;
            }
        }
    }

    if let Some(is_duplicate) = req.is_duplicate {
        sql.push_str(&format!("AND is_duplicate = ${} ", idx));
        binds.push(Bind::Bool(is_duplicate));
        idx += 1;
    }

    if let Some(search) = req.search.as_deref() {
        sql.push_str(&format!("AND description ILIKE ${} ESCAPE '\\' ", idx));
        binds.push(Bind::Text(format!("%{}%", escape_like(search))));
    }

    (sql, binds)
}

fn apply_binds<'q>(
    mut query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    binds: &'q [Bind],
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    for bind in binds {
        query = match bind {
            Bind::Text(s) => query.bind(s.as_str()),
            Bind::Bool(b) => query.bind(*b),
        };
    }
    query
}

fn row_to_record(row: &PgRow) -> Result<WindowRecord> {
    let daytime: Option<String> = row.try_get("daytime")?;
    let location: Option<String> = row.try_get("location")?;
    let window_type: Option<String> = row.try_get("window_type")?;
    let material: Option<String> = row.try_get("material")?;
    let panes: Option<String> = row.try_get("panes")?;
    let covering: Option<String> = row.try_get("covering")?;
    let open_state: Option<String> = row.try_get("open_state")?;

    Ok(WindowRecord {
        id: row.try_get("id")?,
        content_hash: row.try_get("content_hash")?,
        is_duplicate: row.try_get("is_duplicate")?,
        created_at: row.try_get("created_at")?,
        image_ref: row.try_get("image_ref")?,
        description: row.try_get("description")?,
        attributes: WindowAttributes {
            daytime: Daytime::from_db(daytime.as_deref()),
            location: Location::from_db(location.as_deref()),
            kind: WindowKind::from_db(window_type.as_deref()),
            material: Material::from_db(material.as_deref()),
            panes: Panes::from_db(panes.as_deref()),
            covering: Covering::from_db(covering.as_deref()),
            open_state: OpenState::from_db(open_state.as_deref()),
        },
    })
}

#[async_trait]
impl WindowRepository for PgWindowRepository {
    async fn insert(&self, record: &WindowRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO windows (id, content_hash, is_duplicate, created_at, image_ref, \
             description, daytime, location, window_type, material, panes, covering, open_state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(record.id)
        .bind(&record.content_hash)
        .bind(record.is_duplicate)
        .bind(record.created_at)
        .bind(&record.image_ref)
        .bind(&record.description)
        .bind(record.attributes.daytime.as_db())
        .bind(record.attributes.location.as_db())
        .bind(record.attributes.kind.as_db())
        .bind(record.attributes.material.as_db())
        .bind(record.attributes.panes.as_db())
        .bind(record.attributes.covering.as_db())
        .bind(record.attributes.open_state.as_db())
        .execute(&self.pool)
        .await?;

        debug!(
            subsystem = "db",
            component = "windows",
            op = "insert",
            window_id = %record.id,
            content_hash = %record.content_hash,
            "Inserted window record"
        );
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<WindowRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM windows WHERE id = $1",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<WindowRecord>> {
        // Oldest first: the earliest record per hash class is the one whose
        // stored image and analysis duplicates reuse.
        let row = sqlx::query(&format!(
            "SELECT {} FROM windows WHERE content_hash = $1 \
             ORDER BY created_at ASC, id ASC LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn find_duplicates(
        &self,
        content_hash: &str,
        exclude_id: Uuid,
    ) -> Result<Vec<WindowRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM windows WHERE content_hash = $1 AND id <> $2 \
             ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .bind(content_hash)
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_record).collect()
    }

    async fn list(&self, req: ListWindowsRequest) -> Result<ListWindowsResponse> {
        let (where_sql, binds) = build_where(&req);

        let count_sql = format!("SELECT COUNT(*) AS count FROM windows {}", where_sql);
        let count_row = apply_binds(sqlx::query(&count_sql), &binds)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.try_get("count")?;

        // id DESC as tiebreaker: ids are UUIDv7, so equal timestamps resolve
        // to insertion order.
        let page_sql = format!(
            "SELECT {} FROM windows {} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            SELECT_COLUMNS,
            where_sql,
            binds.len() + 1,
            binds.len() + 2,
        );
        let rows = apply_binds(sqlx::query(&page_sql), &binds)
            .bind(req.limit)
            .bind(req.offset)
            .fetch_all(&self.pool)
            .await?;

        let windows = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "db",
            component = "windows",
            op = "list",
            result_count = windows.len(),
            total = total,
            "Listed window records"
        );

        Ok(ListWindowsResponse { windows, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_where_empty_request() {
        let (sql, binds) = build_where(&ListWindowsRequest::default());
        assert_eq!(sql, "WHERE 1=1 ");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_build_where_single_attribute() {
        let req = ListWindowsRequest {
            daytime: Some(Daytime::Day),
            ..Default::default()
        };
        let (sql, binds) = build_where(&req);
        assert_eq!(sql, "WHERE 1=1 AND daytime = $1 ");
        assert_eq!(binds, vec![Bind::Text("day".to_string())]);
    }

    #[test]
    fn test_build_where_unknown_matches_null_without_bind() {
        let req = ListWindowsRequest {
            material: Some(Material::Unknown),
            ..Default::default()
        };
        let (sql, binds) = build_where(&req);
        assert_eq!(sql, "WHERE 1=1 AND material IS NULL ");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_build_where_placeholders_stay_sequential() {
        let req = ListWindowsRequest {
            daytime: Some(Daytime::Night),
            location: Some(Location::Unknown),
            kind: Some(WindowKind::Casement),
            is_duplicate: Some(false),
            search: Some("bay".to_string()),
            ..Default::default()
        };
        let (sql, binds) = build_where(&req);
        assert_eq!(
            sql,
            "WHERE 1=1 AND daytime = $1 AND location IS NULL AND window_type = $2 \
             AND is_duplicate = $3 AND description ILIKE $4 ESCAPE '\\' "
        );
        assert_eq!(
            binds,
            vec![
                Bind::Text("night".to_string()),
                Bind::Text("casement".to_string()),
                Bind::Bool(false),
                Bind::Text("%bay%".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_where_search_escapes_wildcards() {
        let req = ListWindowsRequest {
            search: Some("100%_done".to_string()),
            ..Default::default()
        };
        let (_, binds) = build_where(&req);
        assert_eq!(binds, vec![Bind::Text("%100\\%\\_done%".to_string())]);
    }

    #[test]
    fn test_build_where_is_duplicate_only() {
        let req = ListWindowsRequest {
            is_duplicate: Some(true),
            ..Default::default()
        };
        let (sql, binds) = build_where(&req);
        assert_eq!(sql, "WHERE 1=1 AND is_duplicate = $1 ");
        assert_eq!(binds, vec![Bind::Bool(true)]);
    }

    #[test]
    fn test_build_where_all_seven_attributes() {
        let req = ListWindowsRequest {
            daytime: Some(Daytime::Day),
            location: Some(Location::Interior),
            kind: Some(WindowKind::Hung),
            material: Some(Material::Wood),
            panes: Some(Panes::Two),
            covering: Some(Covering::Blinds),
            open_state: Some(OpenState::Closed),
            ..Default::default()
        };
        let (sql, binds) = build_where(&req);
        assert!(sql.contains("daytime = $1"));
        assert!(sql.contains("open_state = $7"));
        assert_eq!(binds.len(), 7);
        assert_eq!(binds[4], Bind::Text("2".to_string()));
    }
}
