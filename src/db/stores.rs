use crate::errors::AppResult;
use crate::models::store::Store;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

pub fn map_row(row: &Row) -> Result<Store> {
    Ok(Store {
        id: row.get("id")?,
        store_code: row.get("store_code")?,
        store_name: row.get("store_name")?,
        store_city: row.get("store_city")?,
        longitude: row.get("longitude")?,
        latitude: row.get("latitude")?,
        address: row.get::<_, Option<String>>("address")?.unwrap_or_default(),
        created_at: row.get("created_at")?,
    })
}

/// Insert a store, or update name/city/address/coordinates when the code is
/// already known. Returns true when a new row was created.
pub fn upsert_store(
    conn: &Connection,
    store_code: &str,
    store_name: &str,
    store_city: &str,
    longitude: Option<f64>,
    latitude: Option<f64>,
    address: &str,
) -> AppResult<bool> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM stores WHERE store_code = ?1",
            [store_code],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => {
            conn.execute(
                "UPDATE stores
                 SET store_name = ?1, store_city = ?2, address = ?3,
                     longitude = COALESCE(?4, longitude),
                     latitude  = COALESCE(?5, latitude)
                 WHERE id = ?6",
                params![store_name, store_city, address, longitude, latitude, id],
            )?;
            Ok(false)
        }
        None => {
            conn.execute(
                "INSERT INTO stores (store_code, store_name, store_city, longitude, latitude, address)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![store_code, store_name, store_city, longitude, latitude, address],
            )?;
            Ok(true)
        }
    }
}

pub fn find_by_code(conn: &Connection, store_code: &str) -> AppResult<Option<Store>> {
    let mut stmt = conn.prepare("SELECT * FROM stores WHERE store_code = ?1")?;
    let store = stmt.query_row([store_code], map_row).optional()?;
    Ok(store)
}

/// Paginated store listing with an optional LIKE search over code, name and
/// city. Returns (rows, total matching count).
pub fn search_stores(
    conn: &Connection,
    search: &str,
    page: i64,
    per_page: i64,
) -> AppResult<(Vec<Store>, i64)> {
    let pattern = format!("%{}%", search);
    let (where_clause, has_search) = if search.is_empty() {
        ("", false)
    } else {
        (
            " WHERE store_code LIKE ?1 OR store_name LIKE ?1 OR store_city LIKE ?1",
            true,
        )
    };

    let total: i64 = if has_search {
        conn.query_row(
            &format!("SELECT COUNT(*) FROM stores{}", where_clause),
            [&pattern],
            |row| row.get(0),
        )?
    } else {
        conn.query_row("SELECT COUNT(*) FROM stores", [], |row| row.get(0))?
    };

    let offset = (page.max(1) - 1) * per_page;
    let sql = format!(
        "SELECT * FROM stores{} ORDER BY store_code LIMIT {} OFFSET {}",
        where_clause, per_page, offset
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut out = Vec::new();
    if has_search {
        let rows = stmt.query_map([&pattern], map_row)?;
        for r in rows {
            out.push(r?);
        }
    } else {
        let rows = stmt.query_map([], map_row)?;
        for r in rows {
            out.push(r?);
        }
    }

    Ok((out, total))
}

/// Full catalog, for export. Ordered by store code.
pub fn load_all(conn: &Connection) -> AppResult<Vec<Store>> {
    let mut stmt = conn.prepare("SELECT * FROM stores ORDER BY store_code")?;
    let rows = stmt.query_map([], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
