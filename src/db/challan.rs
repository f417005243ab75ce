//! Delivery challan storage.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ChallanStore {
    pool: SqlitePool,
}

/// Lifecycle status of a delivery challan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallanStatus {
    Draft,
    Open,
    Partial,
    Closed,
    Cancelled,
    Deleted,
}

impl ChallanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallanStatus::Draft => "draft",
            ChallanStatus::Open => "open",
            ChallanStatus::Partial => "partial",
            ChallanStatus::Closed => "closed",
            ChallanStatus::Cancelled => "cancelled",
            ChallanStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ChallanStatus::Draft),
            "open" => Some(ChallanStatus::Open),
            "partial" => Some(ChallanStatus::Partial),
            "closed" => Some(ChallanStatus::Closed),
            "cancelled" => Some(ChallanStatus::Cancelled),
            "deleted" => Some(ChallanStatus::Deleted),
            _ => None,
        }
    }
}

/// User who created a challan, joined in for display.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Creator {
    pub name: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Challan {
    pub uuid: String,
    #[serde(rename = "dcNumber")]
    pub dc_number: String,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "itemNames")]
    pub item_names: Vec<String>,
    #[serde(rename = "totalDispatchQty")]
    pub total_dispatch_qty: i64,
    #[serde(rename = "totalReceivedQty")]
    pub total_received_qty: i64,
    pub status: ChallanStatus,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<Creator>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ChallanRow {
    uuid: String,
    dc_number: String,
    customer_name: String,
    item_names: String,
    total_dispatch_qty: i64,
    total_received_qty: i64,
    status: String,
    created_by: String,
    creator_name: Option<String>,
    creator_user_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChallanRow> for Challan {
    type Error = sqlx::Error;

    fn try_from(row: ChallanRow) -> Result<Self, sqlx::Error> {
        let status = ChallanStatus::parse(&row.status).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("unknown status '{}' for challan {}", row.status, row.dc_number).into(),
            )
        })?;
        let item_names: Vec<String> = serde_json::from_str(&row.item_names)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let creator = match (row.creator_name, row.creator_user_id) {
            (Some(name), Some(user_id)) => Some(Creator { name, user_id }),
            _ => None,
        };
        Ok(Self {
            uuid: row.uuid,
            dc_number: row.dc_number,
            customer_name: row.customer_name,
            item_names,
            total_dispatch_qty: row.total_dispatch_qty,
            total_received_qty: row.total_received_qty,
            status,
            created_by: row.created_by,
            creator,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields for creating a new challan.
pub struct NewChallan<'a> {
    pub uuid: &'a str,
    pub dc_number: &'a str,
    pub customer_name: &'a str,
    pub item_names: &'a [String],
    pub total_dispatch_qty: i64,
    pub total_received_qty: i64,
    pub status: ChallanStatus,
    pub created_by: &'a str,
}

/// Partial update; None leaves the column unchanged.
#[derive(Default)]
pub struct ChallanUpdate {
    pub customer_name: Option<String>,
    pub item_names: Option<Vec<String>>,
    pub total_dispatch_qty: Option<i64>,
    pub total_received_qty: Option<i64>,
    pub status: Option<ChallanStatus>,
}

const CHALLAN_SELECT: &str = "SELECT c.uuid, c.dc_number, c.customer_name, c.item_names,
            c.total_dispatch_qty, c.total_received_qty, c.status, c.created_by,
            u.name AS creator_name, u.user_id AS creator_user_id,
            c.created_at, c.updated_at
     FROM delivery_challans c
     LEFT JOIN users u ON u.uuid = c.created_by";

impl ChallanStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new challan.
    pub async fn create(&self, challan: NewChallan<'_>) -> Result<(), sqlx::Error> {
        let item_names = serde_json::to_string(challan.item_names)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query(
            "INSERT INTO delivery_challans
                 (uuid, dc_number, customer_name, item_names,
                  total_dispatch_qty, total_received_qty, status, created_by)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(challan.uuid)
        .bind(challan.dc_number)
        .bind(challan.customer_name)
        .bind(item_names)
        .bind(challan.total_dispatch_qty)
        .bind(challan.total_received_qty)
        .bind(challan.status.as_str())
        .bind(challan.created_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Get a challan by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Challan>, sqlx::Error> {
        let row: Option<ChallanRow> =
            sqlx::query_as(&format!("{CHALLAN_SELECT} WHERE c.uuid = ?"))
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Challan::try_from).transpose()
    }

    /// Check whether a DC number is already taken.
    pub async fn dc_number_exists(&self, dc_number: &str) -> Result<bool, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM delivery_challans WHERE dc_number = ?")
                .bind(dc_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }

    /// List challans, newest first, optionally filtered by status.
    pub async fn list(
        &self,
        status: Option<ChallanStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Challan>, sqlx::Error> {
        let rows: Vec<ChallanRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "{CHALLAN_SELECT} WHERE c.status = ?
                     ORDER BY c.created_at DESC, c.id DESC LIMIT ? OFFSET ?"
                ))
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "{CHALLAN_SELECT} ORDER BY c.created_at DESC, c.id DESC LIMIT ? OFFSET ?"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(Challan::try_from).collect()
    }

    /// Count challans, optionally filtered by status.
    pub async fn count(&self, status: Option<ChallanStatus>) -> Result<i64, sqlx::Error> {
        let count: (i64,) = match status {
            Some(status) => {
                sqlx::query_as("SELECT COUNT(*) FROM delivery_challans WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM delivery_challans")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count.0)
    }

    /// Apply a partial update. Returns false if the challan does not exist.
    pub async fn update(&self, uuid: &str, update: ChallanUpdate) -> Result<bool, sqlx::Error> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(false);
        };

        let customer_name = update.customer_name.unwrap_or(existing.customer_name);
        let item_names = update.item_names.unwrap_or(existing.item_names);
        let item_names = serde_json::to_string(&item_names)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let total_dispatch_qty = update
            .total_dispatch_qty
            .unwrap_or(existing.total_dispatch_qty);
        let total_received_qty = update
            .total_received_qty
            .unwrap_or(existing.total_received_qty);
        let status = update.status.unwrap_or(existing.status);

        let result = sqlx::query(
            "UPDATE delivery_challans
             SET customer_name = ?, item_names = ?, total_dispatch_qty = ?,
                 total_received_qty = ?, status = ?, updated_at = datetime('now')
             WHERE uuid = ?",
        )
        .bind(customer_name)
        .bind(item_names)
        .bind(total_dispatch_qty)
        .bind(total_received_qty)
        .bind(status.as_str())
        .bind(uuid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a challan by UUID. Returns false if it does not exist.
    pub async fn delete(&self, uuid: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM delivery_challans WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
