use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// User role for authorization.
///
/// The set is closed: a value outside it fails deserialization rather than
/// being coerced to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// Parse a stored role string. Returns None for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            "super_admin" => Some(UserRole::SuperAdmin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    uuid: String,
    user_id: String,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    is_active: i32,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, sqlx::Error> {
        let role = UserRole::parse(&row.role).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("unknown role '{}' for user {}", row.role, row.user_id).into(),
            )
        })?;
        Ok(Self {
            id: row.id,
            uuid: row.uuid,
            user_id: row.user_id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role,
            is_active: row.is_active != 0,
        })
    }
}

/// Public user summary for the admin dashboard. Does not expose password
/// hashes or internal database IDs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserSummary {
    pub uuid: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct UserSummaryRow {
    uuid: String,
    user_id: String,
    email: String,
    name: String,
    role: String,
    is_active: i32,
    created_at: String,
}

impl TryFrom<UserSummaryRow> for UserSummary {
    type Error = sqlx::Error;

    fn try_from(row: UserSummaryRow) -> Result<Self, sqlx::Error> {
        let role = UserRole::parse(&row.role).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("unknown role '{}' for user {}", row.role, row.user_id).into(),
            )
        })?;
        Ok(Self {
            uuid: row.uuid,
            user_id: row.user_id,
            email: row.email,
            name: row.name,
            role,
            is_active: row.is_active != 0,
            created_at: row.created_at,
        })
    }
}

/// Fields for creating a new user.
pub struct NewUser<'a> {
    pub uuid: &'a str,
    pub user_id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub password_hash: &'a str,
    pub role: UserRole,
}

const USER_COLUMNS: &str = "id, uuid, user_id, email, name, password_hash, role, is_active";

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new active user. Returns the row ID.
    pub async fn create(&self, user: NewUser<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (uuid, user_id, email, name, password_hash, role, is_active)
             VALUES (?, ?, ?, ?, ?, ?, 1)",
        )
        .bind(user.uuid)
        .bind(user.user_id)
        .bind(user.email)
        .bind(user.name)
        .bind(user.password_hash)
        .bind(user.role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a user by login identifier.
    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    /// Get a user by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE uuid = ?"))
                .bind(uuid)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        row.map(User::try_from).transpose()
    }

    /// Count all users. Used by the setup endpoint to detect a fresh install.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// List all users for the admin dashboard.
    pub async fn list(&self) -> Result<Vec<UserSummary>, sqlx::Error> {
        let rows: Vec<UserSummaryRow> = sqlx::query_as(
            "SELECT uuid, user_id, email, name, role, is_active, created_at
             FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UserSummary::try_from).collect()
    }
}
