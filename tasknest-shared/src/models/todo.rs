/// Todo model and database operations
///
/// Every todo belongs to exactly one user, fixed at creation. All reads
/// and writes here are scoped to the owner: a lookup that would match a
/// different user's record simply finds nothing, so "exists but not
/// mine" is indistinguishable from absence by construction.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_state AS ENUM ('draft', 'todo', 'doing', 'done', 'trash');
///
/// CREATE TABLE todos (
///     id          BIGSERIAL PRIMARY KEY,
///     title       VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     state       todo_state NOT NULL,
///     user_id     BIGINT NOT NULL REFERENCES users(id)
/// );
/// ```
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Todo lifecycle state (closed enumeration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoState {
    Draft,
    Todo,
    Doing,
    Done,
    Trash,
}

impl TodoState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoState::Draft => "draft",
            TodoState::Todo => "todo",
            TodoState::Doing => "doing",
            TodoState::Done => "done",
            TodoState::Trash => "trash",
        }
    }
}

/// Todo model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo ID (store-assigned, immutable)
    pub id: i64,

    pub title: String,

    pub description: String,

    pub state: TodoState,

    /// Owning user. Set from the authenticated principal at creation
    /// and never reassigned.
    pub user_id: i64,
}

/// Input for creating a todo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub description: String,
    pub state: TodoState,

    /// Owner, taken from the authenticated principal — never from the
    /// request body.
    pub user_id: i64,
}

/// Merge-patch over the fixed mutable attribute set
///
/// Only fields that are `Some` are written; absent fields keep their
/// prior value. The owner (`user_id`) and id are deliberately not part
/// of this struct, so no patch can reassign a todo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<TodoState>,
}

impl TodoPatch {
    /// True when the patch carries no changes (a valid no-op merge)
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.state.is_none()
    }
}

/// Optional list predicates, ANDed together
///
/// `title` and `description` are literal, case-sensitive substring
/// matches; `state` is exact equality. None of them can widen the
/// result beyond the owner scope applied by [`Todo::list_by_owner`].
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<TodoState>,
}

impl Todo {
    /// Creates a todo owned by `data.user_id`
    pub async fn create(pool: &PgPool, data: CreateTodo) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, description, state, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, state, user_id
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.state)
        .bind(data.user_id)
        .fetch_one(pool)
        .await
    }

    /// Finds a todo by id within the owner's scope
    ///
    /// Returns `None` both when no such row exists and when it belongs
    /// to a different user.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(
            r#"
            SELECT id, title, description, state, user_id
            FROM todos
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Lists the owner's todos, filtered and paginated
    ///
    /// The base predicate is always `user_id = owner_id`; the optional
    /// filters only narrow it. Results are ordered by primary key
    /// (insertion order), so a fixed data set pages deterministically:
    /// consecutive offset windows are disjoint and contiguous.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: i64,
        filter: &TodoFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, title, description, state, user_id FROM todos WHERE user_id = $1",
        );
        let mut bind_count = 1;

        // strpos gives literal, case-sensitive containment without
        // LIKE-pattern interpretation of the needle.
        if filter.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND strpos(title, ${}) > 0", bind_count));
        }
        if filter.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND strpos(description, ${}) > 0", bind_count));
        }
        if filter.state.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND state = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY id ASC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Todo>(&query).bind(owner_id);

        if let Some(ref title) = filter.title {
            q = q.bind(title);
        }
        if let Some(ref description) = filter.description {
            q = q.bind(description);
        }
        if let Some(state) = filter.state {
            q = q.bind(state);
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Applies a merge-patch to a todo within the owner's scope
    ///
    /// Only the attributes present in the patch are written. An empty
    /// patch is a no-op that returns the current record. Returns `None`
    /// when the todo does not exist in the owner's scope.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
        patch: TodoPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        if patch.is_empty() {
            return Self::find_by_id_and_owner(pool, id, owner_id).await;
        }

        // Build the assignment list from whichever attributes are
        // present; the WHERE clause keeps the write owner-scoped.
        let mut assignments = Vec::new();
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            assignments.push(format!("title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ${}", bind_count));
        }
        if patch.state.is_some() {
            bind_count += 1;
            assignments.push(format!("state = ${}", bind_count));
        }

        let query = format!(
            "UPDATE todos SET {} WHERE id = $1 AND user_id = $2 \
             RETURNING id, title, description, state, user_id",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Todo>(&query).bind(id).bind(owner_id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(state) = patch.state {
            q = q.bind(state);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a todo within the owner's scope
    ///
    /// Returns true if a row was deleted; false covers both a missing
    /// todo and someone else's todo.
    pub async fn delete(pool: &PgPool, id: i64, owner_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
