//! PostgreSQL store. Queries are built at runtime so the crate compiles
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::database::models::{Project, Sprint, Tag, User, WorkItem, WorkItemState};
use crate::database::repository::{
    non_blank, NewProject, NewSprint, NewUser, NewWorkItem, ProjectPatch, ProjectRepository,
    SprintPatch, SprintRepository, Store, StoreError, StoreResult, TagRepository, UserPatch,
    UserRepository, WorkItemPatch, WorkItemRepository,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, salt";

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.created_at, p.owner_id,
           ARRAY(SELECT pp.user_id FROM project_participants pp
                 WHERE pp.project_id = p.id ORDER BY pp.user_id) AS participant_ids
    FROM projects p"#;

const SPRINT_COLUMNS: &str = "id, name, description, start_date, end_date, project_id";

const WORK_ITEM_SELECT: &str = r#"
    SELECT w.id, w.name, w.description, w.state, w.item_index, w.project_id, w.sprint_id,
           ARRAY(SELECT a.user_id FROM work_item_assignees a
                 WHERE a.work_item_id = w.id ORDER BY a.user_id) AS assigned_user_ids,
           ARRAY(SELECT t.tag_id FROM work_item_tags t
                 WHERE t.work_item_id = w.id ORDER BY t.tag_id) AS tag_ids
    FROM work_items w"#;

/// Raw `work_items` row; the state column is TEXT.
#[derive(Debug, FromRow)]
struct WorkItemRow {
    id: i32,
    name: String,
    description: String,
    state: String,
    item_index: i32,
    project_id: i32,
    sprint_id: Option<i32>,
    assigned_user_ids: Vec<i32>,
    tag_ids: Vec<i32>,
}

impl TryFrom<WorkItemRow> for WorkItem {
    type Error = StoreError;

    fn try_from(row: WorkItemRow) -> Result<Self, Self::Error> {
        let state = row
            .state
            .parse::<WorkItemState>()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(WorkItem {
            id: row.id,
            name: row.name,
            description: row.description,
            state,
            index: row.item_index,
            project_id: row.project_id,
            sprint_id: row.sprint_id,
            assigned_user_ids: row.assigned_user_ids,
            tag_ids: row.tag_ids,
        })
    }
}

fn into_items(rows: Vec<WorkItemRow>) -> StoreResult<Vec<WorkItem>> {
    rows.into_iter().map(WorkItem::try_from).collect()
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_items(&self, filter: &str, bind: i32) -> StoreResult<Vec<WorkItem>> {
        let sql = format!("{WORK_ITEM_SELECT} WHERE {filter} ORDER BY w.item_index, w.id");
        let rows = sqlx::query_as::<_, WorkItemRow>(&sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await?;
        into_items(rows)
    }

    async fn fetch_projects(&self, filter: &str, bind: i32) -> StoreResult<Vec<Project>> {
        let sql = format!("{PROJECT_SELECT} WHERE {filter} ORDER BY p.id");
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn execute_link(&self, sql: &str, left: i32, right: i32) -> StoreResult<bool> {
        let result = sqlx::query(sql)
            .bind(left)
            .bind(right)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn user_by_id(&self, id: i32) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn all_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn users_by_ids(&self, ids: &[i32]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, salt) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.salt)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>> {
        // NULL leaves the column as it is
        let sql = format!(
            "UPDATE users SET username = COALESCE($2, username), email = COALESCE($3, email) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(non_blank(&patch.username))
            .bind(non_blank(&patch.email))
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_password(&self, id: i32, password_hash: &str, salt: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, salt = $3 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .bind(salt)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn project_by_id(&self, id: i32) -> StoreResult<Option<Project>> {
        let sql = format!("{PROJECT_SELECT} WHERE p.id = $1");
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn project_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        let sql = format!("{PROJECT_SELECT} WHERE p.name = $1");
        Ok(sqlx::query_as::<_, Project>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn all_projects(&self) -> StoreResult<Vec<Project>> {
        let sql = format!("{PROJECT_SELECT} ORDER BY p.id");
        Ok(sqlx::query_as::<_, Project>(&sql).fetch_all(&self.pool).await?)
    }

    async fn projects_by_owner(&self, owner_id: i32) -> StoreResult<Vec<Project>> {
        self.fetch_projects("p.owner_id = $1", owner_id).await
    }

    async fn projects_by_participant(&self, user_id: i32) -> StoreResult<Vec<Project>> {
        self.fetch_projects(
            "EXISTS (SELECT 1 FROM project_participants pp WHERE pp.project_id = p.id AND pp.user_id = $1)",
            user_id,
        )
        .await
    }

    async fn insert_project(&self, project: NewProject) -> StoreResult<Project> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO projects (name, description, created_at, owner_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_at)
        .bind(project.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Project {
            id,
            name: project.name,
            description: project.description,
            created_at: project.created_at,
            owner_id: project.owner_id,
            participant_ids: Vec::new(),
        })
    }

    async fn update_project(&self, id: i32, patch: ProjectPatch) -> StoreResult<Option<Project>> {
        let updated = sqlx::query(
            "UPDATE projects SET name = COALESCE($2, name), description = COALESCE($3, description) WHERE id = $1",
        )
        .bind(id)
        .bind(non_blank(&patch.name))
        .bind(non_blank(&patch.description))
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.project_by_id(id).await
    }

    async fn delete_project(&self, id: i32) -> StoreResult<bool> {
        // sprints, work items and join rows go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_participant(&self, project_id: i32, user_id: i32) -> StoreResult<bool> {
        self.execute_link(
            "INSERT INTO project_participants (project_id, user_id) \
             SELECT $1, $2 WHERE EXISTS (SELECT 1 FROM projects WHERE id = $1) \
               AND EXISTS (SELECT 1 FROM users WHERE id = $2) \
             ON CONFLICT DO NOTHING",
            project_id,
            user_id,
        )
        .await
    }

    async fn remove_participant(&self, project_id: i32, user_id: i32) -> StoreResult<bool> {
        self.execute_link(
            "DELETE FROM project_participants WHERE project_id = $1 AND user_id = $2",
            project_id,
            user_id,
        )
        .await
    }
}

#[async_trait]
impl SprintRepository for PgStore {
    async fn sprint_by_id(&self, id: i32) -> StoreResult<Option<Sprint>> {
        let sql = format!("SELECT {SPRINT_COLUMNS} FROM sprints WHERE id = $1");
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn sprint_by_name(&self, name: &str, project_id: i32) -> StoreResult<Option<Sprint>> {
        let sql = format!("SELECT {SPRINT_COLUMNS} FROM sprints WHERE name = $1 AND project_id = $2");
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(name)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn all_sprints(&self) -> StoreResult<Vec<Sprint>> {
        let sql = format!("SELECT {SPRINT_COLUMNS} FROM sprints ORDER BY start_date, id");
        Ok(sqlx::query_as::<_, Sprint>(&sql).fetch_all(&self.pool).await?)
    }

    async fn sprints_by_project(&self, project_id: i32) -> StoreResult<Vec<Sprint>> {
        let sql = format!(
            "SELECT {SPRINT_COLUMNS} FROM sprints WHERE project_id = $1 ORDER BY start_date, id"
        );
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn sprints_active_at(&self, at: DateTime<Utc>) -> StoreResult<Vec<Sprint>> {
        let sql = format!(
            "SELECT {SPRINT_COLUMNS} FROM sprints WHERE start_date <= $1 AND end_date >= $1 ORDER BY start_date, id"
        );
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(at)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn sprints_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> StoreResult<Vec<Sprint>> {
        let sql = format!(
            "SELECT {SPRINT_COLUMNS} FROM sprints WHERE start_date <= $2 AND end_date >= $1 ORDER BY start_date, id"
        );
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_sprint(&self, sprint: NewSprint) -> StoreResult<Sprint> {
        let sql = format!(
            "INSERT INTO sprints (name, description, start_date, end_date, project_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SPRINT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(&sprint.name)
            .bind(&sprint.description)
            .bind(sprint.start_date)
            .bind(sprint.end_date)
            .bind(sprint.project_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_sprint(&self, id: i32, patch: SprintPatch) -> StoreResult<Option<Sprint>> {
        let sql = format!(
            "UPDATE sprints SET name = COALESCE($2, name), description = COALESCE($3, description), \
             start_date = COALESCE($4, start_date), end_date = COALESCE($5, end_date) \
             WHERE id = $1 RETURNING {SPRINT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Sprint>(&sql)
            .bind(id)
            .bind(non_blank(&patch.name))
            .bind(non_blank(&patch.description))
            .bind(patch.start_date)
            .bind(patch.end_date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_sprint(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sprints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn sprint_has_work_items(&self, id: i32) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM work_items WHERE sprint_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl WorkItemRepository for PgStore {
    async fn work_item_by_id(&self, id: i32) -> StoreResult<Option<WorkItem>> {
        let sql = format!("{WORK_ITEM_SELECT} WHERE w.id = $1");
        let row = sqlx::query_as::<_, WorkItemRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(WorkItem::try_from).transpose()
    }

    async fn all_work_items(&self) -> StoreResult<Vec<WorkItem>> {
        let sql = format!("{WORK_ITEM_SELECT} ORDER BY w.item_index, w.id");
        let rows = sqlx::query_as::<_, WorkItemRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        into_items(rows)
    }

    async fn work_items_by_project(&self, project_id: i32) -> StoreResult<Vec<WorkItem>> {
        self.fetch_items("w.project_id = $1", project_id).await
    }

    async fn work_items_by_sprint(&self, sprint_id: i32) -> StoreResult<Vec<WorkItem>> {
        self.fetch_items("w.sprint_id = $1", sprint_id).await
    }

    async fn work_items_by_state(&self, state: WorkItemState) -> StoreResult<Vec<WorkItem>> {
        let sql = format!("{WORK_ITEM_SELECT} WHERE w.state = $1 ORDER BY w.item_index, w.id");
        let rows = sqlx::query_as::<_, WorkItemRow>(&sql)
            .bind(state.as_str())
            .fetch_all(&self.pool)
            .await?;
        into_items(rows)
    }

    async fn work_items_by_assigned_user(&self, user_id: i32) -> StoreResult<Vec<WorkItem>> {
        self.fetch_items(
            "EXISTS (SELECT 1 FROM work_item_assignees a WHERE a.work_item_id = w.id AND a.user_id = $1)",
            user_id,
        )
        .await
    }

    async fn insert_work_item(&self, item: NewWorkItem) -> StoreResult<WorkItem> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO work_items (name, description, state, item_index, project_id, sprint_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.state.as_str())
        .bind(item.index)
        .bind(item.project_id)
        .bind(item.sprint_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(WorkItem {
            id,
            name: item.name,
            description: item.description,
            state: item.state,
            index: item.index,
            project_id: item.project_id,
            sprint_id: item.sprint_id,
            assigned_user_ids: Vec::new(),
            tag_ids: Vec::new(),
        })
    }

    async fn update_work_item(&self, id: i32, patch: WorkItemPatch) -> StoreResult<Option<WorkItem>> {
        let updated = sqlx::query(
            "UPDATE work_items SET name = COALESCE($2, name), description = COALESCE($3, description), \
             state = COALESCE($4, state), item_index = COALESCE($5, item_index), \
             sprint_id = COALESCE($6, sprint_id) WHERE id = $1",
        )
        .bind(id)
        .bind(non_blank(&patch.name))
        .bind(non_blank(&patch.description))
        .bind(patch.state.map(|s| s.as_str()))
        .bind(patch.index)
        .bind(patch.sprint_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.work_item_by_id(id).await
    }

    async fn delete_work_item(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM work_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_user(&self, item_id: i32, user_id: i32) -> StoreResult<bool> {
        self.execute_link(
            "INSERT INTO work_item_assignees (work_item_id, user_id) \
             SELECT $1, $2 WHERE EXISTS (SELECT 1 FROM work_items WHERE id = $1) \
               AND EXISTS (SELECT 1 FROM users WHERE id = $2) \
             ON CONFLICT DO NOTHING",
            item_id,
            user_id,
        )
        .await
    }

    async fn unassign_user(&self, item_id: i32, user_id: i32) -> StoreResult<bool> {
        self.execute_link(
            "DELETE FROM work_item_assignees WHERE work_item_id = $1 AND user_id = $2",
            item_id,
            user_id,
        )
        .await
    }

    async fn add_tag(&self, item_id: i32, tag_id: i32) -> StoreResult<bool> {
        self.execute_link(
            "INSERT INTO work_item_tags (work_item_id, tag_id) \
             SELECT $1, $2 WHERE EXISTS (SELECT 1 FROM work_items WHERE id = $1) \
               AND EXISTS (SELECT 1 FROM tags WHERE id = $2) \
             ON CONFLICT DO NOTHING",
            item_id,
            tag_id,
        )
        .await
    }

    async fn remove_tag(&self, item_id: i32, tag_id: i32) -> StoreResult<bool> {
        self.execute_link(
            "DELETE FROM work_item_tags WHERE work_item_id = $1 AND tag_id = $2",
            item_id,
            tag_id,
        )
        .await
    }

    async fn set_sprint(&self, item_id: i32, sprint_id: Option<i32>) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE work_items SET sprint_id = $2 WHERE id = $1")
            .bind(item_id)
            .bind(sprint_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_index(&self, item_id: i32, index: i32) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE work_items SET item_index = $2 WHERE id = $1")
            .bind(item_id)
            .bind(index)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TagRepository for PgStore {
    async fn tag_by_id(&self, id: i32) -> StoreResult<Option<Tag>> {
        Ok(sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        Ok(sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn all_tags(&self) -> StoreResult<Vec<Tag>> {
        Ok(sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_tag(&self, name: &str) -> StoreResult<Tag> {
        Ok(
            sqlx::query_as::<_, Tag>("INSERT INTO tags (name) VALUES ($1) RETURNING id, name")
                .bind(name)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn rename_tag(&self, id: i32, name: &str) -> StoreResult<Option<Tag>> {
        Ok(
            sqlx::query_as::<_, Tag>("UPDATE tags SET name = $2 WHERE id = $1 RETURNING id, name")
                .bind(id)
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_tag(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(state: &str) -> WorkItemRow {
        WorkItemRow {
            id: 7,
            name: "Write docs".to_string(),
            description: String::new(),
            state: state.to_string(),
            item_index: 3,
            project_id: 1,
            sprint_id: None,
            assigned_user_ids: vec![2],
            tag_ids: vec![],
        }
    }

    #[test]
    fn work_item_row_converts_state_text() {
        let item = WorkItem::try_from(row("Doing")).unwrap();
        assert_eq!(item.state, WorkItemState::Doing);
        assert_eq!(item.index, 3);
        assert_eq!(item.assigned_user_ids, vec![2]);
    }

    #[test]
    fn unknown_state_text_is_a_decode_error() {
        let err = WorkItem::try_from(row("Blocked")).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
