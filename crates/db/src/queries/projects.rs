// crates/db/src/queries/projects.rs
// Project CRUD: create, get, list, partial update, guarded delete.

use chrono::Utc;
use sessionboard_core::{Project, ProjectStatus, ProjectSummary};
use uuid::Uuid;

use super::row_types::ProjectRow;
use super::{clamp_limit, NewProject, ProjectDelete, ProjectPatch};
use crate::{Database, DbResult};

const PROJECT_COLUMNS: &str = "id, name, slug, path, repo_url, status, onboarding_status, \
     metadata, created_at, updated_at";

impl Database {
    /// Insert a new project and return the stored entity.
    pub async fn create_project(&self, data: NewProject) -> DbResult<Project> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();
        let onboarding_status = serde_json::to_string(&data.onboarding_status)
            .unwrap_or_else(|_| "{}".to_string());
        let metadata =
            serde_json::to_string(&data.metadata).unwrap_or_else(|_| "{}".to_string());

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, name, slug, path, repo_url, status,
                onboarding_status, metadata, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            "#,
        )
        .bind(&id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.path)
        .bind(&data.repo_url)
        .bind(data.status.as_str())
        .bind(&onboarding_status)
        .bind(&metadata)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(Project {
            id,
            name: data.name,
            slug: data.slug,
            path: data.path,
            repo_url: data.repo_url,
            status: data.status,
            onboarding_status: data.onboarding_status,
            metadata: data.metadata,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a project by id.
    pub async fn get_project(&self, id: &str) -> DbResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(ProjectRow::into_project))
    }

    /// Get a project by its slug.
    pub async fn get_project_by_slug(&self, slug: &str) -> DbResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = ?1"
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(ProjectRow::into_project))
    }

    /// List projects ordered by most recently updated, optionally filtered
    /// by status. Limit defaults to 100 and is clamped server-side.
    pub async fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        limit: Option<i64>,
        offset: i64,
    ) -> DbResult<Vec<ProjectSummary>> {
        let limit = clamp_limit(limit);
        let offset = offset.max(0);

        let rows: Vec<ProjectRow> = match status {
            Some(status) => {
                sqlx::query_as(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects WHERE status = ?1 \
                     ORDER BY updated_at DESC LIMIT ?2 OFFSET ?3"
                ))
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as(&format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects \
                     ORDER BY updated_at DESC LIMIT ?1 OFFSET ?2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool())
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let project = row.into_project();
                ProjectSummary {
                    id: project.id,
                    name: project.name,
                    slug: project.slug,
                    status: project.status,
                    path: project.path,
                    created_at: project.created_at,
                    updated_at: project.updated_at,
                }
            })
            .collect())
    }

    /// Apply a partial update. Only provided fields change; onboarding
    /// flags merge shallowly rather than being replaced wholesale.
    ///
    /// Returns the updated project, or `None` if the id does not resolve.
    /// Slug conflicts are the caller's job to pre-check (route layer).
    pub async fn update_project(
        &self,
        id: &str,
        patch: ProjectPatch,
    ) -> DbResult<Option<Project>> {
        let Some(mut updated) = self.get_project(id).await? else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(slug) = patch.slug {
            updated.slug = slug;
        }
        if let Some(path) = patch.path {
            updated.path = path;
        }
        if let Some(repo_url) = patch.repo_url {
            updated.repo_url = Some(repo_url);
        }
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(partial) = patch.onboarding_status {
            updated.onboarding_status =
                merge_onboarding_status(&updated.onboarding_status, &partial);
        }
        if let Some(metadata) = patch.metadata {
            updated.metadata = metadata;
        }
        updated.updated_at = Utc::now().timestamp();

        let onboarding_json = serde_json::to_string(&updated.onboarding_status)
            .unwrap_or_else(|_| "{}".to_string());
        let metadata_json =
            serde_json::to_string(&updated.metadata).unwrap_or_else(|_| "{}".to_string());

        sqlx::query(
            r#"
            UPDATE projects SET
                name = ?2, slug = ?3, path = ?4, repo_url = ?5, status = ?6,
                onboarding_status = ?7, metadata = ?8, updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(&updated.name)
        .bind(&updated.slug)
        .bind(&updated.path)
        .bind(&updated.repo_url)
        .bind(updated.status.as_str())
        .bind(&onboarding_json)
        .bind(&metadata_json)
        .bind(updated.updated_at)
        .execute(self.pool())
        .await?;

        Ok(Some(updated))
    }

    /// Delete a project unless sessions still reference it.
    pub async fn delete_project(&self, id: &str) -> DbResult<ProjectDelete> {
        let (session_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE project_id = ?1")
                .bind(id)
                .fetch_one(self.pool())
                .await?;
        if session_count > 0 {
            return Ok(ProjectDelete::HasSessions(session_count));
        }

        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            Ok(ProjectDelete::NotFound)
        } else {
            Ok(ProjectDelete::Deleted)
        }
    }
}

/// Shallow-merge a partial flags object over the stored onboarding status.
/// Keys absent from the patch keep their stored value; unknown keys are
/// dropped by the typed decode.
fn merge_onboarding_status(
    existing: &sessionboard_core::OnboardingStatus,
    partial: &serde_json::Value,
) -> sessionboard_core::OnboardingStatus {
    let mut merged = serde_json::to_value(existing).unwrap_or_else(|_| serde_json::json!({}));
    if let (Some(base), Some(overlay)) = (merged.as_object_mut(), partial.as_object()) {
        for (key, value) in overlay {
            base.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value(merged).unwrap_or(*existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionboard_core::OnboardingStatus;

    async fn test_db() -> Database {
        Database::new_in_memory().await.expect("in-memory DB")
    }

    #[tokio::test]
    async fn test_create_and_get_project() {
        let db = test_db().await;
        let created = db
            .create_project(NewProject::new("Demo", "demo", "/tmp/demo"))
            .await
            .unwrap();

        let fetched = db.get_project(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.slug, "demo");
        assert_eq!(fetched.status, ProjectStatus::Pending);
        assert_eq!(fetched.created_at, fetched.updated_at);

        let by_slug = db.get_project_by_slug("demo").await.unwrap().unwrap();
        assert_eq!(by_slug.id, created.id);

        assert!(db.get_project("missing-id").await.unwrap().is_none());
        assert!(db.get_project_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slug_unique_constraint() {
        let db = test_db().await;
        db.create_project(NewProject::new("One", "same-slug", "/tmp/a"))
            .await
            .unwrap();
        let err = db
            .create_project(NewProject::new("Two", "same-slug", "/tmp/b"))
            .await
            .unwrap_err();
        assert!(err.to_string().to_lowercase().contains("unique"));
    }

    #[tokio::test]
    async fn test_list_projects_filter_and_order() {
        let db = test_db().await;
        let a = db
            .create_project(NewProject {
                status: ProjectStatus::Active,
                ..NewProject::new("A", "a", "/tmp/a")
            })
            .await
            .unwrap();
        db.create_project(NewProject {
            status: ProjectStatus::Pending,
            ..NewProject::new("B", "b", "/tmp/b")
        })
        .await
        .unwrap();

        let all = db.list_projects(None, None, 0).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = db
            .list_projects(Some(ProjectStatus::Active), None, 0)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);

        // Touch B so it sorts first
        sqlx::query("UPDATE projects SET updated_at = updated_at + 100 WHERE slug = 'b'")
            .execute(db.pool())
            .await
            .unwrap();
        let all = db.list_projects(None, None, 0).await.unwrap();
        assert_eq!(all[0].slug, "b");
    }

    #[tokio::test]
    async fn test_list_projects_pagination() {
        let db = test_db().await;
        for i in 0..5 {
            db.create_project(NewProject::new(
                format!("P{i}"),
                format!("p{i}"),
                format!("/tmp/p{i}"),
            ))
            .await
            .unwrap();
        }
        let page = db.list_projects(None, Some(2), 1).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_update_project_partial() {
        let db = test_db().await;
        let created = db
            .create_project(NewProject::new("Demo", "demo", "/tmp/demo"))
            .await
            .unwrap();

        let updated = db
            .update_project(
                &created.id,
                ProjectPatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.slug, "demo");
        assert_eq!(updated.path, "/tmp/demo");

        assert!(db
            .update_project("nope", ProjectPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_project_merges_onboarding_status() {
        let db = test_db().await;
        let created = db
            .create_project(NewProject {
                onboarding_status: OnboardingStatus {
                    path_validated: true,
                    claude_dir_exists: true,
                    ..Default::default()
                },
                ..NewProject::new("Demo", "demo", "/tmp/demo")
            })
            .await
            .unwrap();

        // Patch one flag; the previously-set flags must survive.
        let updated = db
            .update_project(
                &created.id,
                ProjectPatch {
                    onboarding_status: Some(serde_json::json!({"skills_linked": true})),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.onboarding_status.path_validated);
        assert!(updated.onboarding_status.claude_dir_exists);
        assert!(updated.onboarding_status.skills_linked);
        assert!(!updated.onboarding_status.docs_foundation);

        // And it persisted
        let fetched = db.get_project(&created.id).await.unwrap().unwrap();
        assert!(fetched.onboarding_status.skills_linked);
    }

    #[tokio::test]
    async fn test_delete_project_not_found() {
        let db = test_db().await;
        assert_eq!(
            db.delete_project("missing").await.unwrap(),
            ProjectDelete::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_project_without_sessions() {
        let db = test_db().await;
        let created = db
            .create_project(NewProject::new("Demo", "demo", "/tmp/demo"))
            .await
            .unwrap();
        assert_eq!(
            db.delete_project(&created.id).await.unwrap(),
            ProjectDelete::Deleted
        );
        assert!(db.get_project(&created.id).await.unwrap().is_none());
    }
}
