//! Task use-cases scoped to the requesting user.
//!
//! # Responsibility
//! - Owner-scoped task listings (open, completed, per project).
//! - Task create/update/delete with ownership of both task and target project.
//! - "Current project" affinity: opening a project's task list remembers it,
//!   opening the full task list forgets it, task creation defaults to it.

use crate::model::project::{Project, ProjectId};
use crate::model::task::{Task, TaskDraft, TaskId};
use crate::model::user::UserId;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::session::SessionData;
use log::{debug, info};

/// A project together with its open tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTaskList {
    pub project: Project,
    pub tasks: Vec<Task>,
}

pub struct TaskService<T: TaskRepository, P: ProjectRepository> {
    tasks: T,
    projects: P,
}

impl<T: TaskRepository, P: ProjectRepository> TaskService<T, P> {
    pub fn new(tasks: T, projects: P) -> Self {
        Self { tasks, projects }
    }

    /// Opens a project's task list and remembers it as the current project.
    ///
    /// The session is only touched once ownership is confirmed.
    pub fn open_project(
        &self,
        user: UserId,
        project_id: ProjectId,
        session: &mut SessionData,
    ) -> ServiceResult<ProjectTaskList> {
        let project = self.owned_project(user, project_id)?;
        let tasks = self
            .tasks
            .list_tasks(&TaskListQuery::open(user).in_project(project_id))?;

        session.remember_project(project_id, !tasks.is_empty());
        debug!("event=current_project_set module=service project_id={project_id} user_id={user}");

        Ok(ProjectTaskList { project, tasks })
    }

    /// Owner's open tasks; forgets the current project.
    pub fn list_open_tasks(
        &self,
        user: UserId,
        session: &mut SessionData,
    ) -> ServiceResult<Vec<Task>> {
        session.clear_current_project();
        Ok(self.tasks.list_tasks(&TaskListQuery::open(user))?)
    }

    pub fn list_completed_tasks(&self, user: UserId) -> ServiceResult<Vec<Task>> {
        Ok(self.tasks.list_tasks(&TaskListQuery::completed(user))?)
    }

    /// Number of open tasks across all of the owner's projects.
    pub fn count_open_tasks(&self, user: UserId) -> ServiceResult<u64> {
        Ok(self.tasks.count_tasks(&TaskListQuery::open(user))?)
    }

    /// Projects selectable in the task form.
    pub fn project_choices(&self, user: UserId) -> ServiceResult<Vec<Project>> {
        Ok(self.projects.list_projects(user)?)
    }

    /// The remembered project, when it still exists and belongs to `user`.
    pub fn default_project(
        &self,
        user: UserId,
        session: &SessionData,
    ) -> ServiceResult<Option<ProjectId>> {
        let Some(project_id) = session.current_project else {
            return Ok(None);
        };
        let owned = self
            .projects
            .get_project(project_id)?
            .is_some_and(|project| project.is_owned_by(user));
        Ok(owned.then_some(project_id))
    }

    pub fn get_owned(&self, user: UserId, id: TaskId) -> ServiceResult<Task> {
        let task = self
            .tasks
            .get_task(id)?
            .ok_or(ServiceError::NotFound { entity: "task", id })?;
        if !task.is_owned_by(user) {
            return Err(ServiceError::Denied);
        }
        Ok(task)
    }

    pub fn create_task(&self, user: UserId, draft: &TaskDraft) -> ServiceResult<Task> {
        self.owned_project(user, draft.project_id)?;
        let id = self.tasks.create_task(draft)?;
        info!(
            "event=task_create module=service status=ok task_id={id} project_id={} user_id={user}",
            draft.project_id
        );
        self.get_owned(user, id)
    }

    /// Updates a task; a move to another project requires owning that project.
    pub fn update_task(&self, user: UserId, id: TaskId, draft: &TaskDraft) -> ServiceResult<Task> {
        self.get_owned(user, id)?;
        self.owned_project(user, draft.project_id)?;
        self.tasks.update_task(id, draft)?;
        info!("event=task_update module=service status=ok task_id={id} user_id={user}");
        self.get_owned(user, id)
    }

    /// Deletes a task and returns it, so callers can route to its project.
    pub fn delete_task(&self, user: UserId, id: TaskId) -> ServiceResult<Task> {
        let task = self.get_owned(user, id)?;
        self.tasks.delete_task(id)?;
        info!(
            "event=task_delete module=service status=ok task_id={id} project_id={} user_id={user}",
            task.project_id
        );
        Ok(task)
    }

    /// Replaces the legacy tag set of a task.
    pub fn set_task_tags(&self, user: UserId, id: TaskId, tags: &[String]) -> ServiceResult<Task> {
        self.get_owned(user, id)?;
        self.tasks.set_task_tags(id, tags)?;
        self.get_owned(user, id)
    }

    fn owned_project(&self, user: UserId, id: ProjectId) -> ServiceResult<Project> {
        let project = self
            .projects
            .get_project(id)?
            .ok_or(ServiceError::NotFound {
                entity: "project",
                id,
            })?;
        if !project.is_owned_by(user) {
            return Err(ServiceError::Denied);
        }
        Ok(project)
    }
}
