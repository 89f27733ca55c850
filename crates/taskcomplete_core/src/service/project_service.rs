//! Project use-cases scoped to the requesting user.

use crate::model::project::{Project, ProjectDraft, ProjectId};
use crate::model::user::UserId;
use crate::repo::project_repo::ProjectRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct ProjectService<P: ProjectRepository> {
    projects: P,
}

impl<P: ProjectRepository> ProjectService<P> {
    pub fn new(projects: P) -> Self {
        Self { projects }
    }

    /// Projects owned by `user`.
    pub fn list_projects(&self, user: UserId) -> ServiceResult<Vec<Project>> {
        Ok(self.projects.list_projects(user)?)
    }

    /// Loads one project and checks that `user` owns it.
    pub fn get_owned(&self, user: UserId, id: ProjectId) -> ServiceResult<Project> {
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

    pub fn create_project(&self, user: UserId, draft: &ProjectDraft) -> ServiceResult<Project> {
        let id = self.projects.create_project(user, draft)?;
        info!("event=project_create module=service status=ok project_id={id} user_id={user}");
        self.get_owned(user, id)
    }

    pub fn update_project(
        &self,
        user: UserId,
        id: ProjectId,
        draft: &ProjectDraft,
    ) -> ServiceResult<Project> {
        self.get_owned(user, id)?;
        self.projects.update_project(id, draft)?;
        info!("event=project_update module=service status=ok project_id={id} user_id={user}");
        self.get_owned(user, id)
    }

    /// Deletes the project and, through cascade, its tasks.
    pub fn delete_project(&self, user: UserId, id: ProjectId) -> ServiceResult<Project> {
        let project = self.get_owned(user, id)?;
        self.projects.delete_project(id)?;
        info!("event=project_delete module=service status=ok project_id={id} user_id={user}");
        Ok(project)
    }
}
