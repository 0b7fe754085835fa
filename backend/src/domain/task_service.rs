//! Task mutation service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{
    DeleteTaskRequest, TaskCommand, TaskRepository, TaskRepositoryError,
};
use crate::domain::{Error, Permission, Task, WorkspaceAccess};

/// Service implementing [`TaskCommand`].
#[derive(Clone)]
pub struct TaskService {
    access: WorkspaceAccess,
    tasks: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(
        access: WorkspaceAccess,
        tasks: Arc<dyn TaskRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access,
            tasks,
            clock,
        }
    }
}

/// Active task or 404 `Task not found`.
pub(crate) async fn load_active_task(
    tasks: &dyn TaskRepository,
    task_id: &Uuid,
) -> Result<Task, Error> {
    tasks
        .find_active(task_id)
        .await
        .map_err(map_task_error)?
        .ok_or_else(|| Error::not_found("Task not found"))
}

pub(crate) fn map_task_error(error: TaskRepositoryError) -> Error {
    match error {
        TaskRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("task repository unavailable: {message}"))
        }
        TaskRepositoryError::Query { message } => {
            Error::internal(format!("task repository error: {message}"))
        }
    }
}

#[async_trait]
impl TaskCommand for TaskService {
    async fn delete_task(&self, request: DeleteTaskRequest) -> Result<(), Error> {
        let task = load_active_task(self.tasks.as_ref(), &request.task_id).await?;
        let workspace = self.access.by_id(&task.workspace_id).await?;
        self.access
            .require(&workspace, &request.user_id, Permission::Write)
            .await?;

        self.tasks
            .soft_delete(&task.id, &request.user_id, self.clock.utc())
            .await
            .map_err(map_task_error)?;
        info!(task_id = %task.id, workspace_id = %workspace.id, user_id = %request.user_id, "task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockTaskRepository, MockWorkspaceRepository};
    use crate::domain::{ErrorCode, UserId, Workspace, WorkspaceRole};
    use crate::test_support::FixedClock;
    use rstest::rstest;

    const WORKSPACE: Uuid = Uuid::from_u128(1);
    const TASK: Uuid = Uuid::from_u128(2);

    fn task() -> Task {
        Task {
            id: TASK,
            workspace_id: WORKSPACE,
            title: "Ship it".into(),
            status: "TODO".into(),
            deleted: false,
            deleted_at: None,
        }
    }

    fn workspace() -> Workspace {
        Workspace {
            id: WORKSPACE,
            name: "Acme".into(),
            slug: "acme".into(),
            owner_id: Uuid::from_u128(99),
            logo_key: None,
            deleted: false,
            deleted_at: None,
        }
    }

    fn service(workspaces: MockWorkspaceRepository, tasks: MockTaskRepository) -> TaskService {
        TaskService::new(
            WorkspaceAccess::new(Arc::new(workspaces)),
            Arc::new(tasks),
            Arc::new(FixedClock::at(2025, 3, 1, 9, 0, 0)),
        )
    }

    fn workspaces_with_role(role: Option<WorkspaceRole>) -> MockWorkspaceRepository {
        let mut workspaces = MockWorkspaceRepository::new();
        workspaces
            .expect_find_active_by_id()
            .return_once(|_| Ok(Some(workspace())));
        workspaces
            .expect_find_member_role()
            .return_once(move |_, _| Ok(role));
        workspaces
    }

    #[tokio::test]
    async fn developer_soft_deletes_task() {
        let user = UserId::random();
        let expected_user = user.clone();
        let mut tasks = MockTaskRepository::new();
        tasks.expect_find_active().return_once(|_| Ok(Some(task())));
        tasks
            .expect_soft_delete()
            .withf(move |id, by, at| {
                *id == TASK && *by == expected_user && at.to_rfc3339() == "2025-03-01T09:00:00+00:00"
            })
            .times(1)
            .return_once(|_, _, _| Ok(()));

        service(workspaces_with_role(Some(WorkspaceRole::Developer)), tasks)
            .delete_task(DeleteTaskRequest {
                user_id: user,
                task_id: TASK,
            })
            .await
            .expect("task deleted");
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_find_active().return_once(|_| Ok(None));
        tasks.expect_soft_delete().never();

        let err = service(MockWorkspaceRepository::new(), tasks)
            .delete_task(DeleteTaskRequest {
                user_id: UserId::random(),
                task_id: TASK,
            })
            .await
            .expect_err("not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), "Task not found");
    }

    #[rstest]
    #[case(None)]
    #[case(Some(WorkspaceRole::Viewer))]
    #[case(Some(WorkspaceRole::Stakeholder))]
    #[tokio::test]
    async fn callers_without_write_access_are_forbidden(#[case] role: Option<WorkspaceRole>) {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_find_active().return_once(|_| Ok(Some(task())));
        tasks.expect_soft_delete().never();

        let err = service(workspaces_with_role(role), tasks)
            .delete_task(DeleteTaskRequest {
                user_id: UserId::random(),
                task_id: TASK,
            })
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn deleted_workspace_hides_task() {
        let mut workspaces = MockWorkspaceRepository::new();
        workspaces.expect_find_active_by_id().return_once(|_| Ok(None));
        let mut tasks = MockTaskRepository::new();
        tasks.expect_find_active().return_once(|_| Ok(Some(task())));

        let err = service(workspaces, tasks)
            .delete_task(DeleteTaskRequest {
                user_id: UserId::random(),
                task_id: TASK,
            })
            .await
            .expect_err("not found");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
