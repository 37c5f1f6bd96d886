//! Application services for board orchestration.

mod board;

pub use board::{
    BoardService, BoardServiceError, BoardServiceResult, CreateProjectRequest, CreateTaskRequest,
    UpdateProjectRequest, UpdateTaskRequest,
};
