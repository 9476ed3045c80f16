pub mod profile;
pub mod todo;
pub mod workflow_state;

pub use profile::{UpdateProfileRequest, UserProfile};
pub use todo::{NewTodoRequest, Priority, Todo, UpdateTodoRequest};
pub use workflow_state::{NewStateRequest, WorkflowState};
