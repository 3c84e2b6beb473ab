use serde::Deserialize;

/// Posted by the block page: what the user will do instead.
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    pub task: String,
}
