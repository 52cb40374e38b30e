pub mod entities;
pub mod errors;
pub mod ports;
pub mod value_objects;

pub use entities::Task;
pub use errors::TaskError;
pub use ports::TaskRepository;
pub use value_objects::{RecordModule, RelatedTo, TaskPriority, TaskStatus};
