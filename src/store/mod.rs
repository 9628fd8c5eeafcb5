pub mod storage;
pub mod types;

pub use storage::{get_data_path, load_observations};
pub use types::{AsOfCursor, Observation, ObservationStore};
