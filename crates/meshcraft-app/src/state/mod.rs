pub mod storage;

pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, load_snapshot, save_snapshot};
