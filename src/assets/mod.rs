// ASSETS: Model files for the scene
pub mod loader;

pub use loader::{load_raft, parse_model, AssetError, AssetHandle, RAFT_ASSET};
