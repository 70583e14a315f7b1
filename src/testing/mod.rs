mod scripted_model_client;

pub use scripted_model_client::{Scripted, ScriptedModelClient};
