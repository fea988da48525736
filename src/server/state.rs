use axum::extract::FromRef;

use crate::emotion::FaceAnalyzer;
use crate::recommend::Recommender;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedRecommender = Arc<Recommender>;
pub type GuardedFaceAnalyzer = Arc<dyn FaceAnalyzer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub recommender: GuardedRecommender,
    pub face_analyzer: GuardedFaceAnalyzer,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        recommender: GuardedRecommender,
        face_analyzer: GuardedFaceAnalyzer,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            recommender,
            face_analyzer,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedRecommender {
    fn from_ref(input: &ServerState) -> Self {
        input.recommender.clone()
    }
}

impl FromRef<ServerState> for GuardedFaceAnalyzer {
    fn from_ref(input: &ServerState) -> Self {
        input.face_analyzer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
