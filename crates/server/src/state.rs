use std::sync::Arc;

use db::DBService;
use services::services::{
    connection_questions::ConnectionQuestionsService, dating_style::DatingStyleService,
    generation_guard::GenerationGuard, life_vision::LifeVisionService,
    openrouter::OpenRouterClient,
};
use utils::auth::TokenVerifier;

use crate::config::Config;

/// Shared handles for every request. Cloning is cheap; all members are
/// reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub dating_style: DatingStyleService,
    pub life_vision: LifeVisionService,
    pub connection: ConnectionQuestionsService,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: &Config, db: DBService, client: OpenRouterClient) -> Self {
        let guard = GenerationGuard::new();
        Self {
            dating_style: DatingStyleService::new(db.clone(), client.clone(), guard.clone()),
            life_vision: LifeVisionService::new(db.clone(), client, guard),
            connection: ConnectionQuestionsService::new(db.clone()),
            verifier: Arc::new(TokenVerifier::new(&config.jwt_secret)),
            db,
        }
    }
}
