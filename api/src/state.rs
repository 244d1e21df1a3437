use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::knowledge::{EmptyKnowledgeRetriever, KnowledgeRetriever};

#[derive(Clone)]
pub struct AppState {
    pub knowledge: Arc<dyn KnowledgeRetriever>,
    pub knowledge_timeout: Duration,
}

impl AppState {
    pub fn new(config: &ServerConfig, knowledge: Arc<dyn KnowledgeRetriever>) -> Self {
        Self {
            knowledge,
            knowledge_timeout: config.knowledge_timeout,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ServerConfig::default(), Arc::new(EmptyKnowledgeRetriever))
    }
}
