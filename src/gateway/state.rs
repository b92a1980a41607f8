use std::sync::Arc;

use crate::research::Researcher;
use crate::store::EvaluationStore;
use crate::supervisor::RunSupervisor;

#[derive(Clone)]
pub struct HandlerState {
    pub store: Arc<dyn EvaluationStore>,

    pub researcher: Researcher,

    pub supervisor: RunSupervisor,

    /// Required on every non-probe route when set.
    pub api_key: Option<Arc<str>>,
}

impl HandlerState {
    pub fn new(
        store: Arc<dyn EvaluationStore>,
        researcher: Researcher,
        supervisor: RunSupervisor,
    ) -> Self {
        Self {
            store,
            researcher,
            supervisor,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.is_empty()).map(Arc::from);
        self
    }
}
