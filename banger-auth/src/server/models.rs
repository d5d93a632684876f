use serde::{Deserialize, Serialize};

use crate::session::SessionState;

// Health check
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// GET /session
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub authenticated: bool,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub connected: Vec<String>,
}

impl From<&SessionState> for SessionSummary {
    fn from(state: &SessionState) -> Self {
        Self {
            authenticated: state.is_authenticated(),
            is_loading: state.is_loading,
            display_name: state.user.as_ref().map(|u| u.display_name.clone()),
            error: state.error.clone(),
            connected: state
                .integrations
                .connected()
                .map(|i| i.provider.to_string())
                .collect(),
        }
    }
}
