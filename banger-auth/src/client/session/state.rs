use banger_api::endpoints::{
    integrations::{IntegrationMap, MusicIntegration},
    AuthUser, MusicProvider,
};

/// What the client currently knows about the signed-in account.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub integrations: IntegrationMap,
}

impl SessionState {
    /// Fresh state for a newly mounted session: loading until the first refresh settles.
    pub fn new() -> Self {
        Self {
            user: None,
            is_loading: true,
            error: None,
            integrations: IntegrationMap::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub enum SessionAction {
    /// A profile refresh started
    RefreshStarted,

    /// A profile refresh finished, successfully or not
    RefreshFinished,

    /// The backend reported who is signed in (or that nobody is)
    UserLoaded(Option<AuthUser>),

    /// Integration records fetched from the backend
    IntegrationsLoaded(Vec<MusicIntegration>),

    /// Integration fetch failed or there is no user: back to all-disconnected
    IntegrationsReset,

    /// One provider was disconnected
    ProviderDisconnected(MusicProvider),

    /// The session could not be established
    SessionFailed(String),

    SignedOut,

    Failed(String),

    ClearError,
}

/// Pure state transition function for session actions
pub fn reduce(state: &mut SessionState, action: SessionAction) {
    match action {
        SessionAction::RefreshStarted => {
            state.is_loading = true;
            state.error = None;
        }

        SessionAction::RefreshFinished => {
            state.is_loading = false;
        }

        SessionAction::UserLoaded(user) => {
            if user.is_none() {
                state.integrations = IntegrationMap::new();
            }
            state.user = user;
        }

        SessionAction::IntegrationsLoaded(records) => {
            state.integrations = IntegrationMap::reconcile(records);
        }

        SessionAction::IntegrationsReset => {
            state.integrations = IntegrationMap::new();
        }

        // Optimistic: the backend is not asked again
        SessionAction::ProviderDisconnected(provider) => {
            state.integrations.get_mut(provider).reset_connection();
        }

        SessionAction::SessionFailed(message) => {
            state.user = None;
            state.integrations = IntegrationMap::new();
            state.error = Some(message);
        }

        SessionAction::SignedOut => {
            state.user = None;
            state.integrations = IntegrationMap::new();
        }

        SessionAction::Failed(message) => {
            state.error = Some(message);
        }

        SessionAction::ClearError => {
            state.error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banger_api::endpoints::AuthProvider;
    use chrono::Utc;

    fn test_user() -> AuthUser {
        AuthUser {
            id: "u1".to_string(),
            email: "kim@example.com".to_string(),
            username: None,
            display_name: "Kim".to_string(),
            avatar: None,
            auth_provider: AuthProvider::Google,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn connected(provider: MusicProvider) -> MusicIntegration {
        MusicIntegration {
            is_connected: true,
            has_valid_token: true,
            user_id: Some("ext-1".to_string()),
            display_name: Some("kim".to_string()),
            permissions: vec!["user-read-currently-playing".to_string()],
            ..MusicIntegration::disconnected(provider)
        }
    }

    #[test]
    fn test_new_state_is_loading_and_anonymous() {
        let state = SessionState::new();

        assert!(state.is_loading);
        assert!(!state.is_authenticated());
        assert_eq!(state.integrations.len(), 4);
    }

    #[test]
    fn test_refresh_started_clears_error() {
        let mut state = SessionState::new();
        state.is_loading = false;
        state.error = Some("boom".to_string());

        reduce(&mut state, SessionAction::RefreshStarted);

        assert!(state.is_loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_user_loaded_sets_authentication() {
        let mut state = SessionState::new();

        reduce(&mut state, SessionAction::UserLoaded(Some(test_user())));
        assert!(state.is_authenticated());

        reduce(&mut state, SessionAction::UserLoaded(None));
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_integrations_loaded_fills_missing_providers() {
        let mut state = SessionState::new();

        reduce(
            &mut state,
            SessionAction::IntegrationsLoaded(vec![connected(MusicProvider::Spotify)]),
        );

        assert_eq!(state.integrations.len(), 4);
        assert!(state.integrations.get(MusicProvider::Spotify).is_connected);
        for provider in [
            MusicProvider::AppleMusic,
            MusicProvider::YoutubeMusic,
            MusicProvider::Soundcloud,
        ] {
            let integration = state.integrations.get(provider);
            assert!(!integration.is_connected);
            assert!(!integration.has_valid_token);
            assert!(integration.permissions.is_empty());
        }
    }

    #[test]
    fn test_provider_disconnected_only_touches_that_provider() {
        let mut state = SessionState::new();
        reduce(
            &mut state,
            SessionAction::IntegrationsLoaded(vec![
                connected(MusicProvider::Spotify),
                connected(MusicProvider::Soundcloud),
            ]),
        );

        reduce(
            &mut state,
            SessionAction::ProviderDisconnected(MusicProvider::Spotify),
        );

        let spotify = state.integrations.get(MusicProvider::Spotify);
        assert!(!spotify.is_connected);
        assert!(!spotify.has_valid_token);
        assert_eq!(spotify.user_id, None);
        assert_eq!(spotify.display_name, None);
        assert_eq!(spotify.permissions, vec!["user-read-currently-playing"]);
        assert_eq!(
            state.integrations.get(MusicProvider::Soundcloud),
            &connected(MusicProvider::Soundcloud)
        );
    }

    #[test]
    fn test_session_failed_clears_user_and_records_error() {
        let mut state = SessionState::new();
        reduce(&mut state, SessionAction::UserLoaded(Some(test_user())));
        reduce(
            &mut state,
            SessionAction::IntegrationsLoaded(vec![connected(MusicProvider::Spotify)]),
        );

        reduce(
            &mut state,
            SessionAction::SessionFailed("Internal Server Error".to_string()),
        );

        assert!(!state.is_authenticated());
        assert_eq!(state.error.as_deref(), Some("Internal Server Error"));
        assert!(!state.integrations.get(MusicProvider::Spotify).is_connected);
    }

    #[test]
    fn test_signed_out_keeps_error() {
        let mut state = SessionState::new();
        reduce(&mut state, SessionAction::UserLoaded(Some(test_user())));
        reduce(&mut state, SessionAction::Failed("earlier".to_string()));

        reduce(&mut state, SessionAction::SignedOut);

        assert!(!state.is_authenticated());
        assert_eq!(state.error.as_deref(), Some("earlier"));
    }
}
