use super::{AuthUrlResponse, MusicProvider};
use crate::macros::setter;
use crate::request::{EmptyResponse, Request, RequestData};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

// Common

/// Link between a Banger account and one external music provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicIntegration {
    pub provider: MusicProvider,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub has_valid_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl MusicIntegration {
    pub fn disconnected(provider: MusicProvider) -> Self {
        Self {
            provider,
            is_connected: false,
            has_valid_token: false,
            user_id: None,
            display_name: None,
            avatar: None,
            connected_at: None,
            last_sync_at: None,
            permissions: Vec::new(),
        }
    }

    /// Drop the connection and the provider-side identity, keeping granted permissions.
    pub fn reset_connection(&mut self) {
        self.is_connected = false;
        self.has_valid_token = false;
        self.user_id = None;
        self.display_name = None;
        self.avatar = None;
        self.connected_at = None;
        self.last_sync_at = None;
    }
}

/// One record per provider, always covering all of [`MusicProvider::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct IntegrationMap(BTreeMap<MusicProvider, MusicIntegration>);

impl IntegrationMap {
    pub fn new() -> Self {
        Self(
            MusicProvider::ALL
                .into_iter()
                .map(|p| (p, MusicIntegration::disconnected(p)))
                .collect(),
        )
    }

    /// Overlay backend records on the all-disconnected defaults.
    pub fn reconcile<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MusicIntegration>,
    {
        let mut map = Self::new();
        for record in records {
            map.0.insert(record.provider, record);
        }
        map
    }

    pub fn get(&self, provider: MusicProvider) -> &MusicIntegration {
        // Every provider is inserted by `new`, and nothing ever removes one.
        &self.0[&provider]
    }

    pub fn get_mut(&mut self, provider: MusicProvider) -> &mut MusicIntegration {
        self.0
            .entry(provider)
            .or_insert_with(|| MusicIntegration::disconnected(provider))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MusicIntegration> {
        self.0.values()
    }

    pub fn providers(&self) -> impl Iterator<Item = MusicProvider> + '_ {
        self.0.keys().copied()
    }

    pub fn connected(&self) -> impl Iterator<Item = &MusicIntegration> {
        self.0.values().filter(|i| i.is_connected)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for IntegrationMap {
    fn default() -> Self {
        Self::new()
    }
}

impl<'de> Deserialize<'de> for IntegrationMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let records = IntegrationRecords::deserialize(deserializer)?;
        Ok(Self::reconcile(records.into_records()))
    }
}

/// The backend has sent integrations both as a list and as a provider-keyed map.
///
/// Records are kept raw until [`IntegrationRecords::into_records`], so one record
/// for a provider this client doesn't know can't sink the others.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegrationRecords {
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl IntegrationRecords {
    /// Decode every record for a known provider, skipping the rest.
    pub fn into_records(self) -> Vec<MusicIntegration> {
        let raw: Vec<Value> = match self {
            Self::List(records) => records,
            Self::Map(map) => map
                .into_iter()
                .map(|(provider, mut record)| {
                    if let Value::Object(fields) = &mut record {
                        fields.insert("provider".to_string(), Value::String(provider));
                    }
                    record
                })
                .collect(),
        };

        raw.into_iter()
            .filter_map(|record| match serde_json::from_value::<MusicIntegration>(record) {
                Ok(integration) => Some(integration),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unrecognized integration record");
                    None
                }
            })
            .collect()
    }
}

// Requests

/// `GET /auth/integrations`
#[derive(Default, Debug, Clone)]
pub struct ListIntegrations;

impl Request for ListIntegrations {
    type Data = ();
    type Response = IntegrationsResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        "/auth/integrations".into()
    }
}

/// Fetch the authorization URL that starts a provider's OAuth flow.
#[derive(Debug, Clone)]
pub struct GetConnectUrl {
    provider: MusicProvider,
}

impl GetConnectUrl {
    pub fn new(provider: MusicProvider) -> Self {
        Self { provider }
    }
}

impl Request for GetConnectUrl {
    type Data = ();
    type Response = AuthUrlResponse;

    fn endpoint(&self) -> Cow<'_, str> {
        match self.provider {
            MusicProvider::Spotify => "/spotify/auth".into(),
            provider => format!("/auth/integrations/{}/connect", provider).into(),
        }
    }
}

/// Hand the redirect-back `code`/`state` to the backend to finish the exchange.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteConnection {
    #[serde(skip)]
    provider: MusicProvider,
    code: Option<String>,
    state: Option<String>,
}

impl CompleteConnection {
    pub fn new(provider: MusicProvider) -> Self {
        Self {
            provider,
            code: None,
            state: None,
        }
    }

    setter!(opt code: String);
    setter!(opt state: String);
}

impl Request for CompleteConnection {
    type Data = Self;
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/auth/integrations/{}/connect", self.provider).into()
    }

    fn data(&self) -> RequestData<&Self> {
        RequestData::Json(self)
    }
}

#[derive(Debug, Clone)]
pub struct Disconnect {
    provider: MusicProvider,
}

impl Disconnect {
    pub fn new(provider: MusicProvider) -> Self {
        Self { provider }
    }
}

impl Request for Disconnect {
    type Data = ();
    type Response = EmptyResponse;
    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/auth/integrations/{}/disconnect", self.provider).into()
    }
}

// Responses

#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationsResponse {
    pub integrations: IntegrationRecords,
}
