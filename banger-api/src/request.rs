use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use std::borrow::Cow;

/// Body for calls whose response content is irrelevant.
pub type EmptyResponse = serde::de::IgnoredAny;

/// Where a request's payload goes.
pub enum RequestData<T> {
    Empty,
    Query(T),
    Json(T),
}

/// A single backend endpoint.
pub trait Request {
    type Data: Serialize;
    type Response: DeserializeOwned;

    const METHOD: Method = Method::GET;

    fn endpoint(&self) -> Cow<'_, str>;

    fn data(&self) -> RequestData<&Self::Data> {
        RequestData::Empty
    }
}
