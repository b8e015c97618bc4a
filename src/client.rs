use std::str::FromStr;

use crate::{ApiResponseOrError, Credentials, OpenAiError};
use anyhow::Result;
use reqwest::{
    header::{HeaderName, HeaderValue, AUTHORIZATION},
    Client, Method, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Clone)]
pub struct OpenAiClient {
    credentials: Credentials,
    client: Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpenAiClient({})", self.credentials.base_url())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAiErrorWrapper {
    error: OpenAiError,
}

impl OpenAiClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = Client::builder()
            .default_headers(
                [
                    (
                        AUTHORIZATION,
                        HeaderValue::from_str(&format!("Bearer {}", credentials.api_key()))?,
                    ),
                    (
                        HeaderName::from_str("OpenAI-Beta")?,
                        HeaderValue::from_str("assistants=v2")?,
                    ),
                ]
                .into_iter()
                .collect(),
            )
            .build()?;

        Ok(Self {
            credentials,
            client,
        })
    }

    async fn request_inner<S, R>(
        &self,
        method: Method,
        route: R,
        body: Option<S>,
    ) -> Result<Response, reqwest::Error>
    where
        R: Into<String>,
        S: Serialize,
    {
        let url = format!("{}{}", self.credentials.base_url(), route.into());
        log::debug!("OpenAI Request[{method}] {url}");

        let mut request = self.client.request(method.clone(), url.clone());

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;

        log::debug!(
            "OpenAI Response[{method}] {} {url}",
            response.status().as_str()
        );
        Ok(response)
    }

    /// Turns a non-success response into the error the service described.
    async fn error_from(response: Response) -> OpenAiError {
        let result = match response.text().await {
            Ok(text) => text,
            Err(err) => return err.into(),
        };
        match serde_json::from_str::<OpenAiErrorWrapper>(&result) {
            Ok(wrapper) => wrapper.error,
            Err(_) => OpenAiError::new(result, "unknown".to_string()),
        }
    }

    pub async fn request<S, R, T>(
        &self,
        method: Method,
        route: R,
        body: Option<S>,
    ) -> ApiResponseOrError<T>
    where
        R: Into<String>,
        S: Serialize,
        T: DeserializeOwned,
    {
        let response = self.request_inner(method, route, body).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(response.json::<T>().await?)
    }

    pub async fn get<R, T>(&self, route: R) -> ApiResponseOrError<T>
    where
        R: Into<String>,
        T: DeserializeOwned,
    {
        self.request::<(), R, T>(Method::GET, route, None).await
    }

    pub async fn post<S, R, T>(&self, route: R, body: S) -> ApiResponseOrError<T>
    where
        R: Into<String>,
        S: Serialize,
        T: DeserializeOwned,
    {
        self.request(Method::POST, route, Some(body)).await
    }

    /// Fetches a route whose body is raw bytes rather than JSON.
    pub async fn get_bytes<R>(&self, route: R) -> ApiResponseOrError<Vec<u8>>
    where
        R: Into<String>,
    {
        let response = self.request_inner::<(), R>(Method::GET, route, None).await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches a single page of a list endpoint.
    pub async fn list<R, T>(&self, route: R) -> ApiResponseOrError<List<T>>
    where
        R: Into<String>,
        T: DeserializeOwned,
    {
        self.get(route).await
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct List<T> {
    pub first_id: Option<String>,
    pub last_id: Option<String>,
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}
