use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::PrescriptionId,
    protocol::{
        ApiMessage, DailyCount, EntityEnvelope, ListPrescriptionsQuery, LoginRequest,
        LoginResponse, NewPrescription, Page, Prescription, PrescriptionEdit, PrescriptionSummary,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{config::ClientSettings, error::ClientError, session::AuthSession};

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// REST surface of the prescription backend.
#[async_trait]
pub trait PrescriptionBackend: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ClientResult<String>;
    async fn list_prescriptions(
        &self,
        query: &ListPrescriptionsQuery,
    ) -> ClientResult<Page<PrescriptionSummary>>;
    async fn get_prescription(&self, id: PrescriptionId) -> ClientResult<Prescription>;
    async fn create_prescription(&self, body: &NewPrescription) -> ClientResult<ApiMessage>;
    async fn update_prescription(
        &self,
        id: PrescriptionId,
        body: &PrescriptionEdit,
    ) -> ClientResult<ApiMessage>;
    async fn delete_prescription(&self, id: PrescriptionId) -> ClientResult<ApiMessage>;
    async fn daily_counts(&self) -> ClientResult<Vec<DailyCount>>;
}

pub struct HttpBackend {
    http: Client,
    base_url: Url,
    session: AuthSession,
}

impl HttpBackend {
    pub fn new(settings: &ClientSettings, session: AuthSession) -> ClientResult<Self> {
        // Trailing slash so that `join` appends instead of replacing the last segment.
        let base_url = Url::parse(&format!(
            "{}/",
            settings.api_base_url.trim_end_matches('/')
        ))?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()
            .map_err(|source| ClientError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Authorized request; refused locally when nobody is signed in.
    fn request(&self, method: Method, url: &Url) -> ClientResult<RequestBuilder> {
        let Some(token) = self.session.token() else {
            warn!(url = %url, "backend: no session token, request not sent");
            return Err(ClientError::Unauthenticated);
        };
        Ok(self.http.request(method, url.clone()).bearer_auth(token))
    }

    async fn send(&self, url: &Url, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(url = %url, status = status.as_u16(), "backend: request rejected");
        Err(ClientError::from_status(
            url.to_string(),
            status.as_u16(),
            &body,
        ))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        builder: RequestBuilder,
    ) -> ClientResult<T> {
        let response = self.send(url, builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Mutations may answer with an empty body; that still counts as success.
    async fn send_ack(&self, url: &Url, builder: RequestBuilder) -> ClientResult<ApiMessage> {
        let response = self.send(url, builder).await?;
        let body = response
            .text()
            .await
            .map_err(|source| ClientError::Decode {
                url: url.to_string(),
                source,
            })?;
        if body.trim().is_empty() {
            return Ok(ApiMessage::default());
        }
        match serde_json::from_str(&body) {
            Ok(message) => Ok(message),
            Err(err) => {
                warn!(url = %url, "backend: unreadable acknowledgement body: {err}");
                Ok(ApiMessage::default())
            }
        }
    }
}

#[async_trait]
impl PrescriptionBackend for HttpBackend {
    async fn login(&self, username: &str, password: &str) -> ClientResult<String> {
        let url = self.endpoint("api/v1/auth/login")?;
        let builder = self.http.post(url.clone()).json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });
        let body: LoginResponse = self.send_json(&url, builder).await?;
        Ok(body.token)
    }

    async fn list_prescriptions(
        &self,
        query: &ListPrescriptionsQuery,
    ) -> ClientResult<Page<PrescriptionSummary>> {
        let url = self.endpoint("api/v1/prescription")?;
        debug!(
            page = query.page,
            size = query.size,
            start_date = %query.start_date,
            end_date = %query.end_date,
            "backend: list_prescriptions"
        );
        let builder = self.request(Method::GET, &url)?.query(query);
        self.send_json(&url, builder).await
    }

    async fn get_prescription(&self, id: PrescriptionId) -> ClientResult<Prescription> {
        let url = self.endpoint(&format!("api/v1/prescription/{id}"))?;
        let builder = self.request(Method::GET, &url)?;
        let envelope: EntityEnvelope<Prescription> = self.send_json(&url, builder).await?;
        Ok(envelope.into_inner())
    }

    async fn create_prescription(&self, body: &NewPrescription) -> ClientResult<ApiMessage> {
        let url = self.endpoint("api/v1/prescriptions")?;
        let builder = self.request(Method::POST, &url)?.json(body);
        self.send_ack(&url, builder).await
    }

    async fn update_prescription(
        &self,
        id: PrescriptionId,
        body: &PrescriptionEdit,
    ) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&format!("api/v1/prescriptions/{id}"))?;
        let builder = self.request(Method::PATCH, &url)?.json(body);
        self.send_ack(&url, builder).await
    }

    async fn delete_prescription(&self, id: PrescriptionId) -> ClientResult<ApiMessage> {
        let url = self.endpoint(&format!("api/v1/prescriptions/{id}"))?;
        let builder = self.request(Method::DELETE, &url)?;
        self.send_ack(&url, builder).await
    }

    async fn daily_counts(&self) -> ClientResult<Vec<DailyCount>> {
        let url = self.endpoint("api/v1/report")?;
        let builder = self.request(Method::GET, &url)?;
        self.send_json(&url, builder).await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
