use std::sync::Arc;

use serde_json::{json, Value};

use super::slides_models::PresentationInfo;
use super::slides_requests::BatchUpdate;
use crate::core::api::GoogleApi;
use crate::core::error::Result;
use crate::core::transport::{ApiRequest, GoogleTransport};

/// Thin wrapper over the Slides v1 REST API.
pub struct SlidesService<T: GoogleTransport> {
    transport: Arc<T>,
}

impl<T: GoogleTransport> Clone for SlidesService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: GoogleTransport> SlidesService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub async fn create(&self, title: &str) -> Result<PresentationInfo> {
        let request =
            ApiRequest::post(GoogleApi::Slides, "presentations").json(json!({ "title": title }));
        let value = self.transport.send_json(request).await?;
        let info: PresentationInfo = serde_json::from_value(value)?;
        tracing::info!("Created presentation '{}' ({})", title, info.presentation_id);
        Ok(info)
    }

    pub async fn get(&self, presentation_id: &str) -> Result<PresentationInfo> {
        let request = ApiRequest::get(
            GoogleApi::Slides,
            &format!("presentations/{}", presentation_id),
        )
        .query("fields", "*");
        let value = self.transport.send_json(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sends every request of `batch` in one call. Scopes of any extra API the
    /// requests touch (Sheets for linked charts) are added to the token.
    pub async fn batch_update(&self, presentation_id: &str, batch: &BatchUpdate) -> Result<Value> {
        let mut request = ApiRequest::post(
            GoogleApi::Slides,
            &format!("presentations/{}:batchUpdate", presentation_id),
        )
        .json(batch.to_body());
        for api in batch.additional_apis() {
            request = request.with_api(*api);
        }

        tracing::debug!(
            "Sending {} request(s) to presentation {}",
            batch.len(),
            presentation_id
        );
        self.transport.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slides::slides_requests::{LinkingMode, SlidesRequest};
    use crate::infra::transport::InMemoryTransport;

    #[tokio::test]
    async fn chart_batch_requests_the_sheets_scope() {
        let transport = Arc::new(InMemoryTransport::new());
        let slides = SlidesService::new(Arc::clone(&transport));
        transport.push_json(json!({ "replies": [{}] }));

        let batch = BatchUpdate::new().with(SlidesRequest::replace_shape_with_chart(
            "chart",
            "sheet",
            1,
            LinkingMode::Linked,
            &[],
        ));
        slides.batch_update("p1", &batch).await.unwrap();

        let sent = &transport.requests()[0];
        assert!(sent.url.ends_with("presentations/p1:batchUpdate"));
        assert_eq!(
            sent.scopes,
            vec![GoogleApi::Slides.scope(), GoogleApi::Sheets.scope()]
        );
        assert_eq!(
            sent.json_body().unwrap()["requests"][0]["replaceAllShapesWithSheetsChart"]["linkingMode"],
            "LINKED"
        );
    }

    #[tokio::test]
    async fn get_reads_every_field() {
        let transport = Arc::new(InMemoryTransport::new());
        let slides = SlidesService::new(Arc::clone(&transport));
        transport.push_json(json!({ "presentationId": "p1", "title": "Deck" }));

        let info = slides.get("p1").await.unwrap();

        assert_eq!(info.title, "Deck");
        assert_eq!(transport.requests()[0].query_value("fields"), Some("*"));
    }
}
