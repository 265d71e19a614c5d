//! Posting envelopes to the SOAP endpoint

use std::sync::Arc;

use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::soap::template::SoapTemplate;
use crate::transport::{HttpRequest, Transport};

pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

#[derive(Clone)]
pub struct SoapClient {
    transport: Arc<dyn Transport>,
    url: String,
    action: String,
}

impl SoapClient {
    pub fn new(transport: Arc<dyn Transport>, url: &str, method: &str) -> Self {
        let url = url.trim_matches(|c| c == '/' || c == '\\').to_string();
        let action = format!("{}/{}", url, method);
        Self {
            transport,
            url,
            action,
        }
    }

    /// Value sent in the `SOAPAction` header
    pub fn action(&self) -> &str {
        &self.action
    }

    /// POST the envelope and return the raw response body.
    ///
    /// A non-2xx status is an error; the service answers faults that way.
    pub async fn call(&self, envelope: &SoapTemplate) -> E2eResult<String> {
        debug!("SOAP {} -> {}", envelope.operation().name(), self.url);

        let request = HttpRequest::post(&self.url)
            .header("SOAPAction", &self.action)
            .body(SOAP_CONTENT_TYPE, envelope.as_str());
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            return Err(E2eError::UnexpectedStatus {
                expected: "2xx".to_string(),
                actual: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeServer;
    use crate::soap::template::SoapOperation;

    #[test]
    fn action_joins_trimmed_url_and_method() {
        let transport = Arc::new(FakeServer::default());
        let client = SoapClient::new(transport.clone(), "http://fake/ws/soap.wsdl/", "");
        assert_eq!(client.action(), "http://fake/ws/soap.wsdl/");

        let client = SoapClient::new(transport, "\\http://fake/ws/soap.wsdl\\", "AddCompany");
        assert_eq!(client.action(), "http://fake/ws/soap.wsdl/AddCompany");
    }

    #[tokio::test]
    async fn call_posts_envelope_with_soap_headers() {
        let server = Arc::new(FakeServer::default());
        let client = SoapClient::new(server.clone(), "http://fake/ws/soap.wsdl/", "");
        let envelope = SoapTemplate::new(
            SoapOperation::AddCompany,
            "<sch:AddCompanyRequest><sch:Name>Autotest_C</sch:Name></sch:AddCompanyRequest>",
        );

        let body = client.call(&envelope).await.unwrap();
        assert!(body.contains("<ns2:Name>Autotest_C</ns2:Name>"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let sent = &requests[0];
        assert_eq!(sent.method, reqwest::Method::POST);
        assert_eq!(sent.url, "http://fake/ws/soap.wsdl");
        assert_eq!(sent.header_value("SOAPAction"), Some("http://fake/ws/soap.wsdl/"));
        assert_eq!(sent.header_value("content-type"), Some(SOAP_CONTENT_TYPE));
        assert_eq!(sent.body.as_deref(), Some(envelope.as_str()));
    }

    #[tokio::test]
    async fn fault_status_is_an_error() {
        let server = Arc::new(FakeServer::default());
        let client = SoapClient::new(server, "http://fake/ws/soap.wsdl", "");
        let envelope = SoapTemplate::new(SoapOperation::GetCompany, "<sch:GetCompanyRequest/>");

        let err = client.call(&envelope).await.unwrap_err();
        assert!(matches!(err, E2eError::UnexpectedStatus { actual: 500, .. }));
    }
}
