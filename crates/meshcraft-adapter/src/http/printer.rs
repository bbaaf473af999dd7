/*
[INPUT]:  Device identifiers, bind codes, print task parameters
[OUTPUT]: Printer records (status mapped to client vocabulary) and print task ids
[POS]:    HTTP layer - printer endpoints (require session)
[UPDATE]: When adding printer endpoints or changing the backend status vocabulary
*/

use reqwest::Method;

use crate::http::{MeshcraftClient, Result};
use crate::types::{
    ApiPrinter, BindPrinterRequest, CreatePrintTaskRequest, PrintTaskCreated, PrinterRecord,
};
use crate::validation::{normalize_bind_code, normalize_device_name};

impl MeshcraftClient {
    /// List printers bound to the signed-in user
    ///
    /// GET /api/printers
    pub async fn list_printers(&self) -> Result<Vec<PrinterRecord>> {
        let builder = self.request(Method::GET, "/api/printers")?;
        let printers: Vec<ApiPrinter> = self.send_json(builder).await?;
        Ok(printers.into_iter().map(PrinterRecord::from).collect())
    }

    /// Get a printer's current state
    ///
    /// GET /api/printers/{deviceId}
    pub async fn printer_detail(&self, device_id: &str) -> Result<PrinterRecord> {
        let endpoint = format!("/api/printers/{}", device_id);
        let builder = self.request(Method::GET, &endpoint)?;
        let printer: ApiPrinter = self.send_json(builder).await?;
        Ok(printer.into())
    }

    /// Bind a printer to the signed-in user.
    ///
    /// Inputs are validated before any request is built.
    ///
    /// POST /api/printers/bind
    pub async fn bind_printer(&self, device_name: &str, code: &str) -> Result<PrinterRecord> {
        let body = BindPrinterRequest {
            device_name: normalize_device_name(device_name)?,
            code: normalize_bind_code(code)?,
        };
        let builder = self.request(Method::POST, "/api/printers/bind")?;
        let printer: ApiPrinter = self.send_json(builder.json(&body)).await?;
        Ok(printer.into())
    }

    /// Unbind a printer
    ///
    /// POST /api/printers/{deviceId}/unbind
    pub async fn unbind_printer(&self, device_id: &str) -> Result<()> {
        let endpoint = format!("/api/printers/{}/unbind", device_id);
        let builder = self.request(Method::POST, &endpoint)?;
        self.send_unit(builder).await
    }

    /// Send a model to a printer
    ///
    /// POST /api/printers/{deviceId}/print
    pub async fn create_print_task(
        &self,
        device_id: &str,
        model_id: &str,
        task_name: &str,
    ) -> Result<PrintTaskCreated> {
        let endpoint = format!("/api/printers/{}/print", device_id);
        let body = CreatePrintTaskRequest {
            model_id: model_id.to_string(),
            task_name: task_name.to_string(),
        };
        let builder = self.request(Method::POST, &endpoint)?;
        self.send_json(builder.json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, ErrorKind, MeshcraftClient};
    use crate::types::PrinterStatus;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MeshcraftClient {
        MeshcraftClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
    }

    #[tokio::test]
    async fn test_list_printers_maps_status() {
        let server = MockServer::start().await;
        let mock_response = r#"{
            "success": true,
            "data": [
                { "deviceId": "d1", "deviceName": "R1-AAAAAA", "status": "ONLINE" },
                {
                    "deviceId": "d2",
                    "deviceName": "R1-BBBBBB",
                    "status": "PRINTING",
                    "startTime": "2026-01-01T10:00:00Z",
                    "estimatedEndTime": "2026-01-01T11:30:00Z",
                    "progress": 40,
                    "currentTaskName": "fox"
                }
            ]
        }"#;

        let _mock = Mock::given(method("GET"))
            .and(path("/api/printers"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(mock_response, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let printers = client_for(&server)
            .list_printers()
            .await
            .expect("list_printers failed");

        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].status, PrinterStatus::Idle);
        assert_eq!(printers[1].status, PrinterStatus::Printing);
        assert_eq!(printers[1].progress, Some(40));
        assert!(printers[1].estimated_end_time.is_some());
    }

    #[tokio::test]
    async fn test_unknown_backend_status_is_rejected() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("GET"))
            .and(path("/api/printers/d1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "deviceId": "d1", "status": "CALIBRATING" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .printer_detail("d1")
            .await
            .expect_err("unmapped status must fail");
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn test_bind_printer_sends_normalized_body() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("POST"))
            .and(path("/api/printers/bind"))
            .and(body_json(serde_json::json!({
                "deviceName": "R1-AX6FFI",
                "code": "A1B2C3"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "deviceId": "d7", "deviceName": "R1-AX6FFI", "status": "ONLINE" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let printer = client_for(&server)
            .bind_printer("r1-ax6ffi", "a1b2c3")
            .await
            .expect("bind_printer failed");
        assert_eq!(printer.device_id, "d7");
    }

    #[tokio::test]
    async fn test_bind_printer_validation_skips_network() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("POST"))
            .and(path("/api/printers/bind"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .bind_printer("R1AX6FFI", "A1B2C3")
            .await
            .expect_err("missing hyphen");
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = client
            .bind_printer("R1-AX6FFI", "A1B2C")
            .await
            .expect_err("short code");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_create_print_task() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("POST"))
            .and(path("/api/printers/d1/print"))
            .and(body_json(serde_json::json!({
                "modelId": "m1",
                "taskName": "fox"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "data": { "taskId": "p-100", "deviceId": "d1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_print_task("d1", "m1", "fox")
            .await
            .expect("create_print_task failed");
        assert_eq!(created.task_id, "p-100");
    }

    #[tokio::test]
    async fn test_unbind_printer() {
        let server = MockServer::start().await;
        let _mock = Mock::given(method("POST"))
            .and(path("/api/printers/d1/unbind"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .unbind_printer("d1")
            .await
            .expect("unbind_printer failed");
    }
}
