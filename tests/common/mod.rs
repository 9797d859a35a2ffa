//! Shared utilities for integration testing.

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use openapi_mock::config::MockConfig;
use openapi_mock::lifecycle::{self, Shutdown};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Petstore-style document exercising the common cases.
#[allow(dead_code)]
pub const PETSTORE_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                minItems: 2
                maxItems: 4
                items:
                  $ref: '#/components/schemas/Pet'
    post:
      operationId: createPet
      responses:
        '201':
          description: Created
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
  /pets/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema:
          type: integer
    get:
      operationId: showPet
      responses:
        '200':
          description: A pet
          content:
            application/json:
              schema:
                type: object
                required: [id]
                properties:
                  id:
                    type: integer
    delete:
      operationId: deletePet
      responses:
        '200':
          description: Deleted
          content:
            text/plain:
              schema:
                type: string
components:
  schemas:
    Pet:
      type: object
      required: [id, name, status]
      properties:
        id:
          type: integer
          minimum: 1
          maximum: 1000
        name:
          type: string
          example: Rex
        status:
          type: string
          enum: [available, pending, sold]
        tag:
          type: string
"#;

/// Write `contents` to a temp file with the given extension.
pub fn write_spec(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A server running in the background on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(spec: PathBuf, config: MockConfig) -> Self {
        let compiled = lifecycle::compile(&spec, &config).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();

        let stop = shutdown.clone();
        let handle = tokio::spawn(async move {
            lifecycle::serve(listener, spec, compiled, config, stop)
                .await
                .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self { addr, shutdown, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}
