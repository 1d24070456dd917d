use crate::adapters::generator::{backend_client, ensure_success};
use crate::config::provider::GeneratorConfig;
use crate::utils::error::{DispatchError, Result};
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A product sequences can be written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Client for the product catalog kept by the generation backend.
pub struct ProductClient {
    http: Client,
    config: GeneratorConfig,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DispatchError::validation(format!(
            "Missing required field: {}",
            field
        )));
    }
    Ok(())
}

/// Ids become a single path segment, so separators are not allowed.
fn validate_path_id(field: &str, id: &str) -> Result<()> {
    require(field, id)?;
    if id.contains(['/', '?', '#']) {
        return Err(DispatchError::validation(format!("Invalid {}: {}", field, id)));
    }
    Ok(())
}

impl ProductClient {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Ok(Self {
            http: backend_client(&config)?,
            config,
        })
    }

    /// Lists a user's products. A 404 means the user has none yet.
    pub async fn list_products(&self, user_id: &str) -> Result<Vec<Product>> {
        validate_path_id("user id", user_id)?;
        let url = self.config.endpoint(&format!("/user/{}", user_id.trim()));
        tracing::info!("🔍 Loading products from {}", url);

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::info!("📭 No products found for user {}", user_id);
            return Ok(Vec::new());
        }

        let response = ensure_success(response).await?;
        let body: Value = serde_json::from_str(&response.text().await?)?;
        let products: Vec<Product> = match body {
            Value::Array(_) => serde_json::from_value(body)?,
            _ => Vec::new(),
        };

        tracing::info!("✅ {} products loaded", products.len());
        Ok(products)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        validate_path_id("product id", product_id)?;
        let url = self.config.endpoint(&format!("/{}", product_id.trim()));
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    pub async fn create_product(&self, name: &str, description: &str) -> Result<Product> {
        let form = Self::product_form(name, description)?;
        let product = self.post_product(form).await?;
        tracing::info!("✅ Product created: {} ({})", product.product_name, product.id);
        Ok(product)
    }

    /// Replaces the name and description of an existing product.
    pub async fn update_product(
        &self,
        product_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Product> {
        validate_path_id("product id", product_id)?;
        let form = Self::product_form(name, description)?
            .text("product_id", product_id.trim().to_string());
        let product = self.post_product(form).await?;
        tracing::info!("✅ Product updated: {}", product.id);
        Ok(product)
    }

    fn product_form(name: &str, description: &str) -> Result<Form> {
        require("product name", name)?;
        require("product description", description)?;
        Ok(Form::new()
            .text("product_name", name.trim().to_string())
            .text("product_description", description.trim().to_string()))
    }

    async fn post_product(&self, form: Form) -> Result<Product> {
        let url = self.config.endpoint("/");
        tracing::debug!("POST {}", url);

        let response = self.http.post(url).multipart(form).send().await?;
        let response = ensure_success(response).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ProductClient {
        ProductClient::new(GeneratorConfig {
            base_url: server.url("/api/v1"),
            ..GeneratorConfig::default()
        })
        .unwrap()
    }

    fn product_json(id: &str, description: &str) -> Value {
        json!({
            "id": id,
            "product_name": "PipePro",
            "product_description": description,
            "user_id": "user-1",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_products_for_user() {
        let server = MockServer::start();
        let list_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/user/user-1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!([
                    product_json("p-1", "CRM for plumbers"),
                    product_json("p-2", "Invoicing for electricians")
                ]));
        });

        let products = client_for(&server).list_products("user-1").await.unwrap();

        list_mock.assert();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].id, "p-2");
        assert_eq!(products[0].user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_list_products_not_found_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/user/new-user");
            then.status(404)
                .header("Content-Type", "application/json")
                .json_body(json!({"detail": "No products"}));
        });

        let products = client_for(&server).list_products("new-user").await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_list_products_non_array_body_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/user/user-1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"items": []}));
        });

        let products = client_for(&server).list_products("user-1").await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_list_products_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/user/user-1");
            then.status(500).body("database unavailable");
        });

        match client_for(&server).list_products("user-1").await {
            Err(DispatchError::GeneratorError { message }) => {
                assert_eq!(message, "database unavailable")
            }
            other => panic!("expected generator error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_product() {
        let server = MockServer::start();
        let get_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/p-1");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(product_json("p-1", "CRM for plumbers"));
        });

        let product = client_for(&server).get_product("p-1").await.unwrap();

        get_mock.assert();
        assert_eq!(product.product_description, "CRM for plumbers");
    }

    #[tokio::test]
    async fn test_invalid_product_id_makes_no_request() {
        let server = MockServer::start();
        let any_get = server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(product_json("p-1", "x"));
        });

        let client = client_for(&server);
        assert!(matches!(
            client.get_product("").await,
            Err(DispatchError::ValidationError { .. })
        ));
        assert!(matches!(
            client.get_product("user/p-1").await,
            Err(DispatchError::ValidationError { .. })
        ));
        any_get.assert_hits(0);
    }

    #[tokio::test]
    async fn test_create_product_sends_form_fields() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/")
                .body_contains("name=\"product_name\"")
                .body_contains("PipePro")
                .body_contains("name=\"product_description\"")
                .body_contains("CRM for plumbers");
            then.status(201)
                .header("Content-Type", "application/json")
                .json_body(product_json("p-9", "CRM for plumbers"));
        });

        let product = client_for(&server)
            .create_product("PipePro", "CRM for plumbers")
            .await
            .unwrap();

        create_mock.assert();
        assert_eq!(product.id, "p-9");
    }

    #[tokio::test]
    async fn test_create_product_error_uses_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/");
            then.status(422)
                .header("Content-Type", "application/json")
                .json_body(json!({"detail": "Product name already exists"}));
        });

        match client_for(&server).create_product("PipePro", "CRM").await {
            Err(DispatchError::GeneratorError { message }) => {
                assert_eq!(message, "Product name already exists")
            }
            other => panic!("expected generator error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_product_requires_name_and_description() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/api/v1/");
            then.status(201).json_body(product_json("p-9", "x"));
        });

        let client = client_for(&server);
        assert!(matches!(
            client.create_product(" ", "CRM").await,
            Err(DispatchError::ValidationError { .. })
        ));
        assert!(matches!(
            client.create_product("PipePro", "").await,
            Err(DispatchError::ValidationError { .. })
        ));
        create_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_update_product_includes_id() {
        let server = MockServer::start();
        let update_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/")
                .body_contains("name=\"product_id\"")
                .body_contains("p-1")
                .body_contains("Now with scheduling");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(product_json("p-1", "Now with scheduling"));
        });

        let product = client_for(&server)
            .update_product("p-1", "PipePro", "Now with scheduling")
            .await
            .unwrap();

        update_mock.assert();
        assert_eq!(product.product_description, "Now with scheduling");
    }
}
