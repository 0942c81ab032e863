//! SMS driver registry
//!
//! Owned by the composition root and populated at startup.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::driver::{OpenOptions, SmsConn, SmsDriver, WebhookContext};
use crate::{Error, Result};

/// Maps driver names to drivers
#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn SmsDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver under its own name.
    ///
    /// Registering the same driver instance twice is a no-op; a different
    /// driver under a taken name is rejected.
    pub fn register(&mut self, driver: Arc<dyn SmsDriver>) -> Result<()> {
        let name = driver.name().to_string();

        if let Some(existing) = self.drivers.get(&name) {
            if Arc::ptr_eq(existing, &driver) {
                return Ok(());
            }
            return Err(Error::DriverAlreadyRegistered(name));
        }

        info!(driver = %name, "Registered SMS driver");
        self.drivers.insert(name, driver);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SmsDriver>> {
        self.drivers.get(name).cloned()
    }

    /// Open a connection through the named driver
    pub fn open(&self, name: &str, options: &OpenOptions) -> Result<Box<dyn SmsConn>> {
        let driver = self
            .drivers
            .get(name)
            .ok_or_else(|| Error::DriverNotFound(name.to_string()))?;
        driver.open(options)
    }

    /// Webhook routes of every registered driver, each nested under `/{name}`
    pub fn webhook_router(&self, ctx: WebhookContext) -> Router {
        self.drivers
            .iter()
            .fold(Router::new(), |router, (name, driver)| {
                router.nest(&format!("/{}", name), driver.webhook_routes(ctx.clone()))
            })
    }

    /// Registered driver names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FormFields;
    use crate::processor::{ProcessOutcome, ProcessRequest, TextProcessor};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use tower::ServiceExt;

    struct NullConn;

    #[async_trait]
    impl SmsConn for NullConn {
        async fn send_from(&self, _from: &str, _to: &str, _body: &str) -> Result<()> {
            Ok(())
        }

        async fn send(&self, _to: &str, _body: &str) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    struct FakeDriver(&'static str);

    impl SmsDriver for FakeDriver {
        fn name(&self) -> &str {
            self.0
        }

        fn open(&self, _options: &OpenOptions) -> Result<Box<dyn SmsConn>> {
            Ok(Box::new(NullConn))
        }

        fn fields(&self) -> FormFields {
            FormFields {
                sender: "from",
                recipient: "to",
                body: "text",
            }
        }

        fn webhook_routes(&self, _ctx: WebhookContext) -> Router {
            Router::new().route("/", post(|| async { "ok" }))
        }
    }

    struct NoopProcessor;

    #[async_trait]
    impl TextProcessor for NoopProcessor {
        async fn process(&self, _request: &ProcessRequest) -> Result<ProcessOutcome> {
            Ok(ProcessOutcome::default())
        }
    }

    #[test]
    fn test_register_and_open() {
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(FakeDriver("fake"))).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["fake".to_string()]);
        assert!(registry.get("fake").is_some());
        assert!(registry.open("fake", &OpenOptions::default()).is_ok());
    }

    #[test]
    fn test_open_unknown_driver() {
        let registry = DriverRegistry::new();
        let result = registry.open("twilio", &OpenOptions::default());
        assert!(matches!(result, Err(Error::DriverNotFound(name)) if name == "twilio"));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = DriverRegistry::new();
        let driver: Arc<dyn SmsDriver> = Arc::new(FakeDriver("fake"));

        registry.register(Arc::clone(&driver)).unwrap();
        registry.register(Arc::clone(&driver)).unwrap();
        assert_eq!(registry.len(), 1);

        let result = registry.register(Arc::new(FakeDriver("fake")));
        assert!(matches!(result, Err(Error::DriverAlreadyRegistered(_))));
    }

    #[tokio::test]
    async fn test_webhook_router_prefixes_driver_name() {
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(FakeDriver("fake"))).unwrap();

        let app = registry.webhook_router(WebhookContext::new(Arc::new(NoopProcessor)));

        let response = app
            .clone()
            .oneshot(Request::post("/fake").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::post("/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
