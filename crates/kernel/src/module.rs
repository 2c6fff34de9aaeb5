use async_trait::async_trait;
use axum::Router;

/// Borrowed view of the application handed to lifecycle hooks
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// One schema step. `id` must sort after every earlier step of the same module.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A self-contained slice of the application: routes, schema and lifecycle.
///
/// Every hook except [`Module::name`] has an empty default, so a module only
/// overrides what it contributes.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key, also used to namespace migrations
    fn name(&self) -> &'static str;

    /// Runs once the schema is current, before any request is served
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes with absolute paths; merged at the root of the application router
    fn routes(&self) -> Router {
        Router::new()
    }

    /// `paths` and `components.schemas` to splice into `/docs/openapi.json`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Schema steps owned by this module.
    ///
    /// The registry orders them by `(module name, id)`, so the order of this
    /// list does not matter.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Shutdown hook; modules are stopped in reverse registration order
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
