pub mod books;

use bookshelf_db::DbPool;
use bookshelf_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, pool: &DbPool) {
    registry.register(books::create_module(pool));
}

/// `(METHOD, path)` of every route the application serves
pub fn route_table() -> Vec<(&'static str, &'static str)> {
    let mut routes = vec![("GET", "/healthz"), ("GET", "/docs/openapi.json")];
    routes.extend_from_slice(books::ROUTES);
    routes
}
