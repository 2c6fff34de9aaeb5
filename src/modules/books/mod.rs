pub mod handlers;
pub mod models;
pub mod seed;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookshelf_db::DbPool;
use bookshelf_kernel::{InitCtx, Migration, Module};

use handlers::SharedStore;
use store::SqliteBookStore;

/// The HTTP surface of this module, as `(METHOD, path)`.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/books"),
    ("POST", "/books"),
    ("GET", "/books/{id}"),
    ("PUT", "/books/{id}"),
    ("DELETE", "/books/{id}"),
];

/// Book catalog module: CRUD over the `books` table
pub struct BooksModule {
    store: SharedStore,
}

impl BooksModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

/// Schema for the `books` table
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                author      TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );
            "#,
    }]
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/books", get(handlers::list_books).post(handlers::create_book))
            .route(
                "/books/{id}",
                get(handlers::show_book)
                    .put(handlers::update_book)
                    .delete(handlers::delete_book),
            )
            .with_state(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id_param = serde_json::json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "minimum": 0 }
        });
        let book_body = serde_json::json!({
            "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/BookInput" } },
                "application/x-www-form-urlencoded": { "schema": { "$ref": "#/components/schemas/BookInput" } }
            }
        });
        let one_book = serde_json::json!({
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BookEnvelope" } } }
        });
        let not_found = serde_json::json!({
            "description": "Book not found",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NotFound" } } }
        });
        let invalid = serde_json::json!({
            "description": "Validation error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });

        Some(serde_json::json!({
            "paths": {
                "/books": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookListEnvelope" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body,
                        "responses": {
                            "201": {
                                "description": "Created; `Location` points at the new book",
                                "headers": { "Location": { "schema": { "type": "string" } } },
                                "content": one_book["content"]
                            },
                            "422": invalid
                        }
                    }
                },
                "/books/{id}": {
                    "get": {
                        "summary": "Show a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": { "description": "The book", "content": one_book["content"] },
                            "404": not_found
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "requestBody": book_body,
                        "responses": {
                            "200": { "description": "The updated book", "content": one_book["content"] },
                            "404": not_found,
                            "422": invalid
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": not_found
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "author": { "type": "string" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "description", "author", "created_at", "updated_at"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "author": { "type": "string" }
                        }
                    },
                    "BookEnvelope": {
                        "type": "object",
                        "properties": { "data": { "$ref": "#/components/schemas/Book" } },
                        "required": ["data"]
                    },
                    "BookListEnvelope": {
                        "type": "object",
                        "properties": {
                            "data": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } }
                        },
                        "required": ["data"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module backed by the given pool
pub fn create_module(pool: &DbPool) -> Arc<BooksModule> {
    let store: SharedStore = Arc::new(SqliteBookStore::new(pool.clone()));
    Arc::new(BooksModule::new(store))
}
