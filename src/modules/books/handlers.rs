//! Resource handlers for `/books`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use bookshelf_http::{
    extract::{Numeric, Payload},
    response::{Created, Data},
    AppError,
};

use super::models::{BookPayload, BookResource, FieldError};
use super::store::{BookStore, StoreError};

pub type SharedStore = Arc<dyn BookStore>;

const RESOURCE: &str = "Book";

/// Only the store's not-found signal becomes a domain error; everything else
/// surfaces as an uncaught failure.
fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound(_) => AppError::not_found(RESOURCE),
        other => AppError::Internal(other.into()),
    }
}

fn invalid(fields: Vec<FieldError>) -> AppError {
    let details = fields
        .into_iter()
        .map(|field| serde_json::json!({ "field": field.field, "error": field.error }))
        .collect();
    AppError::validation(details, "The given data was invalid.")
}

/// GET /books
pub async fn list_books(
    State(store): State<SharedStore>,
) -> Result<Data<Vec<BookResource>>, AppError> {
    let books = store.all().await.map_err(store_error)?;
    Ok(Data::new(books.iter().map(|book| book.to_resource()).collect()))
}

/// GET /books/{id}
pub async fn show_book(
    State(store): State<SharedStore>,
    Numeric(id): Numeric<i64>,
) -> Result<Data<BookResource>, AppError> {
    let book = store.find(id).await.map_err(store_error)?;
    Ok(Data::new(book.to_resource()))
}

/// POST /books
pub async fn create_book(
    State(store): State<SharedStore>,
    Payload(payload): Payload<BookPayload>,
) -> Result<Created<BookResource>, AppError> {
    let new_book = payload.into_new_book().map_err(invalid)?;
    let book = store.create(new_book).await.map_err(store_error)?;

    tracing::info!(book_id = book.id, "book created");
    Ok(Created {
        location: book.location(),
        data: book.to_resource(),
    })
}

/// PUT /books/{id}
pub async fn update_book(
    State(store): State<SharedStore>,
    Numeric(id): Numeric<i64>,
    payload: Result<Payload<BookPayload>, AppError>,
) -> Result<Data<BookResource>, AppError> {
    let changes = payload.and_then(|Payload(payload)| payload.into_changes().map_err(invalid));
    let changes = match changes {
        Ok(changes) => changes,
        Err(err) => {
            // A missing book outranks a bad payload, whether it failed to parse or to validate.
            store.find(id).await.map_err(store_error)?;
            return Err(err);
        }
    };

    let book = store.update(id, changes).await.map_err(store_error)?;

    tracing::info!(book_id = book.id, "book updated");
    Ok(Data::new(book.to_resource()))
}

/// DELETE /books/{id}
pub async fn delete_book(
    State(store): State<SharedStore>,
    Numeric(id): Numeric<i64>,
) -> Result<StatusCode, AppError> {
    store.delete(id).await.map_err(store_error)?;

    tracing::info!(book_id = id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
