use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A catalog entry as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    /// Assigned by the store on creation, never changes
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub created_at: OffsetDateTime,
    /// Refreshed on every successful mutation
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// The one conversion point from entity to wire representation.
    pub fn to_resource(&self) -> BookResource {
        BookResource {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn location(&self) -> String {
        format!("/books/{}", self.id)
    }
}

/// JSON form of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookResource {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Client input for create and update.
///
/// Only the fillable fields are read; anything else in the body, `id` and the
/// timestamps included, is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

/// Validated input for a new book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub description: String,
    pub author: String,
}

/// Validated partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: &'static str,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}

impl BookPayload {
    /// Require `title` and `author`; `description` defaults to empty.
    pub fn into_new_book(self) -> Result<NewBook, Vec<FieldError>> {
        let mut errors = Vec::new();
        if is_blank(&self.title) {
            errors.push(FieldError {
                field: "title",
                error: "required",
            });
        }
        if is_blank(&self.author) {
            errors.push(FieldError {
                field: "author",
                error: "required",
            });
        }

        match (self.title, self.author) {
            (Some(title), Some(author)) if errors.is_empty() => Ok(NewBook {
                title,
                description: self.description.unwrap_or_default(),
                author,
            }),
            _ => Err(errors),
        }
    }

    /// Required fields may be omitted but not blanked.
    pub fn into_changes(self) -> Result<BookChanges, Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.title.is_some() && is_blank(&self.title) {
            errors.push(FieldError {
                field: "title",
                error: "blank",
            });
        }
        if self.author.is_some() && is_blank(&self.author) {
            errors.push(FieldError {
                field: "author",
                error: "blank",
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookChanges {
            title: self.title,
            description: self.description,
            author: self.author,
        })
    }
}
