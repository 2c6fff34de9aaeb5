//! Sample data for local development.

use rand::{seq::SliceRandom, Rng};

use super::models::{Book, NewBook};
use super::store::{BookStore, StoreError};

const WORDS: &[&str] = &[
    "silent", "river", "empire", "glass", "machine", "winter", "garden", "island", "shadow",
    "crown", "voyage", "signal", "harbor", "lantern", "orchard", "storm", "archive", "mirror",
];

const FIRST_NAMES: &[&str] = &[
    "Asha", "Bruno", "Chiara", "Dev", "Elena", "Farid", "Greta", "Hiro", "Ines", "Jonas",
];

const LAST_NAMES: &[&str] = &[
    "Okafor", "Lindqvist", "Moreau", "Tanaka", "Iyer", "Novak", "Castillo", "Brennan",
];

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or("untitled")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generate one plausible book.
pub fn fake_book<R: Rng + ?Sized>(rng: &mut R) -> NewBook {
    let title_len = rng.gen_range(2..=5);
    let title = (0..title_len)
        .map(|_| capitalize(pick(rng, WORDS)))
        .collect::<Vec<_>>()
        .join(" ");

    let sentence_len = rng.gen_range(6..=12);
    let description = format!(
        "{}.",
        capitalize(
            &(0..sentence_len)
                .map(|_| pick(rng, WORDS))
                .collect::<Vec<_>>()
                .join(" ")
        )
    );

    NewBook {
        title,
        description,
        author: format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
    }
}

/// Insert `count` generated books through the store.
pub async fn seed(store: &dyn BookStore, count: usize) -> Result<Vec<Book>, StoreError> {
    let books: Vec<NewBook> = {
        let mut rng = rand::thread_rng();
        (0..count).map(|_| fake_book(&mut rng)).collect()
    };

    let mut created = Vec::with_capacity(books.len());
    for book in books {
        created.push(store.create(book).await?);
    }

    tracing::info!(count = created.len(), "books seeded");
    Ok(created)
}
