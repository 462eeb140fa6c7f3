use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::info;

use shared::domain::{ListName, UserId};

/// Durable per-user, per-list word set. The `words` table keyed by
/// (user_id, list_name, word) is the only persistent state; every method
/// touches one conceptual entry or one full list, so each call is atomic.
#[derive(Clone)]
pub struct WordStore {
    pool: Pool<Sqlite>,
}

impl WordStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All words for (user, list), ascending lexicographic. Empty input
    /// yields an empty sequence; this never fails on missing users or lists.
    pub async fn list_words(&self, user_id: UserId, list: ListName) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT word FROM words WHERE user_id = ? AND list_name = ? ORDER BY word",
        )
        .bind(user_id.0)
        .bind(list.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
    }

    /// Inserts the trimmed word. Returns false without mutation when the
    /// trimmed text is empty or the entry already exists; duplicates are
    /// rejected, never overwritten.
    pub async fn add_word(&self, user_id: UserId, list: ListName, word: &str) -> Result<bool> {
        let word = word.trim();
        if word.is_empty() {
            return Ok(false);
        }

        let inserted = sqlx::query(
            "INSERT INTO words (user_id, list_name, word) VALUES (?, ?, ?)
             ON CONFLICT(user_id, list_name, word) DO NOTHING",
        )
        .bind(user_id.0)
        .bind(list.as_str())
        .bind(word)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            info!(user_id = user_id.0, list = %list, word, "added word");
            Ok(true)
        } else {
            info!(user_id = user_id.0, list = %list, word, "word already exists");
            Ok(false)
        }
    }

    /// Deletes the trimmed word if present. Idempotent: repeated removal is
    /// safe and reports false after the first success.
    pub async fn remove_word(&self, user_id: UserId, list: ListName, word: &str) -> Result<bool> {
        let word = word.trim();
        let removed = sqlx::query(
            "DELETE FROM words WHERE user_id = ? AND list_name = ? AND word = ?",
        )
        .bind(user_id.0)
        .bind(list.as_str())
        .bind(word)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if removed > 0 {
            info!(user_id = user_id.0, list = %list, word, "removed word");
            Ok(true)
        } else {
            info!(user_id = user_id.0, list = %list, word, "word not found for removal");
            Ok(false)
        }
    }

    /// Deletes every entry for (user, list). No-op when already empty.
    pub async fn clear_list(&self, user_id: UserId, list: ListName) -> Result<()> {
        sqlx::query("DELETE FROM words WHERE user_id = ? AND list_name = ?")
            .bind(user_id.0)
            .bind(list.as_str())
            .execute(&self.pool)
            .await?;
        info!(user_id = user_id.0, list = %list, "cleared list");
        Ok(())
    }

    /// One uniformly random word from list A and one from list B, picked
    /// independently. None when either list is empty; equal text in both
    /// lists may coincidentally repeat, there is no exclusion rule.
    pub async fn pick_pair(&self, user_id: UserId) -> Result<Option<(String, String)>> {
        let a = self.list_words(user_id, ListName::A).await?;
        let b = self.list_words(user_id, ListName::B).await?;

        let mut rng = rand::thread_rng();
        match (a.choose(&mut rng), b.choose(&mut rng)) {
            (Some(from_a), Some(from_b)) => Ok(Some((from_a.clone(), from_b.clone()))),
            _ => Ok(None),
        }
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
