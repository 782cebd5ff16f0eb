//! Draft queries.

use interbox_core::db::unix_timestamp;

use super::db::{DatabaseError, DraftStore};
use super::models::{Draft, NewDraft};

impl DraftStore {
    /// Store a draft. Returns `false` when the same person was already
    /// imported for that type.
    pub async fn insert_draft(&self, draft: &NewDraft) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO drafts (id, source_key, tipo, nome, email, telefone, cpf, payload, fingerprint, imported_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&draft.source_key)
        .bind(draft.kind.as_str())
        .bind(&draft.nome)
        .bind(&draft.email)
        .bind(&draft.telefone)
        .bind(&draft.cpf)
        .bind(draft.payload.to_string())
        .bind(draft.fingerprint())
        .bind(unix_timestamp())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get_draft(&self, id: &str) -> Result<Draft, DatabaseError> {
        sqlx::query_as::<_, Draft>("SELECT * FROM drafts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Draft {id}")))
    }

    /// All drafts, oldest import first.
    pub async fn list_drafts(&self) -> Result<Vec<Draft>, DatabaseError> {
        Ok(
            sqlx::query_as::<_, Draft>("SELECT * FROM drafts ORDER BY imported_at, rowid")
                .fetch_all(self.pool())
                .await?,
        )
    }

    pub async fn unsynced_drafts(&self) -> Result<Vec<Draft>, DatabaseError> {
        Ok(sqlx::query_as::<_, Draft>(
            "SELECT * FROM drafts WHERE synced_at IS NULL ORDER BY imported_at, rowid",
        )
        .fetch_all(self.pool())
        .await?)
    }

    /// Record the id the API assigned. Fails if the draft does not exist.
    pub async fn mark_synced(&self, id: &str, remote_id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE drafts SET remote_id = ?, synced_at = ? WHERE id = ?")
            .bind(remote_id)
            .bind(unix_timestamp())
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Draft {id}")));
        }
        Ok(())
    }
}
