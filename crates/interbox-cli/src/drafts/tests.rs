use interbox_core::models::RegistrationType;
use serde_json::json;

use super::*;

const EXPORT: &str = r#"{
    "interbox_judge_drafts": "[{\"nome\":\"Ana Souza\",\"email\":\"ana@x.com\",\"telefone\":\"(11) 98765-4321\",\"cpf\":\"529.982.247-25\",\"experiencia\":\"5 anos\"}]",
    "interbox_drafts": [
        {"name": "Bruno", "email": "BRUNO@x.com", "phone": "11912345678", "type": "staff"},
        {"nome": "Sem tipo", "email": "c@x.com"}
    ],
    "theme": "dark",
    "interbox_audiovisual_draft": "{\"nome\":\"Caio\",\"email\":\"caio@x.com\",\"whatsapp\":\"11900001111\",\"disponibilidade\":\"sábado\"}"
}"#;

async fn store() -> DraftStore {
    DraftStore::open_in_memory().await.unwrap()
}

fn new_draft(kind: RegistrationType, email: &str, cpf: &str) -> NewDraft {
    NewDraft {
        source_key: "interbox_drafts".into(),
        kind,
        nome: "Fulano".into(),
        email: email.into(),
        telefone: "11987654321".into(),
        cpf: cpf.into(),
        payload: json!({ "email": email }),
    }
}

#[test]
fn parse_decodes_string_encoded_values() {
    let parsed = parse_export(EXPORT).unwrap();
    assert_eq!(parsed.drafts.len(), 3);

    let ana = parsed.drafts.iter().find(|d| d.nome == "Ana Souza").unwrap();
    assert_eq!(ana.kind, RegistrationType::Judge);
    assert_eq!(ana.cpf, "529.982.247-25");
    assert_eq!(ana.payload["experiencia"], "5 anos");

    let caio = parsed.drafts.iter().find(|d| d.nome == "Caio").unwrap();
    assert_eq!(caio.kind, RegistrationType::Audiovisual);
    assert_eq!(caio.telefone, "11900001111");
}

#[test]
fn parse_uses_type_field_when_key_is_generic() {
    let parsed = parse_export(EXPORT).unwrap();
    let bruno = parsed.drafts.iter().find(|d| d.nome == "Bruno").unwrap();
    assert_eq!(bruno.kind, RegistrationType::Staff);
    assert_eq!(bruno.telefone, "11912345678");
}

#[test]
fn parse_reports_items_without_type() {
    let parsed = parse_export(EXPORT).unwrap();
    assert_eq!(parsed.skipped.len(), 1);
    assert!(parsed.skipped[0].starts_with("interbox_drafts[1]"));
}

#[test]
fn parse_rejects_non_object_export() {
    assert!(matches!(
        parse_export("[1, 2]"),
        Err(ImportError::NotAnObject)
    ));
    assert!(matches!(parse_export("not json"), Err(ImportError::Json(_))));
}

#[test]
fn fingerprint_prefers_cpf_digits() {
    let a = new_draft(RegistrationType::Judge, "a@x.com", "529.982.247-25");
    let b = new_draft(RegistrationType::Judge, "b@x.com", "52998224725");
    assert_eq!(a.fingerprint(), b.fingerprint());

    let staff = new_draft(RegistrationType::Staff, "a@x.com", "52998224725");
    assert_ne!(a.fingerprint(), staff.fingerprint());

    let no_cpf = new_draft(RegistrationType::Judge, " A@X.com ", "");
    assert_eq!(no_cpf.fingerprint(), "judge:email:a@x.com");
}

#[tokio::test]
async fn insert_skips_duplicates() {
    let db = store().await;
    let draft = new_draft(RegistrationType::Judge, "a@x.com", "52998224725");
    assert!(db.insert_draft(&draft).await.unwrap());

    let again = new_draft(RegistrationType::Judge, "other@x.com", "529.982.247-25");
    assert!(!db.insert_draft(&again).await.unwrap());

    assert_eq!(db.list_drafts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn mark_synced_removes_from_unsynced() {
    let db = store().await;
    db.insert_draft(&new_draft(RegistrationType::Judge, "a@x.com", ""))
        .await
        .unwrap();
    db.insert_draft(&new_draft(RegistrationType::Staff, "b@x.com", ""))
        .await
        .unwrap();

    let pending = db.unsynced_drafts().await.unwrap();
    assert_eq!(pending.len(), 2);

    db.mark_synced(&pending[0].id, "remote-1").await.unwrap();

    let synced = db.get_draft(&pending[0].id).await.unwrap();
    assert!(synced.is_synced());
    assert_eq!(synced.remote_id.as_deref(), Some("remote-1"));

    let pending = db.unsynced_drafts().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email, "b@x.com");
}

#[tokio::test]
async fn mark_synced_unknown_draft_is_not_found() {
    let db = store().await;
    let err = db.mark_synced("missing", "remote-1").await.unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound(_)));
    assert!(matches!(
        db.get_draft("missing").await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn stored_draft_rebuilds_form() {
    let db = store().await;
    let parsed = parse_export(EXPORT).unwrap();
    for draft in &parsed.drafts {
        db.insert_draft(draft).await.unwrap();
    }

    let drafts = db.list_drafts().await.unwrap();
    let ana = drafts.iter().find(|d| d.nome == "Ana Souza").unwrap();
    assert_eq!(ana.kind().unwrap(), RegistrationType::Judge);

    let form = ana.to_form();
    assert_eq!(form.tipo, "judge");
    assert_eq!(form.email, "ana@x.com");
    assert_eq!(form.experiencia.as_deref(), Some("5 anos"));
    assert_eq!(form.motivacao, None);
}

#[tokio::test]
async fn file_store_persists_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("drafts.db");

    let db = DraftStore::open(&path).await.unwrap();
    db.insert_draft(&new_draft(RegistrationType::Judge, "a@x.com", ""))
        .await
        .unwrap();
    drop(db);

    let reopened = DraftStore::open(&path).await.unwrap();
    assert_eq!(reopened.list_drafts().await.unwrap().len(), 1);
}
