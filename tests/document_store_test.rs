use chrono::Utc;
use tendersift::domain::{DocumentMetadata, StoredDocument};
use tendersift::infrastructure::store::{InMemoryDocumentStore, content_hash};

fn make_doc(id: &str, text: &str) -> StoredDocument {
    StoredDocument::new(
        id.to_string(),
        format!("{id}.pdf"),
        vec![text.to_string()],
        DocumentMetadata::default(),
    )
}

#[tokio::test]
async fn given_inserted_document_when_getting_by_id_then_returned_intact() {
    let store = InMemoryDocumentStore::new();
    store
        .insert(make_doc("doc-1", "resurfacing of rural roads"))
        .await;

    let fetched = store.get("doc-1").await;

    let document = fetched.unwrap();
    assert_eq!(document.filename, "doc-1.pdf");
    assert_eq!(document.pages, vec!["resurfacing of rural roads"]);
}

#[tokio::test]
async fn given_unknown_id_when_getting_then_none() {
    let store = InMemoryDocumentStore::new();

    assert!(store.get("missing").await.is_none());
}

#[tokio::test]
async fn given_documents_when_listing_then_newest_first() {
    let store = InMemoryDocumentStore::new();
    let older = StoredDocument {
        uploaded_at: Utc::now() - chrono::Duration::minutes(10),
        ..make_doc("older", "first upload")
    };
    store.insert(older).await;
    store.insert(make_doc("newer", "second upload")).await;

    let listing = store.list().await;

    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].id, "newer");
    assert_eq!(listing[1].id, "older");
}

#[tokio::test]
async fn given_inserted_document_when_removing_then_gone() {
    let store = InMemoryDocumentStore::new();
    store.insert(make_doc("doc-1", "some text")).await;

    assert!(store.remove("doc-1").await);
    assert!(store.get("doc-1").await.is_none());
    assert!(!store.remove("doc-1").await);
}

#[tokio::test]
async fn given_same_id_when_inserting_again_then_record_replaced() {
    let store = InMemoryDocumentStore::new();
    store.insert(make_doc("doc-1", "original text")).await;
    store.insert(make_doc("doc-1", "replacement text")).await;

    let listing = store.list().await;
    let fetched = store.get("doc-1").await.unwrap();

    assert_eq!(listing.len(), 1);
    assert_eq!(fetched.pages, vec!["replacement text"]);
}

#[tokio::test]
async fn given_query_overlapping_one_document_when_searching_then_it_ranks_first() {
    let store = InMemoryDocumentStore::new();
    store
        .insert(make_doc(
            "bridge-doc",
            "bridge construction tender for the river crossing",
        ))
        .await;
    store
        .insert(make_doc(
            "software-doc",
            "software licensing agreement for office suites",
        ))
        .await;

    let hits = store.search("bridge construction tender", 5).await;

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].document_id, "bridge-doc");
    assert!(hits[0].score > hits[1].score);
}

#[tokio::test]
async fn given_zero_top_k_when_searching_then_default_limit_applies() {
    let store = InMemoryDocumentStore::new();
    for n in 1..=7 {
        store
            .insert(make_doc(&format!("doc-{n}"), &format!("tender item {n}")))
            .await;
    }

    let hits = store.search("tender", 0).await;

    assert_eq!(hits.len(), 5);
}

#[tokio::test]
async fn given_explicit_top_k_when_searching_then_respected() {
    let store = InMemoryDocumentStore::new();
    for n in 1..=4 {
        store
            .insert(make_doc(&format!("doc-{n}"), &format!("tender item {n}")))
            .await;
    }

    let hits = store.search("tender", 2).await;

    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn given_empty_store_when_searching_then_no_hits() {
    let store = InMemoryDocumentStore::new();

    assert!(store.search("anything", 5).await.is_empty());
}

#[test]
fn given_same_bytes_when_hashing_then_same_id() {
    assert_eq!(content_hash(b"tender body"), content_hash(b"tender body"));
}

#[test]
fn given_different_bytes_when_hashing_then_different_ids() {
    assert_ne!(content_hash(b"tender body"), content_hash(b"other body"));
}

#[test]
fn given_any_bytes_when_hashing_then_id_is_hex_sha256() {
    let id = content_hash(b"tender body");

    assert_eq!(id.len(), 64);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}
