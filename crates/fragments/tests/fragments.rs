//! End-to-end behaviour of the Fragments service over both storage backends.

use std::sync::Arc;

use bytes::Bytes;
use fragments::core::{ConversionError, ValidationError};
use fragments::store::{MemoryStore, SqliteStore, StorageGateway};
use fragments::{
    BareType, FragmentId, FragmentList, Fragments, FragmentsConfig, FragmentsError, OwnerId,
};
use fragments_testkit::{sample, TestFixture};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn owner() -> OwnerId {
    OwnerId::from("a1b2c3d4")
}

/// Run each scenario once per backend.
macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $name() {
                    super::init_tracing();
                    let service = super::Fragments::new(
                        super::MemoryStore::new(),
                        super::FragmentsConfig::default(),
                    );
                    super::$name(&service).await;
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $name() {
                    super::init_tracing();
                    let service = super::Fragments::new(
                        super::SqliteStore::open_memory().unwrap(),
                        super::FragmentsConfig::default(),
                    );
                    super::$name(&service).await;
                }
            )*
        }
    };
}

backend_tests!(
    html_content_is_validated,
    latin1_html_and_csv_are_accepted,
    empty_content_is_rejected,
    failed_write_leaves_fragment_untouched,
    create_and_read_back,
    by_user_lists_ids_or_metadata,
    owners_are_isolated,
    delete_then_by_id_is_not_found,
    delete_missing_is_not_found,
    update_replaces_content,
    update_rejects_type_change,
    update_missing_is_not_found,
    construction_errors,
    export_same_type_keeps_declared_type,
    export_converts_markup,
    export_converts_structured_data,
    export_converts_images,
    export_refuses_unlisted_targets,
    export_by_extension,
);

async fn html_content_is_validated<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service.new_fragment(&owner(), "text/html").unwrap();
    let fragment = service.save(&fragment).await.unwrap();

    let err = service.set_data(&fragment, "Hello World").await.unwrap_err();
    assert!(matches!(
        err,
        FragmentsError::Validation(ValidationError::Malformed {
            content_type: BareType::TextHtml,
            ..
        })
    ));

    let written = service
        .set_data(&fragment, "<p>Hello World</p>")
        .await
        .unwrap();
    assert_eq!(written.size(), 18);

    let err = service
        .set_data(&fragment, "<div>test</span>")
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentsError::Validation(_)));

    let nested = r#"<div><img src="x"/><br/></div>"#;
    assert!(service.set_data(&fragment, nested).await.is_ok());
}

async fn latin1_html_and_csv_are_accepted<S: StorageGateway>(service: &Fragments<S>) {
    let page = service
        .create(
            &owner(),
            "text/html; charset=iso-8859-1",
            Bytes::from_static(b"<p>caf\xe9</p>"),
        )
        .await
        .unwrap();
    assert_eq!(page.size(), 11);

    let plain = service.export_as(&page, BareType::TextPlain).await.unwrap();
    assert_eq!(plain.content_type.as_str(), "text/plain");
    assert_eq!(&plain.data[..], "caf\u{fffd}".as_bytes());

    let table = service
        .create(
            &owner(),
            "text/csv; charset=iso-8859-1",
            Bytes::from_static(b"nom,ville\nJos\xe9,Qu\xe9bec"),
        )
        .await
        .unwrap();
    let json = service
        .export_as(&table, BareType::ApplicationJson)
        .await
        .unwrap();
    let rows: serde_json::Value = serde_json::from_slice(&json.data).unwrap();
    assert_eq!(rows[0]["ville"], "Qu\u{fffd}bec");
}

async fn empty_content_is_rejected<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service.new_fragment(&owner(), "text/plain").unwrap();
    let err = service.set_data(&fragment, Bytes::new()).await.unwrap_err();
    assert!(matches!(
        err,
        FragmentsError::Validation(ValidationError::Empty {
            content_type: BareType::TextPlain
        })
    ));
}

async fn failed_write_leaves_fragment_untouched<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service
        .create(&owner(), "application/json", r#"{"ok":true}"#)
        .await
        .unwrap();

    assert!(service.set_data(&fragment, "{broken").await.is_err());

    let stored = service.by_id(&owner(), fragment.id()).await.unwrap();
    assert_eq!(stored, fragment);
    assert_eq!(
        service.get_data(&stored).await.unwrap(),
        Bytes::from_static(br#"{"ok":true}"#)
    );
}

async fn create_and_read_back<S: StorageGateway>(service: &Fragments<S>) {
    for t in BareType::ALL {
        let data = sample(t);
        let fragment = service.create(&owner(), t.as_str(), data.clone()).await.unwrap();

        assert_eq!(fragment.size(), data.len() as u64);
        assert_eq!(fragment.mime_type(), t.as_str());
        assert_eq!(fragment.is_image(), t.is_image());

        let loaded = service.by_id(&owner(), fragment.id()).await.unwrap();
        assert_eq!(loaded, fragment);
        assert_eq!(service.get_data(&loaded).await.unwrap(), data);
    }
}

async fn by_user_lists_ids_or_metadata<S: StorageGateway>(service: &Fragments<S>) {
    let empty = service.by_user(&owner(), false).await.unwrap();
    assert_eq!(empty, FragmentList::Ids(Vec::new()));

    let a = service.create(&owner(), "text/plain", "one").await.unwrap();
    let b = service.create(&owner(), "text/markdown", "# two").await.unwrap();

    let FragmentList::Ids(mut ids) = service.by_user(&owner(), false).await.unwrap() else {
        panic!("expected ids");
    };
    ids.sort();
    let mut expected = vec![a.id().clone(), b.id().clone()];
    expected.sort();
    assert_eq!(ids, expected);

    let FragmentList::Expanded(fragments) = service.by_user(&owner(), true).await.unwrap() else {
        panic!("expected metadata");
    };
    assert_eq!(fragments.len(), 2);
    assert!(fragments.contains(&a));
    assert!(fragments.contains(&b));

    let json = serde_json::to_value(FragmentList::Expanded(vec![a.clone()])).unwrap();
    assert_eq!(json[0]["ownerId"], owner().as_str());
    assert_eq!(json[0]["type"], "text/plain");
    assert_eq!(json[0]["size"], 3);
}

async fn owners_are_isolated<S: StorageGateway>(service: &Fragments<S>) {
    let alice = OwnerId::from("alice");
    let bob = OwnerId::from("bob");
    let fragment = service.create(&alice, "text/plain", "private").await.unwrap();

    assert!(matches!(
        service.by_id(&bob, fragment.id()).await,
        Err(FragmentsError::NotFound { .. })
    ));
    assert!(service.by_user(&bob, false).await.unwrap().is_empty());
    assert!(matches!(
        service.delete(&bob, fragment.id()).await,
        Err(FragmentsError::NotFound { .. })
    ));
    assert!(service.by_id(&alice, fragment.id()).await.is_ok());
}

async fn delete_then_by_id_is_not_found<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service.create(&owner(), "text/plain", "bye").await.unwrap();
    service.delete(&owner(), fragment.id()).await.unwrap();

    let err = service.by_id(&owner(), fragment.id()).await.unwrap_err();
    match err {
        FragmentsError::NotFound { owner_id, id } => {
            assert_eq!(owner_id, owner());
            assert_eq!(&id, fragment.id());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        service.get_data(&fragment).await,
        Err(FragmentsError::NotFound { .. })
    ));
    assert!(service.by_user(&owner(), false).await.unwrap().is_empty());
}

async fn delete_missing_is_not_found<S: StorageGateway>(service: &Fragments<S>) {
    let err = service
        .delete(&owner(), &FragmentId::from("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentsError::NotFound { .. }));
}

async fn update_replaces_content<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service
        .create(&owner(), "text/markdown; charset=utf-8", "# v1")
        .await
        .unwrap();

    let updated = service
        .update(&owner(), fragment.id(), "text/markdown", "# version two")
        .await
        .unwrap();
    assert_eq!(updated.size(), 13);
    assert_eq!(updated.created(), fragment.created());
    assert!(updated.updated() >= fragment.updated());
    assert_eq!(updated.content_type(), fragment.content_type());

    let stored = service.by_id(&owner(), fragment.id()).await.unwrap();
    assert_eq!(
        service.get_data(&stored).await.unwrap(),
        Bytes::from_static(b"# version two")
    );
}

async fn update_rejects_type_change<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service.create(&owner(), "text/plain", "plain").await.unwrap();

    let err = service
        .update(&owner(), fragment.id(), "application/json", "{}")
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentsError::TypeMismatch { .. }));

    let err = service
        .update(&owner(), fragment.id(), "application/msword", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentsError::UnsupportedType(_)));

    let stored = service.by_id(&owner(), fragment.id()).await.unwrap();
    assert_eq!(service.get_data(&stored).await.unwrap(), Bytes::from_static(b"plain"));
}

async fn update_missing_is_not_found<S: StorageGateway>(service: &Fragments<S>) {
    let err = service
        .update(&owner(), &FragmentId::from("missing"), "text/plain", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, FragmentsError::NotFound { .. }));
}

async fn construction_errors<S: StorageGateway>(service: &Fragments<S>) {
    assert!(matches!(
        service.new_fragment(&owner(), "application/msword"),
        Err(FragmentsError::UnsupportedType(_))
    ));
    assert!(matches!(
        service.new_fragment(&OwnerId::from(""), "text/plain"),
        Err(FragmentsError::InvalidFragment(_))
    ));
    assert!(matches!(
        service.create(&owner(), "video/mp4", "x").await,
        Err(FragmentsError::UnsupportedType(_))
    ));
    assert!(service.by_user(&owner(), false).await.unwrap().is_empty());
}

async fn export_same_type_keeps_declared_type<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service
        .create(&owner(), "text/plain; charset=utf-8", "hello")
        .await
        .unwrap();

    let export = service.export_as(&fragment, BareType::TextPlain).await.unwrap();
    assert_eq!(export.content_type.as_str(), "text/plain; charset=utf-8");
    assert_eq!(export.content_type.charset().as_deref(), Some("utf-8"));
    assert_eq!(export.data, Bytes::from_static(b"hello"));
}

async fn export_converts_markup<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service
        .create(&owner(), "text/markdown", "# Title\n\nSome **bold** text")
        .await
        .unwrap();
    assert_eq!(
        service.formats(&fragment),
        &[BareType::TextMarkdown, BareType::TextPlain, BareType::TextHtml]
    );

    let html = service.export_as(&fragment, BareType::TextHtml).await.unwrap();
    assert_eq!(html.content_type.as_str(), "text/html");
    let html_text = String::from_utf8(html.data.to_vec()).unwrap();
    assert!(html_text.contains("<h1>Title</h1>"));
    assert!(html_text.contains("<strong>bold</strong>"));

    let plain = service.export_as(&fragment, BareType::TextPlain).await.unwrap();
    assert_eq!(plain.data, Bytes::from_static(b"Title\n\nSome bold text"));

    let page = service
        .create(&owner(), "text/html", "<p>Hello <em>there</em></p>")
        .await
        .unwrap();
    let text = service.export_as(&page, BareType::TextPlain).await.unwrap();
    assert_eq!(text.data, Bytes::from_static(b"Hello there"));
}

async fn export_converts_structured_data<S: StorageGateway>(service: &Fragments<S>) {
    let json = service
        .create(&owner(), "application/json", r#"{"name":"test","value":123}"#)
        .await
        .unwrap();
    assert_eq!(
        service.formats(&json),
        &[
            BareType::ApplicationJson,
            BareType::TextPlain,
            BareType::ApplicationYaml,
            BareType::ApplicationXYaml
        ]
    );

    let yaml = service.export_as(&json, BareType::ApplicationYaml).await.unwrap();
    let yaml_text = String::from_utf8(yaml.data.to_vec()).unwrap();
    assert!(yaml_text.contains("name: test"));
    assert!(yaml_text.contains("value: 123"));

    let csv = service
        .create(&owner(), "text/csv", "name,age\nJohn,30\nJane,25")
        .await
        .unwrap();
    let rows = service.export_as(&csv, BareType::ApplicationJson).await.unwrap();
    assert_eq!(rows.content_type.as_str(), "application/json");
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&rows.data).unwrap(),
        serde_json::json!([
            {"name": "John", "age": "30"},
            {"name": "Jane", "age": "25"}
        ])
    );
}

async fn export_converts_images<S: StorageGateway>(service: &Fragments<S>) {
    let png = service
        .create(&owner(), "image/png", sample(BareType::ImagePng))
        .await
        .unwrap();

    let jpeg = service.export_as(&png, BareType::ImageJpeg).await.unwrap();
    assert_eq!(jpeg.content_type.as_str(), "image/jpeg");
    assert_eq!(&jpeg.data[..2], &[0xff, 0xd8]);

    let broken = service
        .create(&owner(), "image/png", "not really a png")
        .await
        .unwrap();
    assert!(matches!(
        service.export_as(&broken, BareType::ImageGif).await,
        Err(FragmentsError::Conversion(ConversionError::Failed { .. }))
    ));
}

async fn export_refuses_unlisted_targets<S: StorageGateway>(service: &Fragments<S>) {
    let fragment = service.create(&owner(), "text/plain", "words").await.unwrap();
    assert_eq!(service.formats(&fragment), &[BareType::TextPlain]);

    let err = service
        .export_as(&fragment, BareType::ImagePng)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FragmentsError::Conversion(ConversionError::Unsupported {
            from: BareType::TextPlain,
            to: BareType::ImagePng
        })
    ));
}

async fn export_by_extension<S: StorageGateway>(service: &Fragments<S>) {
    let json = service
        .create(&owner(), "application/json", r#"{"a":1}"#)
        .await
        .unwrap();

    let yml = service.export_by_extension(&json, "yml").await.unwrap();
    assert_eq!(yml.content_type.as_str(), "application/yaml");

    let same = service.export_by_extension(&json, ".JSON").await.unwrap();
    assert_eq!(same.data, Bytes::from_static(br#"{"a":1}"#));

    assert!(matches!(
        service.export_by_extension(&json, "xyz").await,
        Err(FragmentsError::UnknownExtension(ext)) if ext == "xyz"
    ));
    assert!(matches!(
        service.export_by_extension(&json, "png").await,
        Err(FragmentsError::Conversion(ConversionError::Unsupported { .. }))
    ));
}

#[test]
fn supported_type_headers() {
    let service = Fragments::new(MemoryStore::new(), FragmentsConfig::default());
    for t in BareType::ALL {
        assert!(service.is_supported_type(t.as_str()), "{t}");
        assert!(
            service.is_supported_type(&format!("{t}; charset=utf-8")),
            "{t}"
        );
    }
    for header in ["application/msword", "video/mp4", "", "not a type", "text/"] {
        assert!(!service.is_supported_type(header), "{header:?}");
    }
}

#[test]
fn extension_tables() {
    let service = Fragments::new(MemoryStore::new(), FragmentsConfig::default());
    let registry = service.registry();
    assert_eq!(registry.supported().len(), 12);
    assert!(service.config().validate_on_write);
    assert!(service.engine().can_convert(BareType::TextCsv, BareType::ApplicationJson));

    assert_eq!(registry.extension_for("text/markdown"), Some("md"));
    assert_eq!(registry.extension_for("application/x-yaml"), Some("yaml"));
    assert_eq!(registry.extension_for("image/jpeg"), Some("jpg"));
    assert_eq!(registry.type_for_extension("jpeg"), Some(BareType::ImageJpeg));
    assert_eq!(registry.type_for_extension(".YML"), Some(BareType::ApplicationYaml));
    assert_eq!(registry.type_for_extension("docx"), None);
}

#[tokio::test]
async fn shared_store_through_fixture() {
    init_tracing();
    let fixture = TestFixture::new();
    let service = Fragments::new(Arc::clone(&fixture.store), FragmentsConfig::default());

    let fragment = service
        .create(&fixture.owner, "text/csv", sample(BareType::TextCsv))
        .await
        .unwrap();

    assert_eq!(fixture.store.len().unwrap(), 1);
    assert_eq!(
        fixture
            .store
            .get_metadata(&fixture.owner, fragment.id())
            .await
            .unwrap(),
        Some(fragment)
    );
}

#[tokio::test]
async fn sqlite_persists_across_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fragments.db");

    let fragment = {
        let service = Fragments::new(SqliteStore::open(&path).unwrap(), FragmentsConfig::default());
        service
            .create(&owner(), "application/yaml", "name: test\n")
            .await
            .unwrap()
    };

    let service = Fragments::new(SqliteStore::open(&path).unwrap(), FragmentsConfig::default());
    let loaded = service.by_id(&owner(), fragment.id()).await.unwrap();
    assert_eq!(loaded, fragment);

    let json = service
        .export_as(&loaded, BareType::ApplicationJson)
        .await
        .unwrap();
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&json.data).unwrap(),
        serde_json::json!({"name": "test"})
    );
}
