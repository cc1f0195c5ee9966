// ==========================================
// Import Engine Integration Tests
// ==========================================
// Exercises full runs end to end: preview vs commit, duplicate
// handling, reference resolution, table clearing, the asset
// ceiling and transactional rollback.
// ==========================================


use asset_backoffice::authorization::ActorAllowList;
use asset_backoffice::domain::types::{EntityKind, ImportMode, RowStatus, SheetStatus};
use asset_backoffice::importer::{
    AssetImporter, ImportError, ImportRequest, MAX_ASSET_ROWS,
};
use asset_backoffice::logging;
use asset_backoffice::repository::{ImportLogRepository, LookupRepository};
use rust_xlsxwriter::Workbook;
use std::sync::Arc;
use test_helpers::{
    build_workbook, count_rows, create_test_db, create_test_importer, execute, minimal_workbook,
    SheetFixture,
};

fn request(payload: Vec<u8>, mode: ImportMode) -> ImportRequest {
    ImportRequest {
        payload,
        file_name: "carga.xlsx".to_string(),
        mode,
        clear_tables: false,
        requested_by: "tester".to_string(),
    }
}

#[tokio::test]
async fn preview_validates_without_touching_storage() {
    logging::init_test();
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let report = importer
        .run(request(minimal_workbook(), ImportMode::Preview))
        .await
        .expect("preview run");

    assert!(report.preview);
    assert_eq!(report.totals.processed, 4);
    assert_eq!(report.totals.inserted, 0);
    assert_eq!(report.totals.failed, 0);

    let assets = report.sheet(EntityKind::Assets).expect("assets sheet");
    assert_eq!(assets.status, SheetStatus::Validated);
    assert_eq!(assets.processed, 2);
    assert!(assets.rows.iter().all(|r| r.status == RowStatus::Validated));
    assert!(assets.rows.iter().all(|r| r.record_id.is_none()));

    // absent optional sheets are reported, never fatal
    let departments = report.sheet(EntityKind::Departments).expect("departments");
    assert!(!departments.present);
    assert_eq!(departments.status, SheetStatus::Skipped);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.sheet == "departments" && w.message.contains("no está presente")));

    assert_eq!(count_rows(&db, "assets"), 0);
    assert_eq!(count_rows(&db, "asset_categories"), 0);
}

#[tokio::test]
async fn commit_inserts_in_dependency_order() {
    logging::init_test();
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let report = importer
        .run(request(minimal_workbook(), ImportMode::Commit))
        .await
        .expect("commit run");

    assert!(!report.preview);
    assert_eq!(report.totals.inserted, 4);
    assert_eq!(count_rows(&db, "asset_categories"), 1);
    assert_eq!(count_rows(&db, "asset_statuses"), 1);
    assert_eq!(count_rows(&db, "assets"), 2);

    let assets = report.sheet(EntityKind::Assets).expect("assets sheet");
    assert_eq!(assets.status, SheetStatus::Committed);
    assert!(assets
        .rows
        .iter()
        .all(|r| r.status == RowStatus::Inserted && r.record_id.is_some()));

    // inserted assets resolved their category and status ids
    let conn = db.lock().expect("db lock");
    let category_id: i64 = conn
        .query_row(
            "SELECT asset_category_id FROM assets WHERE asset_tag = 'EQ-001'",
            [],
            |row| row.get(0),
        )
        .expect("asset row");
    assert!(category_id > 0);
}

#[tokio::test]
async fn category_default_method_resolves_through_commit() {
    logging::init_test();
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[
        SheetFixture {
            name: "depreciation_methods",
            headers: &["code", "name"],
            rows: &[&["DEP_X", "Lineal"]],
        },
        SheetFixture {
            name: "asset_categories",
            headers: &["code", "name", "default_depreciation_method_code"],
            rows: &[&["CAT_X", "Computación", "DEP_X"]],
        },
        SheetFixture {
            name: "asset_statuses",
            headers: &["code", "name"],
            rows: &[&["STS_X", "En uso"]],
        },
        SheetFixture {
            name: "assets",
            headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            rows: &[&["AST_X", "Notebook", "CAT_X", "STS_X"]],
        },
    ]);

    let preview = importer
        .run(request(payload.clone(), ImportMode::Preview))
        .await
        .expect("preview run");
    assert_eq!(preview.totals.processed, 4);
    assert_eq!(preview.totals.inserted, 0);
    assert_eq!(preview.totals.failed, 0);
    assert_eq!(preview.totals.skipped, 0);

    let report = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect("commit run");
    assert_eq!(report.totals.inserted, 4);
    assert_eq!(report.totals.failed, 0);

    // the category points at the method inserted in the same run
    let conn = db.lock().expect("db lock");
    let (method_id, category_method_id): (i64, Option<i64>) = conn
        .query_row(
            "SELECT m.id, c.default_depreciation_method_id
             FROM depreciation_methods m, asset_categories c
             WHERE m.code = 'DEP_X' AND c.code = 'CAT_X'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("joined row");
    assert_eq!(category_method_id, Some(method_id));
}

#[tokio::test]
async fn missing_assets_sheet_is_fatal() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[SheetFixture {
        name: "asset_categories",
        headers: &["code", "name"],
        rows: &[&["CAT1", "Maquinaria"]],
    }]);

    let err = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect_err("missing required sheet");
    assert!(matches!(
        err,
        ImportError::MissingRequiredSheet { sheet: "assets" }
    ));
    assert_eq!(count_rows(&db, "asset_categories"), 0);
}

#[tokio::test]
async fn missing_mandatory_columns_are_fatal() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[SheetFixture {
        name: "assets",
        headers: &["asset_tag", "name"],
        rows: &[&["EQ-001", "Torno"]],
    }]);

    let err = importer
        .run(request(payload, ImportMode::Preview))
        .await
        .expect_err("missing columns");
    match err {
        ImportError::MissingMandatoryColumns { sheet, columns } => {
            assert_eq!(sheet, "assets");
            assert!(columns.contains("asset_category_code"));
            assert!(columns.contains("asset_status_code"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn duplicate_keys_within_a_sheet_fail_the_later_row() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[
        SheetFixture {
            name: "document_types",
            headers: &["code", "name"],
            rows: &[&["FAC", "Factura"], &["fac", "Factura duplicada"]],
        },
        SheetFixture {
            name: "assets",
            headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            rows: &[],
        },
    ]);

    let report = importer
        .run(request(payload, ImportMode::Preview))
        .await
        .expect("preview run");

    let docs = report.sheet(EntityKind::DocumentTypes).expect("doc types");
    assert_eq!(docs.status, SheetStatus::Invalid);
    assert_eq!(docs.processed, 1);
    assert_eq!(docs.failed, 1);
    assert_eq!(docs.duplicates.len(), 1);
    assert_eq!(docs.duplicates[0].key, "FAC");
    assert!(docs.errors[0]
        .messages
        .iter()
        .any(|m| m == "Clave duplicada dentro de la hoja: FAC."));
}

#[tokio::test]
async fn persisted_keys_are_skipped_as_database_duplicates() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    importer
        .run(request(minimal_workbook(), ImportMode::Commit))
        .await
        .expect("first commit");

    let report = importer
        .run(request(minimal_workbook(), ImportMode::Commit))
        .await
        .expect("second commit");

    assert_eq!(report.totals.inserted, 0);
    assert_eq!(report.totals.skipped, 4);
    assert_eq!(report.totals.duplicates, 4);

    let assets = report.sheet(EntityKind::Assets).expect("assets sheet");
    assert_eq!(assets.status, SheetStatus::Skipped);
    assert!(assets.rows.iter().all(|r| r.status == RowStatus::Duplicate));

    assert_eq!(count_rows(&db, "assets"), 2);
}

#[tokio::test]
async fn references_resolve_against_rows_pending_in_the_same_run() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[
        SheetFixture {
            name: "departments",
            headers: &["code", "name", "parent_code"],
            rows: &[&["D1", "Operaciones", ""], &["D2", "Mantención", "D1"]],
        },
        SheetFixture {
            name: "cost_centers",
            headers: &["code", "name", "department_code"],
            rows: &[&["CC1", "Planta", "D2"]],
        },
        SheetFixture {
            name: "assets",
            headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            rows: &[],
        },
    ]);

    let report = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect("commit run");

    assert_eq!(report.totals.failed, 0);
    assert_eq!(count_rows(&db, "departments"), 2);
    assert_eq!(count_rows(&db, "cost_centers"), 1);

    let conn = db.lock().expect("db lock");
    let parent_id: Option<i64> = conn
        .query_row(
            "SELECT parent_id FROM departments WHERE code = 'D2'",
            [],
            |row| row.get(0),
        )
        .expect("department row");
    assert!(parent_id.is_some());
    let department_id: Option<i64> = conn
        .query_row(
            "SELECT department_id FROM cost_centers WHERE code = 'CC1'",
            [],
            |row| row.get(0),
        )
        .expect("cost center row");
    assert!(department_id.is_some());
}

#[tokio::test]
async fn unknown_hard_references_fail_the_row() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[SheetFixture {
        name: "assets",
        headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
        rows: &[&["EQ-001", "Torno", "NOCAT", "NOSTS"]],
    }]);

    let report = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect("commit run");

    let assets = report.sheet(EntityKind::Assets).expect("assets sheet");
    assert_eq!(assets.status, SheetStatus::Invalid);
    assert_eq!(assets.failed, 1);
    assert_eq!(
        assets.errors[0].messages,
        vec!["La categoría NOCAT no existe.", "El estado NOSTS no existe."]
    );
    assert_eq!(count_rows(&db, "assets"), 0);
}

#[tokio::test]
async fn soft_references_warn_and_persist_null() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[
        SheetFixture {
            name: "departments",
            headers: &["code", "name", "parent_code"],
            rows: &[&["D9", "Bodega", "NOPE"]],
        },
        SheetFixture {
            name: "assets",
            headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            rows: &[],
        },
    ]);

    let report = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect("commit run");

    let departments = report.sheet(EntityKind::Departments).expect("departments");
    assert_eq!(departments.status, SheetStatus::Committed);
    assert!(departments
        .warnings
        .iter()
        .any(|w| w.contains("El departamento padre NOPE no existe.")));

    let conn = db.lock().expect("db lock");
    let parent_id: Option<i64> = conn
        .query_row(
            "SELECT parent_id FROM departments WHERE code = 'D9'",
            [],
            |row| row.get(0),
        )
        .expect("department row");
    assert!(parent_id.is_none());
}

#[tokio::test]
async fn asset_ceiling_aborts_the_run() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let mut workbook = Workbook::new();
    let categories = workbook.add_worksheet();
    categories.set_name("asset_categories").expect("sheet name");
    categories.write_string(0, 0, "code").expect("write");
    categories.write_string(0, 1, "name").expect("write");
    categories.write_string(1, 0, "CAT1").expect("write");
    categories.write_string(1, 1, "Maquinaria").expect("write");

    let statuses = workbook.add_worksheet();
    statuses.set_name("asset_statuses").expect("sheet name");
    statuses.write_string(0, 0, "code").expect("write");
    statuses.write_string(0, 1, "name").expect("write");
    statuses.write_string(1, 0, "ACT").expect("write");
    statuses.write_string(1, 1, "Activo").expect("write");

    let assets = workbook.add_worksheet();
    assets.set_name("assets").expect("sheet name");
    for (col, header) in ["asset_tag", "name", "asset_category_code", "asset_status_code"]
        .iter()
        .enumerate()
    {
        assets.write_string(0, col as u16, *header).expect("write");
    }
    for i in 0..(MAX_ASSET_ROWS + 1) {
        let row = (i + 1) as u32;
        assets
            .write_string(row, 0, &format!("EQ-{i:04}"))
            .expect("write");
        assets.write_string(row, 1, "Equipo").expect("write");
        assets.write_string(row, 2, "CAT1").expect("write");
        assets.write_string(row, 3, "ACT").expect("write");
    }
    let payload = workbook.save_to_buffer().expect("serialize workbook");

    let err = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect_err("row ceiling");
    assert!(matches!(
        err,
        ImportError::AssetRowLimitExceeded { limit } if limit == MAX_ASSET_ROWS
    ));
    assert_eq!(count_rows(&db, "assets"), 0);
    assert_eq!(count_rows(&db, "asset_categories"), 0);
}

#[tokio::test]
async fn clear_tables_commit_replaces_previous_content() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    importer
        .run(request(minimal_workbook(), ImportMode::Commit))
        .await
        .expect("seed commit");
    assert_eq!(count_rows(&db, "assets"), 2);

    let payload = build_workbook(&[
        SheetFixture {
            name: "asset_categories",
            headers: &["code", "name"],
            rows: &[&["CAT1", "Maquinaria"]],
        },
        SheetFixture {
            name: "asset_statuses",
            headers: &["code", "name"],
            rows: &[&["ACT", "Activo"]],
        },
        SheetFixture {
            name: "assets",
            headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            rows: &[&["EQ-100", "Compresor", "CAT1", "ACT"]],
        },
    ]);
    let mut req = request(payload, ImportMode::Commit);
    req.clear_tables = true;

    let report = importer.run(req).await.expect("clear commit");

    // only sheets present in the workbook are cleared, in dependency order
    assert_eq!(
        report.cleared_tables,
        vec!["asset_categories", "asset_statuses", "assets"]
    );
    assert_eq!(report.totals.duplicates, 0);
    assert_eq!(report.totals.inserted, 3);
    assert_eq!(count_rows(&db, "assets"), 1);

    let assets = report.sheet(EntityKind::Assets).expect("assets sheet");
    assert!(assets.cleared);
    assert_eq!(assets.status, SheetStatus::Committed);
}

#[tokio::test]
async fn preview_with_clear_ignores_persisted_duplicates() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    importer
        .run(request(minimal_workbook(), ImportMode::Commit))
        .await
        .expect("seed commit");

    let mut req = request(minimal_workbook(), ImportMode::Preview);
    req.clear_tables = true;
    let report = importer.run(req).await.expect("clear preview");

    assert_eq!(report.totals.duplicates, 0);
    assert_eq!(report.totals.processed, 4);
    let assets = report.sheet(EntityKind::Assets).expect("assets sheet");
    assert!(assets.cleared);
    assert!(assets.rows.iter().all(|r| r.status == RowStatus::Validated));

    // the report lists what the matching commit would clear
    assert_eq!(
        report.cleared_tables,
        vec!["asset_categories", "asset_statuses", "assets"]
    );

    // preview never clears storage
    assert_eq!(count_rows(&db, "assets"), 2);
}

#[tokio::test]
async fn storage_failure_mid_commit_rolls_everything_back() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    execute(
        &db,
        "CREATE TRIGGER reject_boom BEFORE INSERT ON providers
         WHEN NEW.name = 'BOOM'
         BEGIN SELECT RAISE(ABORT, 'provider rejected'); END;",
    );

    let payload = build_workbook(&[
        SheetFixture {
            name: "providers",
            headers: &["name"],
            rows: &[&["Proveedor Uno"], &["BOOM"]],
        },
        SheetFixture {
            name: "assets",
            headers: &["asset_tag", "name", "asset_category_code", "asset_status_code"],
            rows: &[],
        },
    ]);

    let err = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect_err("mid-commit failure");
    match err {
        ImportError::Persistence { sheet, row, .. } => {
            assert_eq!(sheet, "providers");
            assert_eq!(row, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    // the first provider insert was rolled back with the rest
    assert_eq!(count_rows(&db, "providers"), 0);
    assert_eq!(count_rows(&db, "imports_log"), 0);
}

#[tokio::test]
async fn unauthorized_actors_are_rejected() {
    let (_tmp, db) = create_test_db();
    let importer = AssetImporter::new(
        Arc::clone(&db),
        Arc::new(LookupRepository::new(Arc::clone(&db))),
        ImportLogRepository::new(Arc::clone(&db)),
        ActorAllowList::new(vec!["ana".to_string()]),
    );

    let err = importer
        .run(request(minimal_workbook(), ImportMode::Commit))
        .await
        .expect_err("forbidden actor");
    assert!(matches!(err, ImportError::Forbidden { actor } if actor == "tester"));
    assert_eq!(count_rows(&db, "assets"), 0);
}

#[tokio::test]
async fn oversized_payloads_are_rejected_before_parsing() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = vec![0u8; asset_backoffice::importer::MAX_IMPORT_FILE_SIZE_BYTES + 1];
    let err = importer
        .run(request(payload, ImportMode::Preview))
        .await
        .expect_err("oversized payload");
    assert!(matches!(err, ImportError::FileTooLarge { .. }));

    let err = importer
        .run(request(Vec::new(), ImportMode::Preview))
        .await
        .expect_err("empty payload");
    assert!(matches!(err, ImportError::InvalidPayload));
    assert_eq!(count_rows(&db, "imports_log"), 0);
}

#[tokio::test]
async fn asset_soft_links_resolve_when_targets_exist() {
    let (_tmp, db) = create_test_db();
    let importer = create_test_importer(&db);

    let payload = build_workbook(&[
        SheetFixture {
            name: "asset_categories",
            headers: &["code", "name"],
            rows: &[&["CAT1", "Maquinaria"]],
        },
        SheetFixture {
            name: "asset_statuses",
            headers: &["code", "name"],
            rows: &[&["ACT", "Activo"]],
        },
        SheetFixture {
            name: "providers",
            headers: &["name"],
            rows: &[&["Proveedor Uno"]],
        },
        SheetFixture {
            name: "assets",
            headers: &[
                "asset_tag",
                "name",
                "asset_category_code",
                "asset_status_code",
                "provider_name",
                "additional_attributes",
            ],
            rows: &[&[
                "EQ-001",
                "Torno",
                "CAT1",
                "ACT",
                "proveedor uno",
                r#"{"serie":"A-1"}"#,
            ]],
        },
    ]);

    let report = importer
        .run(request(payload, ImportMode::Commit))
        .await
        .expect("commit run");
    assert_eq!(report.totals.failed, 0);

    let conn = db.lock().expect("db lock");
    let (provider_id, attributes): (Option<i64>, Option<String>) = conn
        .query_row(
            "SELECT provider_id, additional_attributes FROM assets WHERE asset_tag = 'EQ-001'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("asset row");
    assert!(provider_id.is_some());
    let attributes: serde_json::Value =
        serde_json::from_str(&attributes.expect("attributes json")).expect("parse json");
    assert_eq!(attributes["serie"], "A-1");
}
