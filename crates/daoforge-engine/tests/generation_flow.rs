//! End-to-end run over a schema exercising every object kind, from
//! parsed definition to manifests on disk.

use std::fs;

use serde_json::json;

use daoforge_core::{Schema, parse_schema, validate_schema};
use daoforge_engine::{
    DaoManifest, EntityManifest, GenerationEngine, GenerationError, NameIndex, build_strategy,
};
use daoforge_options::{
    CapabilitySet, DatabaseKind, Filter, FilterRule, GenOptions, NamePattern, ObjectKind,
    RuleAction, StrategyKind,
};

fn sample_schema() -> Schema {
    let node = serde_json::from_value(json!({
        "element": "schema",
        "attributes": { "name": "shop" },
        "children": [
            {
                "element": "enum",
                "attributes": { "name": "OrderState" },
                "children": [
                    { "element": "value", "attributes": { "title": "Open" } },
                    { "element": "value", "attributes": { "title": "Closed" } }
                ]
            },
            {
                "element": "table",
                "attributes": { "name": "Customer" },
                "children": [
                    {
                        "element": "column",
                        "attributes": {
                            "name": "Id",
                            "type": "integer",
                            "requirement": "primarykey",
                            "identity": "true"
                        }
                    },
                    {
                        "element": "column",
                        "attributes": {
                            "name": "Name",
                            "type": "char",
                            "size": "60",
                            "requirement": "mandatory"
                        }
                    },
                    {
                        "element": "column",
                        "attributes": {
                            "name": "State",
                            "type": "integer",
                            "requirement": "mandatory",
                            "enumname": "OrderState"
                        }
                    },
                    {
                        "element": "column",
                        "attributes": {
                            "name": "Balance",
                            "type": "number",
                            "precision": "12",
                            "scale": "2"
                        }
                    }
                ]
            },
            {
                "element": "view",
                "attributes": { "name": "ActiveCustomer", "entity": "Customer" },
                "children": [
                    {
                        "element": "column",
                        "attributes": { "name": "Id", "type": "integer" }
                    },
                    {
                        "element": "column",
                        "attributes": { "name": "Name", "type": "char", "size": "60" }
                    }
                ]
            },
            {
                "element": "storedprocedure",
                "attributes": { "name": "FetchCustomers", "type": "function" },
                "children": [
                    {
                        "element": "parameter",
                        "attributes": {
                            "name": "Customers",
                            "direction": "return",
                            "type": "oracle-refcursor",
                            "refcursor-type": "Customer"
                        }
                    },
                    {
                        "element": "parameter",
                        "attributes": { "name": "MinBalance", "type": "number", "precision": "12", "scale": "2" }
                    }
                ]
            },
            {
                "element": "customview",
                "attributes": { "name": "CustomerTotals", "customentity": "CustomerTotal" },
                "children": [
                    {
                        "element": "column",
                        "attributes": { "name": "CustomerId", "type": "integer", "requirement": "mandatory" }
                    },
                    {
                        "element": "column",
                        "attributes": { "name": "Total", "type": "number", "precision": "18" }
                    },
                    {
                        "element": "parameter",
                        "attributes": { "name": "Since", "type": "datetime" }
                    },
                    {
                        "element": "sql",
                        "text": "select customer_id, sum(total) as total\n  from customer_order\n where placed_at >= :since\n group by customer_id"
                    }
                ]
            },
            {
                "element": "command",
                "attributes": { "name": "CancelStale" },
                "children": [
                    {
                        "element": "parameter",
                        "attributes": { "name": "CutOff", "type": "datetime" }
                    },
                    {
                        "element": "sql",
                        "text": "update customer_order set state = 99 where placed_at < :cut_off"
                    }
                ]
            }
        ]
    }))
    .unwrap();
    let schema = parse_schema(&node).unwrap();
    validate_schema(&schema).unwrap();
    schema
}

fn include_all(kind: ObjectKind, capabilities: &str) -> Filter {
    Filter {
        kind,
        rules: vec![FilterRule {
            action: RuleAction::Include,
            pattern: NamePattern::new("*").unwrap(),
            capabilities: capabilities.parse().unwrap(),
        }],
    }
}

fn manifest_options(dir: &std::path::Path) -> GenOptions {
    GenOptions {
        output_base_path: dir.to_path_buf(),
        output_package: "shop.data".to_string(),
        database: DatabaseKind::Oracle,
        code_strategy: StrategyKind::Manifest,
        worker_limit: 2,
        filters: vec![
            include_all(ObjectKind::Table, "CRUD"),
            include_all(ObjectKind::View, "R"),
            include_all(ObjectKind::StoredProcedure, "CRUD"),
            include_all(ObjectKind::CustomView, "CRUD"),
            include_all(ObjectKind::Command, "CRUD"),
        ],
        ..GenOptions::default()
    }
}

fn read_dao(dir: &std::path::Path, name: &str) -> DaoManifest {
    let raw = fs::read(dir.join(format!("{name}.dao.json"))).unwrap();
    serde_json::from_slice(&raw).unwrap()
}

#[tokio::test]
async fn a_full_schema_generates_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let options = manifest_options(dir.path());
    let strategy = build_strategy(options.code_strategy, &options);
    let engine = GenerationEngine::new(options, strategy);

    let report = engine.run(sample_schema()).await.unwrap();

    assert_eq!(report.units.relations, 2);
    assert_eq!(report.units.entities, 1);
    assert_eq!(report.units.procedures, 1);
    assert_eq!(report.units.custom_views, 1);
    assert_eq!(report.units.commands, 1);
    assert!(report.unused_rules.is_empty());
    assert!(report.failure.is_none());
    assert!(report.types_resolved > 0);

    // The shared entity lands once, from the table unit.
    let raw = fs::read(dir.path().join("Customer.entity.json")).unwrap();
    let entity: EntityManifest = serde_json::from_slice(&raw).unwrap();
    assert_eq!(entity.entity, "Customer");
    assert_eq!(entity.kind, "table");
    assert_eq!(entity.fields.len(), 4);
    assert_eq!(entity.fields[2].type_info.enum_ref.as_deref(), Some("OrderState"));
    assert_eq!(entity.fields[3].sql, "NUMBER(12,2)");

    let view_dao = read_dao(dir.path(), "ActiveCustomer");
    assert_eq!(view_dao.target_kind, "view");
    assert_eq!(view_dao.entity.as_deref(), Some("Customer"));
    assert_eq!(view_dao.capabilities.as_deref(), Some("R"));

    // The synthesized entity gets its own manifest and DAO.
    let raw = fs::read(dir.path().join("CustomerTotal.entity.json")).unwrap();
    let synthesized: EntityManifest = serde_json::from_slice(&raw).unwrap();
    assert_eq!(synthesized.kind, "customview");
    assert_eq!(synthesized.fields[1].type_info.native, "Decimal");
    assert_eq!(
        synthesized.fields[1].type_info.convenience_integral.as_deref(),
        Some("i64")
    );

    let totals_dao = read_dao(dir.path(), "CustomerTotals");
    assert_eq!(totals_dao.entity.as_deref(), Some("CustomerTotal"));
    assert_eq!(totals_dao.parameters.len(), 1);
    assert!(totals_dao.sql.as_deref().unwrap().starts_with("select customer_id"));

    let purge_dao = read_dao(dir.path(), "CancelStale");
    assert_eq!(purge_dao.target_kind, "command");
    assert_eq!(
        purge_dao.sql.as_deref(),
        Some("update customer_order set state = 99 where placed_at < :cut_off")
    );

    let fetch_dao = read_dao(dir.path(), "FetchCustomers");
    assert_eq!(fetch_dao.parameters[0].type_info.native, "Vec<Customer>");

    let raw = fs::read(dir.path().join("name_index.json")).unwrap();
    let index: NameIndex = serde_json::from_slice(&raw).unwrap();
    assert_eq!(index.schema, "shop");
    assert_eq!(index.enums, vec!["OrderState".to_string()]);
    assert_eq!(index.tables, vec!["Customer".to_string()]);
    assert_eq!(index.views, vec!["ActiveCustomer".to_string()]);
    assert_eq!(index.stored_procedures, vec!["FetchCustomers".to_string()]);
}

#[tokio::test]
async fn one_table_and_an_include_all_rule_yield_one_entity_and_one_dao() {
    let dir = tempfile::tempdir().unwrap();
    let node = serde_json::from_value(json!({
        "element": "schema",
        "attributes": { "name": "shop" },
        "children": [{
            "element": "table",
            "attributes": { "name": "Customer" },
            "children": [
                {
                    "element": "column",
                    "attributes": {
                        "name": "Id",
                        "type": "integer",
                        "requirement": "primarykey"
                    }
                },
                {
                    "element": "column",
                    "attributes": { "name": "Code", "type": "char", "size": "20" }
                }
            ]
        }]
    }))
    .unwrap();
    let schema = parse_schema(&node).unwrap();

    let mut options = manifest_options(dir.path());
    options.filters = vec![include_all(ObjectKind::Table, "CRUD")];
    let strategy = build_strategy(options.code_strategy, &options);
    let engine = GenerationEngine::new(options, strategy);

    let report = engine.run(schema).await.unwrap();
    assert_eq!(report.units.relations, 1);
    assert_eq!(report.units.total(), 1);
    assert!(report.unused_rules.is_empty());

    let raw = fs::read(dir.path().join("Customer.entity.json")).unwrap();
    let entity: EntityManifest = serde_json::from_slice(&raw).unwrap();
    assert_eq!(entity.fields[1].type_info.declared, "Option<String>");
    assert_eq!(entity.fields[1].sql, "VARCHAR2(20)");

    let dao = read_dao(dir.path(), "Customer");
    assert_eq!(dao.capabilities.as_deref(), Some("CRUD"));
    assert_eq!(dao.key_columns, vec!["Id".to_string()]);
}

#[tokio::test]
async fn a_filtered_run_only_touches_selected_objects() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = manifest_options(dir.path());
    options.filters = vec![Filter {
        kind: ObjectKind::Table,
        rules: vec![FilterRule {
            action: RuleAction::Include,
            pattern: NamePattern::new("Customer").unwrap(),
            capabilities: "CR".parse::<CapabilitySet>().unwrap(),
        }],
    }];
    let strategy = build_strategy(options.code_strategy, &options);
    let engine = GenerationEngine::new(options, strategy);

    let report = engine.run(sample_schema()).await.unwrap();
    assert_eq!(report.units.total(), 1);

    let dao = read_dao(dir.path(), "Customer");
    assert_eq!(dao.capabilities.as_deref(), Some("CR"));
    assert!(!dir.path().join("ActiveCustomer.dao.json").exists());
    assert!(!dir.path().join("CustomerTotal.entity.json").exists());
}

#[tokio::test]
async fn collisions_surface_through_the_failed_report() {
    let dir = tempfile::tempdir().unwrap();
    let node = serde_json::from_value(json!({
        "element": "schema",
        "attributes": { "name": "shop" },
        "children": [
            {
                "element": "table",
                "attributes": { "name": "CustomerTotal" },
                "children": [
                    {
                        "element": "column",
                        "attributes": {
                            "name": "Id",
                            "type": "integer",
                            "requirement": "primarykey"
                        }
                    }
                ]
            },
            {
                "element": "customview",
                "attributes": { "name": "CustomerTotals", "customentity": "CustomerTotal" },
                "children": [
                    {
                        "element": "column",
                        "attributes": { "name": "Total", "type": "integer" }
                    },
                    { "element": "sql", "text": "select 1" }
                ]
            }
        ]
    }))
    .unwrap();
    let schema = parse_schema(&node).unwrap();

    let options = manifest_options(dir.path());
    let strategy = build_strategy(options.code_strategy, &options);
    let engine = GenerationEngine::new(options, strategy);

    let err = engine.run(schema).await.unwrap_err();
    match err {
        GenerationError::Failed(report) => {
            let failure = report.failure.unwrap();
            assert!(failure.contains("CustomerTotal"), "failure was: {failure}");
        }
        other => panic!("expected a failed report, got {other}"),
    }
}
