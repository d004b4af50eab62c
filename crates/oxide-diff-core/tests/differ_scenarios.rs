//! End-to-end scenarios for the diff engine.
//!
//! Each test builds a "current" and a "wanted" schema, diffs them, and
//! checks the selected statements, their order, the diagnostics and the
//! final severity.

use oxide_diff_core::prelude::*;

fn build(def: SchemaDef) -> Schema {
    def.build(&MySqlRenderer).unwrap()
}

fn id() -> FieldDef {
    FieldDef::new("id", "int(11)").not_null().auto_increment()
}

fn name() -> FieldDef {
    FieldDef::new("name", "varchar(64)")
        .collation("utf8mb4_general_ci")
        .not_null()
}

fn users() -> TableDef {
    TableDef::new("users")
        .field(id())
        .field(name())
        .index(IndexDef::primary(["id"]))
}

fn shop() -> SchemaDef {
    SchemaDef::new()
        .table(users().index(IndexDef::new("idx_name", ["name"]).unique()))
        .table(
            TableDef::new("orders")
                .field(id())
                .field(FieldDef::new("user_id", "int(11)").not_null())
                .field(
                    FieldDef::new("total", "decimal(10,2)")
                        .not_null()
                        .default_value("0.00")
                        .comment("gross amount"),
                )
                .index(IndexDef::primary(["id"]))
                .index(IndexDef::new("idx_user", ["user_id", "id"])),
        )
        .table(
            TableDef::new("logs")
                .engine("MyISAM")
                .field(FieldDef::new("line", "text").collation("utf8mb4_general_ci")),
        )
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn diff_of_schema_with_itself_is_empty() {
    let schema = build(shop());
    let result = Differ::new().diff(&schema, &schema).unwrap();

    assert!(result.is_empty());
    assert!(result.diagnostics().is_empty());
    assert_eq!(result.severity(), Severity::NoChange);
    assert_eq!(result.sql(), "");
}

#[test]
fn diff_of_empty_schemas_is_empty() {
    let result = Differ::new()
        .diff(&build(SchemaDef::new()), &build(SchemaDef::new()))
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.severity(), Severity::NoChange);
}

#[test]
fn table_removals_and_additions_are_exact() {
    let current = build(
        SchemaDef::new()
            .table(TableDef::new("a").field(id()))
            .table(TableDef::new("shared").field(id()))
            .table(TableDef::new("b").field(id())),
    );
    let wanted = build(
        SchemaDef::new()
            .table(TableDef::new("d").field(id()))
            .table(TableDef::new("shared").field(id()))
            .table(TableDef::new("c").field(id())),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();
    let statements = result.statements();

    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0], "DROP TABLE `a`");
    assert_eq!(statements[1], "DROP TABLE `b`");
    assert!(statements[2].starts_with("CREATE TABLE `d`"));
    assert!(statements[3].starts_with("CREATE TABLE `c`"));
    assert_eq!(
        result.diagnostic_lines().collect::<Vec<_>>(),
        ["[Table=a]Table dropped", "[Table=b]Table dropped"]
    );
}

#[test]
fn data_loss_dominates_other_changes() {
    let current = build(shop());
    let wanted = build(
        SchemaDef::new()
            .table(users().field(FieldDef::new("email", "varchar(255)")))
            .table(
                TableDef::new("orders")
                    .field(id())
                    .field(FieldDef::new("user_id", "bigint(20)").not_null())
                    .index(IndexDef::primary(["id"])),
            )
            .table(TableDef::new("audit").field(id())),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(result.severity(), Severity::DataLoss);
}

#[test]
fn all_phases_follow_the_statement_order() {
    let current = build(
        SchemaDef::new()
            .table(TableDef::new("tags").field(FieldDef::new("label", "varchar(32)")))
            .table(TableDef::new("legacy").field(FieldDef::new("x", "int")))
            .table(
                TableDef::new("users")
                    .field(id())
                    .field(name())
                    .field(FieldDef::new("age", "int(11)"))
                    .field(FieldDef::new("nickname", "varchar(32)"))
                    .index(IndexDef::primary(["id"]))
                    .index(IndexDef::new("idx_old", ["name"]))
                    .index(IndexDef::new("idx_name", ["name"])),
            ),
    );
    let wanted = build(
        SchemaDef::new()
            .table(
                TableDef::new("users")
                    .field(id())
                    .field(name().comment("display name"))
                    .field(FieldDef::new("email", "varchar(255)").not_null().default_value(""))
                    .field(FieldDef::new("age", "varchar(10)"))
                    .index(IndexDef::primary(["id"]))
                    .index(IndexDef::new("idx_new", ["name", "id"]))
                    .index(IndexDef::new("idx_name", ["name"]).unique()),
            )
            .table(TableDef::new("audit").field(id()))
            .table(
                TableDef::new("tags")
                    .field(FieldDef::new("label", "varchar(32)"))
                    .field(FieldDef::new("color", "char(7)")),
            ),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();

    let audit_create = wanted.table("audit").unwrap().create_sql();
    assert_eq!(
        result.statements(),
        [
            "DROP TABLE `legacy`",
            audit_create,
            "ALTER TABLE `users` DROP INDEX `idx_old`",
            "ALTER TABLE `users` ADD INDEX `idx_new` USING BTREE (`name`,`id`)",
            "ALTER TABLE `users` DROP INDEX `idx_name`",
            "ALTER TABLE `users` ADD UNIQUE INDEX `idx_name` USING BTREE (`name`)",
            "ALTER TABLE `users` DROP COLUMN `nickname`",
            "ALTER TABLE `users` MODIFY COLUMN `name` varchar(64) COLLATE utf8mb4_general_ci \
             NOT NULL COMMENT 'display name'",
            "ALTER TABLE `users` ADD COLUMN `email` varchar(255) NOT NULL DEFAULT ''",
            "ALTER TABLE `users` MODIFY COLUMN `age` varchar(10) NULL",
            "ALTER TABLE `tags` ADD COLUMN `color` char(7) NULL",
        ]
    );
    assert_eq!(
        result.diagnostic_lines().collect::<Vec<_>>(),
        [
            "[Table=legacy]Table dropped",
            "[Table=users][Field=nickname]Field dropped",
            "[Table=users][Field=age]Field type has changed from int(11) to varchar(10)",
        ]
    );
    assert_eq!(result.severity(), Severity::DataLoss);
}

#[test]
fn renamed_field_is_drop_plus_create() {
    let current = build(SchemaDef::new().table(users()));
    let wanted = build(
        SchemaDef::new().table(
            TableDef::new("users")
                .field(id())
                .field(
                    FieldDef::new("full_name", "varchar(64)")
                        .collation("utf8mb4_general_ci")
                        .not_null(),
                )
                .index(IndexDef::primary(["id"])),
        ),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(
        result.statements(),
        [
            "ALTER TABLE `users` DROP COLUMN `name`",
            "ALTER TABLE `users` ADD COLUMN `full_name` varchar(64) COLLATE utf8mb4_general_ci NOT NULL",
        ]
    );
    assert!(!result.statements().iter().any(|s| s.contains("MODIFY")));
    assert_eq!(result.severity(), Severity::DataLoss);
    assert_eq!(
        result.diagnostic_lines().collect::<Vec<_>>(),
        ["[Table=users][Field=name]Field dropped"]
    );
}

#[test]
fn renamed_table_is_drop_plus_create() {
    let current = build(SchemaDef::new().table(users()));
    let wanted = build(
        SchemaDef::new().table(
            TableDef::new("accounts")
                .field(id())
                .field(name())
                .index(IndexDef::primary(["id"])),
        ),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(result.statements().len(), 2);
    assert_eq!(result.statements()[0], "DROP TABLE `users`");
    assert!(result.statements()[1].starts_with("CREATE TABLE `accounts`"));
}

#[test]
fn field_classification_is_exclusive() {
    struct Case {
        wanted: FieldDef,
        severity: Severity,
        statements: usize,
    }

    let cases = [
        Case {
            wanted: name(),
            severity: Severity::NoChange,
            statements: 0,
        },
        Case {
            wanted: name().default_value("anonymous"),
            severity: Severity::Safe,
            statements: 1,
        },
        Case {
            wanted: FieldDef::new("name", "varchar(64)").collation("utf8mb4_general_ci"),
            severity: Severity::Safe,
            statements: 1,
        },
        Case {
            wanted: name().auto_increment(),
            severity: Severity::Safe,
            statements: 1,
        },
        Case {
            wanted: FieldDef::new("name", "varchar(128)")
                .collation("utf8mb4_general_ci")
                .not_null(),
            severity: Severity::DataAlteration,
            statements: 1,
        },
        Case {
            wanted: FieldDef::new("name", "varchar(128)").comment("both tiers"),
            severity: Severity::DataAlteration,
            statements: 1,
        },
    ];

    let current = build(SchemaDef::new().table(TableDef::new("users").field(name())));
    for case in cases {
        let wanted = build(
            SchemaDef::new().table(TableDef::new("users").field(case.wanted.clone())),
        );
        let result = Differ::new().diff(&current, &wanted).unwrap();

        assert_eq!(result.severity(), case.severity, "{:?}", case.wanted);
        assert_eq!(result.statements().len(), case.statements, "{:?}", case.wanted);
        if case.statements == 1 {
            assert!(result.statements()[0].starts_with("ALTER TABLE `users` MODIFY COLUMN `name`"));
        }
        let has_diagnostic = !result.diagnostics().is_empty();
        assert_eq!(has_diagnostic, case.severity == Severity::DataAlteration);
    }
}

#[test]
fn index_column_order_is_significant() {
    let current = build(
        SchemaDef::new().table(users().index(IndexDef::new("idx_pair", ["id", "name"]))),
    );
    let wanted = build(
        SchemaDef::new().table(users().index(IndexDef::new("idx_pair", ["name", "id"]))),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(
        result.statements(),
        [
            "ALTER TABLE `users` DROP INDEX `idx_pair`",
            "ALTER TABLE `users` ADD INDEX `idx_pair` USING BTREE (`name`,`id`)",
        ]
    );
    assert_eq!(result.severity(), Severity::PerfRisk);
}

#[test]
fn removals_follow_current_order_within_a_table() {
    let current = build(
        SchemaDef::new().table(
            TableDef::new("t")
                .field(FieldDef::new("z", "int"))
                .field(FieldDef::new("keep", "int"))
                .field(FieldDef::new("a", "int")),
        ),
    );
    let wanted = build(SchemaDef::new().table(TableDef::new("t").field(FieldDef::new("keep", "int"))));

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(
        result.statements(),
        [
            "ALTER TABLE `t` DROP COLUMN `z`",
            "ALTER TABLE `t` DROP COLUMN `a`",
        ]
    );
}

#[test]
fn unsupported_engine_change_aborts_whole_comparison() {
    let current = build(shop());
    let wanted = build(
        SchemaDef::new()
            .table(users())
            .table(
                TableDef::new("logs")
                    .field(FieldDef::new("line", "text").collation("utf8mb4_general_ci")),
            ),
    );

    let err = Differ::new().diff(&current, &wanted).unwrap_err();
    let DiffError::UnsupportedChange { table, kind, .. } = err;
    assert_eq!(table, "logs");
    assert_eq!(kind, UnsupportedKind::Engine);
}

#[test]
fn report_mirrors_result() {
    let current = build(SchemaDef::new().table(users()).table(TableDef::new("logs").field(id())));
    let wanted = build(SchemaDef::new().table(users()));

    let result = oxide_diff_core::diff(&current, &wanted).unwrap();
    let report = DiffReport::from(&result);

    assert_eq!(report.severity, Severity::DataLoss);
    assert_eq!(report.exit_code, 5);
    assert_eq!(report.statements, ["DROP TABLE `logs`"]);
    assert_eq!(report.diagnostics, ["[Table=logs]Table dropped"]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["severity"], "data_loss");
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_add_field() {
    let current = build(SchemaDef::new().table(TableDef::new("users").field(id()).field(name())));
    let wanted = build(
        SchemaDef::new().table(
            TableDef::new("users")
                .field(id())
                .field(name())
                .field(FieldDef::new("email", "varchar(255)").not_null().default_value("")),
        ),
    );

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(
        result.sql(),
        "ALTER TABLE `users` ADD COLUMN `email` varchar(255) NOT NULL DEFAULT '';\n\n"
    );
    assert_eq!(result.severity(), Severity::Safe);
    assert!(result.diagnostics().is_empty());
}

#[test]
fn scenario_drop_unique_index() {
    let current = build(
        SchemaDef::new().table(users().index(IndexDef::new("idx_name", ["name"]).unique())),
    );
    let wanted = build(SchemaDef::new().table(users()));

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(result.statements(), ["ALTER TABLE `users` DROP INDEX `idx_name`"]);
    assert_eq!(result.severity(), Severity::PerfRisk);
}

#[test]
fn scenario_field_type_change() {
    let current = build(SchemaDef::new().table(users().field(FieldDef::new("age", "int"))));
    let wanted = build(SchemaDef::new().table(users().field(FieldDef::new("age", "varchar(10)"))));

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(
        result.statements(),
        ["ALTER TABLE `users` MODIFY COLUMN `age` varchar(10) NULL"]
    );
    assert_eq!(result.severity(), Severity::DataAlteration);

    match result.diagnostics() {
        [Diagnostic::FieldTypeChanged { table, field, from, to }] => {
            assert_eq!(table, "users");
            assert_eq!(field, "age");
            assert_eq!(from.sql_type, "int");
            assert_eq!(to.sql_type, "varchar(10)");
        }
        other => panic!("Expected one FieldTypeChanged, got {other:?}"),
    }
}

#[test]
fn scenario_drop_table() {
    let current = build(SchemaDef::new().table(users()).table(TableDef::new("logs").field(id())));
    let wanted = build(SchemaDef::new().table(users()));

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(result.statements(), ["DROP TABLE `logs`"]);
    assert_eq!(result.severity(), Severity::DataLoss);
}

#[test]
fn scenario_comment_change() {
    let current = build(SchemaDef::new().table(users().field(FieldDef::new("bio", "text").comment("old"))));
    let wanted = build(SchemaDef::new().table(users().field(FieldDef::new("bio", "text").comment("new"))));

    let result = Differ::new().diff(&current, &wanted).unwrap();
    assert_eq!(
        result.statements(),
        ["ALTER TABLE `users` MODIFY COLUMN `bio` text NULL COMMENT 'new'"]
    );
    assert_eq!(result.severity(), Severity::Safe);
}
