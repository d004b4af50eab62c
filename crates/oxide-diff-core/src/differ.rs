//! Schema diff engine.
//!
//! Compares a "current" and a "wanted" [`Schema`] and selects, from the DDL
//! already rendered on each entity, the statements that turn one into the
//! other. Tables, fields and indexes are matched by exact name only, so a
//! rename always shows up as a drop followed by a create.
//!
//! Output order is part of the contract:
//!
//! 1. tables missing from `wanted` are dropped (in `current` order),
//! 2. tables missing from `current` are created (in `wanted` order),
//! 3. every table on both sides is reconciled (in `wanted` order): indexes
//!    first, then fields. Within each, removals come first in `current`
//!    order, then one pass over `wanted` emits additions and modifications.

use tracing::debug;

use crate::error::{DiffError, Result, UnsupportedKind};
use crate::report::{ColumnType, Diagnostic};
use crate::schema::{Field, Index, Schema, Table};
use crate::severity::Severity;

const PHASE_TABLES: &str = "table reconciliation";

/// Strictness toggles for the diff engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffProfile {
    /// Whether indexes are compared at all.
    pub compare_indexes: bool,
    /// Whether field changes are split into safe and unsafe tiers. When off,
    /// every field change is classified as a data alteration.
    pub split_field_checks: bool,
}

impl Default for DiffProfile {
    fn default() -> Self {
        Self::strict()
    }
}

impl DiffProfile {
    /// Compares indexes and classifies field changes in two tiers.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            compare_indexes: true,
            split_field_checks: true,
        }
    }

    /// Ignores indexes and treats every field change as unsafe.
    #[must_use]
    pub const fn coarse() -> Self {
        Self {
            compare_indexes: false,
            split_field_checks: false,
        }
    }

    /// Enables or disables index comparison.
    #[must_use]
    pub const fn with_index_diff(mut self, enabled: bool) -> Self {
        self.compare_indexes = enabled;
        self
    }

    /// Enables or disables the safe/unsafe split for field changes.
    #[must_use]
    pub const fn with_field_split(mut self, enabled: bool) -> Self {
        self.split_field_checks = enabled;
        self
    }
}

/// Outcome of a completed comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    statements: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    severity: Severity,
}

impl DiffResult {
    /// A result with nothing to do.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    fn statement(sql: &str, severity: Severity) -> Self {
        debug!(%severity, sql, "statement selected");
        Self {
            statements: vec![sql.to_string()],
            diagnostics: Vec::new(),
            severity,
        }
    }

    fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Appends `next` after `self`, keeping the higher severity.
    #[must_use]
    pub fn then(mut self, next: Self) -> Self {
        self.statements.extend(next.statements);
        self.diagnostics.extend(next.diagnostics);
        self.severity = self.severity.raise(next.severity);
        self
    }

    /// Statements in application order.
    #[must_use]
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Advisory notices in emission order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics rendered as `[Table=..][Field=..]...` lines.
    pub fn diagnostic_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.diagnostics.iter().map(ToString::to_string)
    }

    /// Highest severity reached.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns true if no statement was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Renders the statement stream.
    #[must_use]
    pub fn sql(&self) -> String {
        crate::report::render_statements(&self.statements)
    }
}

impl FromIterator<DiffResult> for DiffResult {
    fn from_iter<I: IntoIterator<Item = DiffResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::then)
    }
}

/// Compares schemas according to a [`DiffProfile`].
#[derive(Debug, Clone, Default)]
pub struct Differ {
    profile: DiffProfile,
}

impl Differ {
    /// Creates a differ with the strict profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a differ with a custom profile.
    #[must_use]
    pub const fn with_profile(profile: DiffProfile) -> Self {
        Self { profile }
    }

    /// Returns the statements that transform `current` into `wanted`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::UnsupportedChange`] if a table present on both
    /// sides changes engine or collation. No partial result is returned.
    pub fn diff(&self, current: &Schema, wanted: &Schema) -> Result<DiffResult> {
        let removed: DiffResult = current
            .tables()
            .iter()
            .filter(|t| wanted.table(t.name()).is_none())
            .map(|t| {
                DiffResult::statement(t.drop_sql(), Severity::DataLoss).with_diagnostic(
                    Diagnostic::TableDropped {
                        table: t.name().to_string(),
                    },
                )
            })
            .collect();
        debug!(statements = removed.statements.len(), "table removal done");

        let added: DiffResult = wanted
            .tables()
            .iter()
            .filter(|t| current.table(t.name()).is_none())
            .map(|t| DiffResult::statement(t.create_sql(), Severity::Safe))
            .collect();
        debug!(statements = added.statements.len(), "table addition done");

        let reconciled = wanted
            .tables()
            .iter()
            .filter_map(|w| current.table(w.name()).map(|c| (c, w)))
            .map(|(c, w)| self.diff_table(c, w))
            .collect::<Result<DiffResult>>()?;
        debug!(
            statements = reconciled.statements.len(),
            "table reconciliation done"
        );

        Ok(removed.then(added).then(reconciled))
    }

    fn diff_table(&self, current: &Table, wanted: &Table) -> Result<DiffResult> {
        if current.engine() != wanted.engine() {
            return Err(unsupported(
                current,
                UnsupportedKind::Engine,
                current.engine(),
                wanted.engine(),
            ));
        }
        if current.collation() != wanted.collation() {
            return Err(unsupported(
                current,
                UnsupportedKind::Collation,
                current.collation(),
                wanted.collation(),
            ));
        }

        let indexes = if self.profile.compare_indexes {
            diff_indexes(current, wanted)
        } else {
            DiffResult::empty()
        };

        Ok(indexes.then(self.diff_fields(current, wanted)))
    }

    fn diff_fields(&self, current: &Table, wanted: &Table) -> DiffResult {
        let removed: DiffResult = current
            .fields()
            .iter()
            .filter(|f| wanted.field(f.name()).is_none())
            .map(|f| {
                DiffResult::statement(f.drop_sql(), Severity::DataLoss).with_diagnostic(
                    Diagnostic::FieldDropped {
                        table: current.name().to_string(),
                        field: f.name().to_string(),
                    },
                )
            })
            .collect();

        let added_or_changed: DiffResult = wanted
            .fields()
            .iter()
            .map(|w| match current.field(w.name()) {
                None => DiffResult::statement(w.create_sql(), Severity::Safe),
                Some(c) => self.diff_field(current.name(), c, w),
            })
            .collect();

        removed.then(added_or_changed)
    }

    /// Exactly one of: nothing, a safe alter, an unsafe alter.
    fn diff_field(&self, table: &str, current: &Field, wanted: &Field) -> DiffResult {
        let unsafe_change = current.sql_type() != wanted.sql_type()
            || current.collation() != wanted.collation();
        let safe_change = current.nullable() != wanted.nullable()
            || current.default_value() != wanted.default_value()
            || current.auto_increment() != wanted.auto_increment()
            || current.comment() != wanted.comment();

        let treat_as_unsafe = if self.profile.split_field_checks {
            unsafe_change
        } else {
            unsafe_change || safe_change
        };

        if treat_as_unsafe {
            DiffResult::statement(wanted.alter_sql(), Severity::DataAlteration).with_diagnostic(
                Diagnostic::FieldTypeChanged {
                    table: table.to_string(),
                    field: wanted.name().to_string(),
                    from: column_type(current),
                    to: column_type(wanted),
                },
            )
        } else if safe_change {
            DiffResult::statement(wanted.alter_sql(), Severity::Safe)
        } else {
            DiffResult::empty()
        }
    }
}

fn diff_indexes(current: &Table, wanted: &Table) -> DiffResult {
    let removed: DiffResult = current
        .indexes()
        .iter()
        .filter(|i| wanted.index(i.name()).is_none())
        .map(|i| DiffResult::statement(i.drop_sql(), Severity::PerfRisk))
        .collect();

    let added_or_changed: DiffResult = wanted
        .indexes()
        .iter()
        .map(|w| match current.index(w.name()) {
            None => DiffResult::statement(w.create_sql(), Severity::Safe),
            Some(c) if c.differs_from(w) => rebuild_index(c, w),
            Some(_) => DiffResult::empty(),
        })
        .collect();

    removed.then(added_or_changed)
}

fn rebuild_index(current: &Index, wanted: &Index) -> DiffResult {
    DiffResult::statement(current.drop_sql(), Severity::PerfRisk)
        .then(DiffResult::statement(wanted.create_sql(), Severity::PerfRisk))
}

fn column_type(field: &Field) -> ColumnType {
    ColumnType {
        sql_type: field.sql_type().to_string(),
        collation: field.collation().map(str::to_string),
    }
}

fn unsupported(table: &Table, kind: UnsupportedKind, current: &str, wanted: &str) -> DiffError {
    DiffError::UnsupportedChange {
        table: table.name().to_string(),
        kind,
        current: current.to_string(),
        wanted: wanted.to_string(),
        phase: PHASE_TABLES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlRenderer;
    use crate::schema::{FieldDef, IndexDef, SchemaDef, TableDef};

    fn build(def: SchemaDef) -> Schema {
        def.build(&MySqlRenderer).unwrap()
    }

    fn users() -> TableDef {
        TableDef::new("users")
            .field(FieldDef::new("id", "int").not_null().auto_increment())
            .field(FieldDef::new("name", "varchar(64)").collation("utf8mb4_general_ci"))
            .index(IndexDef::primary(["id"]))
    }

    #[test]
    fn test_then_keeps_order_and_max_severity() {
        let a = DiffResult::statement("A", Severity::DataLoss);
        let b = DiffResult::statement("B", Severity::Safe);
        let joined = a.then(b);
        assert_eq!(joined.statements(), ["A", "B"]);
        assert_eq!(joined.severity(), Severity::DataLoss);
    }

    #[test]
    fn test_collect_of_nothing_is_empty() {
        let result: DiffResult = std::iter::empty::<DiffResult>().collect();
        assert!(result.is_empty());
        assert_eq!(result.severity(), Severity::NoChange);
    }

    #[test]
    fn test_index_added_and_changed_follow_wanted_order() {
        let current = build(SchemaDef::new().table(
            users().index(IndexDef::new("idx_b", ["name"])),
        ));
        let wanted = build(SchemaDef::new().table(
            users()
                .index(IndexDef::new("idx_a", ["name"]))
                .index(IndexDef::new("idx_b", ["name"]).unique()),
        ));

        let result = Differ::new().diff(&current, &wanted).unwrap();
        assert_eq!(
            result.statements(),
            [
                "ALTER TABLE `users` ADD INDEX `idx_a` USING BTREE (`name`)",
                "ALTER TABLE `users` DROP INDEX `idx_b`",
                "ALTER TABLE `users` ADD UNIQUE INDEX `idx_b` USING BTREE (`name`)",
            ]
        );
        assert_eq!(result.severity(), Severity::PerfRisk);
    }

    #[test]
    fn test_index_type_change_rebuilds() {
        let current = build(SchemaDef::new().table(users().index(IndexDef::new("idx", ["name"]))));
        let wanted = build(SchemaDef::new().table(
            users().index(IndexDef::new("idx", ["name"]).using("HASH")),
        ));

        let result = Differ::new().diff(&current, &wanted).unwrap();
        assert_eq!(result.statements().len(), 2);
        assert_eq!(result.severity(), Severity::PerfRisk);
    }

    #[test]
    fn test_indexes_come_before_fields() {
        let current = build(SchemaDef::new().table(users()));
        let wanted = build(SchemaDef::new().table(
            users()
                .field(FieldDef::new("email", "varchar(255)"))
                .index(IndexDef::new("idx_email", ["email"])),
        ));

        let result = Differ::new().diff(&current, &wanted).unwrap();
        assert!(result.statements()[0].contains("ADD INDEX `idx_email`"));
        assert!(result.statements()[1].contains("ADD COLUMN `email`"));
    }

    #[test]
    fn test_index_diff_can_be_disabled() {
        let current = build(SchemaDef::new().table(users().index(IndexDef::new("idx", ["name"]))));
        let wanted = build(SchemaDef::new().table(users()));

        let differ = Differ::with_profile(DiffProfile::strict().with_index_diff(false));
        let result = differ.diff(&current, &wanted).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.severity(), Severity::NoChange);
    }

    #[test]
    fn test_coarse_profile_treats_safe_change_as_alteration() {
        let current = build(SchemaDef::new().table(users()));
        let wanted = build(SchemaDef::new().table(
            TableDef::new("users")
                .field(FieldDef::new("id", "int").not_null().auto_increment())
                .field(
                    FieldDef::new("name", "varchar(64)")
                        .collation("utf8mb4_general_ci")
                        .not_null(),
                )
                .index(IndexDef::primary(["id"])),
        ));

        let strict = Differ::new().diff(&current, &wanted).unwrap();
        assert_eq!(strict.severity(), Severity::Safe);
        assert!(strict.diagnostics().is_empty());

        let coarse = Differ::with_profile(DiffProfile::coarse())
            .diff(&current, &wanted)
            .unwrap();
        assert_eq!(coarse.severity(), Severity::DataAlteration);
        assert_eq!(coarse.statements(), strict.statements());
        assert_eq!(coarse.diagnostics().len(), 1);
    }

    #[test]
    fn test_collation_change_is_unsafe() {
        let current = build(SchemaDef::new().table(users()));
        let wanted = build(SchemaDef::new().table(
            TableDef::new("users")
                .field(FieldDef::new("id", "int").not_null().auto_increment())
                .field(FieldDef::new("name", "varchar(64)").collation("utf8mb4_bin"))
                .index(IndexDef::primary(["id"])),
        ));

        let result = Differ::new().diff(&current, &wanted).unwrap();
        assert_eq!(result.severity(), Severity::DataAlteration);
        assert_eq!(
            result.diagnostic_lines().collect::<Vec<_>>(),
            ["[Table=users][Field=name]Field type has changed from varchar(64) COLLATE utf8mb4_general_ci to varchar(64) COLLATE utf8mb4_bin"]
        );
    }

    #[test]
    fn test_engine_change_aborts() {
        let current = build(SchemaDef::new().table(users()));
        let wanted = build(SchemaDef::new().table(users().engine("MyISAM")));

        let err = Differ::new().diff(&current, &wanted).unwrap_err();
        assert_eq!(
            err,
            DiffError::UnsupportedChange {
                table: "users".to_string(),
                kind: UnsupportedKind::Engine,
                current: "InnoDB".to_string(),
                wanted: "MyISAM".to_string(),
                phase: PHASE_TABLES,
            }
        );
    }

    #[test]
    fn test_table_collation_change_aborts() {
        let current = build(SchemaDef::new().table(users()));
        let wanted = build(SchemaDef::new().table(users().collation("latin1_swedish_ci")));

        let err = Differ::new().diff(&current, &wanted).unwrap_err();
        assert!(matches!(
            err,
            DiffError::UnsupportedChange {
                kind: UnsupportedKind::Collation,
                ..
            }
        ));
        assert!(err.to_string().starts_with("[Table=users] Collation update not supported"));
    }

    #[test]
    fn test_abort_discards_earlier_phases() {
        let current = build(SchemaDef::new().table(users()).table(TableDef::new("logs")));
        let wanted = build(SchemaDef::new().table(users().engine("MyISAM")));

        assert!(Differ::new().diff(&current, &wanted).is_err());
    }
}
