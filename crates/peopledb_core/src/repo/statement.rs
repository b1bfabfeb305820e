//! Per-operation statement directives and their resolution.
//!
//! # Responsibility
//! - Name the seven generic operations the CRUD engine runs.
//! - Hold the statement text a mapper attaches to its hooks.
//! - Pick the statement for an operation, falling back to a mapper default.
//!
//! # Invariants
//! - Directives are fixed once a `DirectiveSet` is built.
//! - Resolution never fails; an empty result means "no statement" and is
//!   rejected when the engine tries to execute it.
//! - When several directives share a kind, the first declared wins. The
//!   duplicate is not reported.

use std::fmt::{Display, Formatter};

/// Named placeholder that `DeleteMany` statements carry for the id list.
pub const IDS_PLACEHOLDER: &str = ":ids";

/// Generic operation run by the CRUD engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Save,
    FindById,
    FindAll,
    Count,
    DeleteOne,
    DeleteMany,
    Update,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        Self::Save,
        Self::FindById,
        Self::FindAll,
        Self::Count,
        Self::DeleteOne,
        Self::DeleteMany,
        Self::Update,
    ];

    /// Stable snake_case name used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::FindById => "find_by_id",
            Self::FindAll => "find_all",
            Self::Count => "count",
            Self::DeleteOne => "delete_one",
            Self::DeleteMany => "delete_many",
            Self::Update => "update",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapper hook a directive is declared on.
///
/// The hook a directive sits on carries no meaning for resolution; it only
/// keeps declarations next to the code that binds or reads the same columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapperHook {
    BindForSave,
    BindForUpdate,
    ExtractEntity,
}

/// Statement text override for one operation kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: OperationKind,
    pub statement: String,
}

impl Directive {
    pub fn new(kind: OperationKind, statement: impl Into<String>) -> Self {
        Self {
            kind,
            statement: statement.into(),
        }
    }
}

/// Ordered directives grouped by the hook they are declared on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    groups: Vec<(MapperHook, Vec<Directive>)>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches one directive to `hook`.
    pub fn attach(
        self,
        hook: MapperHook,
        kind: OperationKind,
        statement: impl Into<String>,
    ) -> Self {
        self.attach_all(hook, [Directive::new(kind, statement)])
    }

    /// Attaches a group of directives to `hook`, keeping their order.
    pub fn attach_all(
        mut self,
        hook: MapperHook,
        directives: impl IntoIterator<Item = Directive>,
    ) -> Self {
        let directives: Vec<Directive> = directives.into_iter().collect();
        match self.groups.iter_mut().find(|(existing, _)| *existing == hook) {
            Some((_, group)) => group.extend(directives),
            None => self.groups.push((hook, directives)),
        }
        self
    }

    /// Directives declared on `hook`, in declaration order.
    pub fn on_hook(&self, hook: MapperHook) -> &[Directive] {
        self.groups
            .iter()
            .find(|(existing, _)| *existing == hook)
            .map(|(_, group)| group.as_slice())
            .unwrap_or(&[])
    }

    /// Every directive, hook groups first-declared first.
    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.groups.iter().flat_map(|(_, group)| group.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Resolves statement text for an operation kind.
#[derive(Debug, Clone, Default)]
pub struct StatementResolver {
    directives: DirectiveSet,
}

impl StatementResolver {
    pub fn new(directives: DirectiveSet) -> Self {
        Self { directives }
    }

    /// Returns the first directive text declared for `kind`, otherwise the
    /// result of `default_supplier`, both verbatim.
    pub fn resolve(&self, kind: OperationKind, default_supplier: impl FnOnce() -> String) -> String {
        self.directives
            .iter()
            .find(|directive| directive.kind == kind)
            .map(|directive| directive.statement.clone())
            .unwrap_or_else(default_supplier)
    }
}

/// Replaces the `:ids` placeholder with a comma-joined id list.
pub fn substitute_ids(statement: &str, ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    statement.replace(IDS_PLACEHOLDER, &joined)
}
