//! Scoped symbol table (component A).
//!
//! Per REDESIGN FLAGS, the scope tree lives in an arena and is addressed via
//! small `Copy` handles (`ScopeId`, `SymbolId`) rather than cyclic parent
//! pointers — children point at parents by handle, never by reference, so
//! nothing here borrows across the arena boundary.
//!
//! The scope tree is immutable once a file's first pass completes: nothing
//! in this module removes a symbol or scope once inserted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::TokenAddress;

/// Handle to a scope in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

/// Handle to a symbol in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Literal kinds recognized at the symbol-table level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    Boolean,
    Char,
    Int,
    Float,
    String,
}

/// A host-language variable declaration's fixed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableData {
    pub name: String,
    pub type_name: String,
    /// Ordered generic type parameters, e.g. `Array<Int32>` -> `["Int32"]`.
    pub type_parameters: Vec<String>,
    pub modifier: Modifier,
    pub statement_range: TokenAddress,
}

/// Host-language declaration modifier, relevant only insofar as it decides
/// `final`-ness for the classifier (component E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    Final,
    Mutable,
}

impl Modifier {
    pub fn is_final(&self) -> bool {
        matches!(self, Modifier::Final)
    }
}

/// The symbol sum type (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    /// The single top-level symbol of a file.
    Root,
    Class {
        name: String,
        body_range: TokenAddress,
    },
    Method {
        name: String,
        signature: String,
    },
    Variable(VariableData),
    /// A `Variable` additionally recognized as a DSL instance by the catalog.
    UserLibraryVariable(VariableData),
    Literal {
        kind: LiteralKind,
        value: String,
    },
    Expression {
        text: String,
    },
    Creator {
        attributed_object_name: String,
        arguments: Vec<SymbolId>,
        statement_range: TokenAddress,
    },
}

/// Discriminant used for lookup filtering, independent of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKindTag {
    Root,
    Class,
    Method,
    Variable,
    UserLibraryVariable,
    Literal,
    Expression,
    Creator,
}

impl SymbolKind {
    pub fn tag(&self) -> SymbolKindTag {
        match self {
            SymbolKind::Root => SymbolKindTag::Root,
            SymbolKind::Class { .. } => SymbolKindTag::Class,
            SymbolKind::Method { .. } => SymbolKindTag::Method,
            SymbolKind::Variable(_) => SymbolKindTag::Variable,
            SymbolKind::UserLibraryVariable(_) => SymbolKindTag::UserLibraryVariable,
            SymbolKind::Literal { .. } => SymbolKindTag::Literal,
            SymbolKind::Expression { .. } => SymbolKindTag::Expression,
            SymbolKind::Creator { .. } => SymbolKindTag::Creator,
        }
    }
}

/// A stored symbol: its kind, its disambiguating identifier, and the
/// back-edge to its enclosing scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Disambiguates homonyms: the Nth symbol named `name` of a given kind
    /// declared directly in `enclosing_scope`, starting at 0.
    pub identifier: u32,
    pub enclosing_scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateInScope {
    pub scope: ScopeId,
    pub name: String,
    pub tag: SymbolKindTag,
    pub identifier: u32,
}

/// One lexical scope: an ordered, name-keyed mapping to the symbols declared
/// directly within it, plus nested child scopes.
#[derive(Debug, Clone, Default)]
struct Scope {
    parent: Option<ScopeId>,
    /// Name -> symbols declared directly in this scope, in declaration order.
    children: HashMap<String, Vec<SymbolId>>,
    /// Names in `children`, in the order each was first declared — `collect`
    /// walks this instead of `children`'s (unordered) keys so pre-order
    /// enumeration reflects declaration order, not name order.
    child_name_order: Vec<String>,
    child_scopes: Vec<ScopeId>,
}

/// Arena-backed scope tree with efficient lookups.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a table with a single root scope (no `Root` symbol yet — the
    /// first pass declares it into that scope).
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
            symbols: Vec::new(),
        }
    }

    /// The implicit top-level scope every file starts in.
    pub fn root_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a new child scope of `parent`.
    pub fn new_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        self.scopes[parent.0 as usize].child_scopes.push(id);
        id
    }

    fn name_of(kind: &SymbolKind) -> Option<&str> {
        match kind {
            SymbolKind::Root => None,
            SymbolKind::Class { name, .. } => Some(name),
            SymbolKind::Method { name, .. } => Some(name),
            SymbolKind::Variable(v) => Some(&v.name),
            SymbolKind::UserLibraryVariable(v) => Some(&v.name),
            SymbolKind::Literal { .. } => None,
            SymbolKind::Expression { .. } => None,
            SymbolKind::Creator {
                attributed_object_name,
                ..
            } => Some(attributed_object_name),
        }
    }

    /// Declare `kind` as a child of `scope`, keyed under `name`.
    ///
    /// Assigns the next available `identifier` for symbols of the same
    /// name+kind already declared directly in `scope`. Declaring under this
    /// API can never itself produce `DuplicateInScope`, since the identifier
    /// is always freshly allocated; the check exists so callers that supply
    /// an explicit identifier (via [`SymbolTable::declare_with_identifier`])
    /// get the invariant enforced.
    pub fn declare(&mut self, scope: ScopeId, name: impl Into<String>, kind: SymbolKind) -> SymbolId {
        let name = name.into();
        let tag = kind.tag();
        let next_identifier = self
            .scopes[scope.0 as usize]
            .children
            .get(&name)
            .map(|existing| {
                existing
                    .iter()
                    .filter(|id| self.symbols[id.0 as usize].kind.tag() == tag)
                    .count() as u32
            })
            .unwrap_or(0);
        self.declare_with_identifier(scope, name, kind, next_identifier)
            .expect("freshly allocated identifier cannot collide")
    }

    /// Declare `kind` with an explicit `identifier`, failing if a symbol of
    /// the same kind and identifier is already a direct child of `scope`
    /// under `name`.
    pub fn declare_with_identifier(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        kind: SymbolKind,
        identifier: u32,
    ) -> Result<SymbolId, DuplicateInScope> {
        let name = name.into();
        let tag = kind.tag();
        if let Some(existing) = self.scopes[scope.0 as usize].children.get(&name) {
            for existing_id in existing {
                let existing_symbol = &self.symbols[existing_id.0 as usize];
                if existing_symbol.kind.tag() == tag && existing_symbol.identifier == identifier {
                    return Err(DuplicateInScope {
                        scope,
                        name,
                        tag,
                        identifier,
                    });
                }
            }
        }

        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            kind,
            identifier,
            enclosing_scope: scope,
        });
        let scope_data = &mut self.scopes[scope.0 as usize];
        if !scope_data.children.contains_key(&name) {
            scope_data.child_name_order.push(name.clone());
        }
        scope_data.children.entry(name).or_default().push(id);
        Ok(id)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// Children of `scope` named `name` with kind `tag`, in declaration order.
    pub fn lookup_in_scope(&self, scope: ScopeId, name: &str, tag: SymbolKindTag) -> Vec<SymbolId> {
        self.scopes[scope.0 as usize]
            .children
            .get(name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|id| self.symbols[id.0 as usize].kind.tag() == tag)
            .collect()
    }

    /// Walk `scope` and its enclosing scopes outward, returning the first
    /// (lexically nearest) binding found.
    pub fn lookup_upward(&self, scope: ScopeId, name: &str, tag: SymbolKindTag) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(s) = current {
            let matches = self.lookup_in_scope(s, name, tag);
            if let Some(&last) = matches.last() {
                return Some(last);
            }
            current = self.scopes[s.0 as usize].parent;
        }
        None
    }

    /// Pre-order enumeration of every symbol of kind `tag` reachable from
    /// `scope`. When `recursive` is false, only direct children are visited.
    pub fn collect(&self, scope: ScopeId, tag: SymbolKindTag, recursive: bool) -> Vec<SymbolId> {
        let mut out = Vec::new();
        self.collect_into(scope, tag, recursive, &mut out);
        out
    }

    fn collect_into(&self, scope: ScopeId, tag: SymbolKindTag, recursive: bool, out: &mut Vec<SymbolId>) {
        let scope_data = &self.scopes[scope.0 as usize];
        // Pre-order: emit this scope's matching children in declaration
        // order (the order each name was first declared in the scope, then
        // the order symbols of that name were pushed) before descending.
        for name in &scope_data.child_name_order {
            for &id in &scope_data.children[name] {
                if self.symbols[id.0 as usize].kind.tag() == tag {
                    out.push(id);
                }
            }
        }
        if recursive {
            for &child in &scope_data.child_scopes {
                self.collect_into(child, tag, recursive, out);
            }
        }
    }
}
