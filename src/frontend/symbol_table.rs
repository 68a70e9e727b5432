//! Program-wide symbol table
//!
//! [`SymbolTable`] indexes every script of a program: each script's scopes,
//! plus one flat [`GlobalScope`] holding script names and `Global` functions.
//! Re-indexing a script replaces everything it contributed before, so a
//! single changed file can be reprocessed without touching the rest.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

use crate::frontend::ast::{Identifier, NodeId, Script, Scoped};
use crate::frontend::scope::{Resolver, ScopeView, ScriptScopes};
use crate::frontend::symbol::{Symbol, SymbolKind};
use crate::utils::{Error, Result};

// ==================== Global Scope ====================

/// Flat, case-insensitive namespace shared by all scripts
#[derive(Debug, Default, Clone)]
pub struct GlobalScope {
    symbols: HashMap<String, Symbol>,
    /// Global function key to the key of the script exporting it
    owners: HashMap<String, String>,
}

impl GlobalScope {
    /// Replace whatever `script` exported before with `exports`.
    /// On a collision nothing is changed.
    pub fn upsert(&mut self, script: &Symbol, exports: &[Symbol]) -> Result<()> {
        let script_key = script.key();

        if let Some(owner) = self.owners.get(&script_key) {
            if *owner != script_key {
                return Err(self.collision(script, owner));
            }
        }

        for export in exports {
            let key = export.key();
            if key == script_key {
                return Err(Error::GlobalNameCollision {
                    name: export.identifier().name().to_string(),
                    owner: script.identifier().name().to_string(),
                    reference: export.identifier().source().clone(),
                    original: script.identifier().source().clone(),
                });
            }
            match self.owners.get(&key) {
                Some(owner) if *owner == script_key => {}
                Some(owner) => return Err(self.collision(export, owner)),
                None if self.symbols.contains_key(&key) => return Err(self.collision(export, &key)),
                None => {}
            }
        }

        self.remove(&script_key);
        for export in exports {
            trace!("export {} from {}", export.identifier(), script.identifier());
            self.owners.insert(export.key(), script_key.clone());
            self.symbols.insert(export.key(), export.clone());
        }
        self.symbols.insert(script_key, script.clone());
        Ok(())
    }

    /// Drop a script and its exports. Returns whether it was present.
    pub fn remove(&mut self, script_key: &str) -> bool {
        let present = matches!(
            self.symbols.get(script_key),
            Some(symbol) if symbol.kind() == SymbolKind::Script
        );
        if present {
            self.symbols.remove(script_key);
        }

        let stale: Vec<String> = self
            .owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == script_key)
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            self.owners.remove(&key);
            self.symbols.remove(&key);
        }
        present
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&Symbol> {
        self.symbols.get(&identifier.key())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols, ordered by key
    pub fn symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.symbols.values().collect();
        symbols.sort_by_key(|s| s.key());
        symbols
    }

    /// `incoming` clashes with the symbol stored under `owner_key`'s script
    fn collision(&self, incoming: &Symbol, owner_key: &str) -> Error {
        let existing = self.symbols.get(&incoming.key()).or_else(|| self.symbols.get(owner_key));
        let owner = self
            .symbols
            .get(owner_key)
            .map_or(owner_key.to_string(), |s| s.identifier().name().to_string());
        Error::GlobalNameCollision {
            name: incoming.identifier().name().to_string(),
            owner,
            reference: incoming.identifier().source().clone(),
            original: existing
                .map_or_else(|| incoming.identifier().source().clone(), |s| s.identifier().source().clone()),
        }
    }
}

impl Resolver for GlobalScope {
    fn resolve(&self, identifier: &Identifier) -> Result<Symbol> {
        self.get(identifier).cloned().ok_or_else(|| Error::UnresolvedIdentifier {
            name: identifier.name().to_string(),
            reference: identifier.source().clone(),
        })
    }
}

// ==================== Program Index ====================

/// Everything indexed so far, as seen under one lock
#[derive(Debug, Default)]
pub struct ProgramIndex {
    global: GlobalScope,
    scripts: HashMap<String, ScriptScopes>,
    /// Scope-introducing node to the key of its script
    nodes: HashMap<NodeId, String>,
}

impl ProgramIndex {
    pub fn global(&self) -> &GlobalScope {
        &self.global
    }

    pub fn script(&self, name: &Identifier) -> Option<&ScriptScopes> {
        self.scripts.get(&name.key())
    }

    /// Indexed scripts, ordered by key
    pub fn scripts(&self) -> Vec<&ScriptScopes> {
        let mut scripts: Vec<&ScriptScopes> = self.scripts.values().collect();
        scripts.sort_by_key(|s| s.script_symbol().key());
        scripts
    }

    /// A resolver for the scope `node` introduced
    pub fn resolver<N: Scoped + ?Sized>(&self, node: &N) -> Result<ScopeView<'_>> {
        let id = node.node_id();
        let unindexed = || Error::UnindexedConstruct { node: id };
        let scopes = self
            .nodes
            .get(&id)
            .and_then(|key| self.scripts.get(key))
            .ok_or_else(unindexed)?;
        let scope = scopes.scope_for(id).ok_or_else(unindexed)?;
        Ok(scopes.view(scope, &self.global))
    }

    pub fn resolve_in_scope<N: Scoped + ?Sized>(&self, node: &N, identifier: &Identifier) -> Result<Symbol> {
        self.resolver(node)?.resolve(identifier)
    }

    pub fn resolve_global(&self, identifier: &Identifier) -> Result<Symbol> {
        self.global.resolve(identifier)
    }

    fn upsert(&mut self, scopes: ScriptScopes) -> Result<()> {
        let script = scopes.script_symbol().clone();
        self.global.upsert(&script, &scopes.exports())?;

        let key = script.key();
        self.nodes.retain(|_, owner| *owner != key);
        self.nodes.extend(scopes.nodes().map(|node| (node, key.clone())));
        self.scripts.insert(key, scopes);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> bool {
        let removed = self.global.remove(key);
        self.nodes.retain(|_, owner| owner.as_str() != key);
        self.scripts.remove(key).is_some() || removed
    }
}

// ==================== Symbol Table ====================

/// Thread-safe program index. Each operation takes the lock once, so
/// readers never observe a script half replaced.
#[derive(Debug, Default)]
pub struct SymbolTable {
    index: RwLock<ProgramIndex>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `script`, replacing any earlier version of it
    pub fn upsert(&self, script: &Script) -> Result<()> {
        let scopes = ScriptScopes::build(script)?;
        debug!(
            "Indexing script {} ({} global exports)",
            script.name(),
            scopes.exports().len()
        );
        self.write().upsert(scopes)
    }

    /// Forget a script. Returns `false` if it was never indexed.
    pub fn remove(&self, name: &Identifier) -> bool {
        let removed = self.write().remove(&name.key());
        debug!("Removing script {}: {}", name, if removed { "done" } else { "not indexed" });
        removed
    }

    pub fn resolve_in_scope<N: Scoped + ?Sized>(&self, node: &N, identifier: &Identifier) -> Result<Symbol> {
        self.read().resolve_in_scope(node, identifier)
    }

    pub fn resolve_global(&self, identifier: &Identifier) -> Result<Symbol> {
        self.read().resolve_global(identifier)
    }

    /// Hold the index for several consistent lookups
    pub fn read(&self) -> RwLockReadGuard<'_, ProgramIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ProgramIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Declaration, Function};
    use crate::frontend::parse_script;
    use crate::types::DataType;
    use crate::utils::{ErrorCategory, SourceReference};
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, SourceReference::detached(name))
    }

    fn script(source: &str) -> Script {
        parse_script(source).expect("parse")
    }

    fn function(script: &Script, index: usize) -> &Function {
        match &script.declarations[index] {
            Declaration::Function(f) => f,
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn global_keys(table: &SymbolTable) -> Vec<String> {
        table.read().global().symbols().iter().map(|s| s.key()).collect()
    }

    #[test]
    fn test_global_function_resolves_case_insensitively() {
        let table = SymbolTable::new();
        table
            .upsert(&script("ScriptName Foo\nInt Function Bar() Global\nEndFunction\n"))
            .expect("upsert");

        let bar = table.resolve_global(&ident("bar")).expect("bar");
        assert_eq!(bar.kind(), SymbolKind::GlobalFunction);
        assert_eq!(bar.identifier().name(), "Bar");
        assert_eq!(bar.data_type().ok(), Some(DataType::Int));

        let foo = table.resolve_global(&ident("FOO")).expect("foo");
        assert_eq!(foo.kind(), SymbolKind::Script);
    }

    #[test]
    fn test_collision_across_scripts() {
        let table = SymbolTable::new();
        table
            .upsert(&script("ScriptName Foo\nFunction Bar() Global\nEndFunction\n"))
            .expect("upsert");
        let err = table
            .upsert(&script("ScriptName Baz\nFunction bar() Global\nEndFunction\n"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::GlobalNameCollision);
        match &err {
            Error::GlobalNameCollision { name, owner, .. } => {
                assert_eq!(name, "bar");
                assert_eq!(owner, "Foo");
            }
            other => panic!("expected GlobalNameCollision, got {:?}", other),
        }
        assert_eq!(err.location(), Some((2, 10)));

        // the failed upsert changed nothing
        assert_eq!(global_keys(&table), vec!["BAR", "FOO"]);
        assert!(table.resolve_global(&ident("Baz")).is_err());
    }

    #[test]
    fn test_function_may_not_shadow_script_name() {
        let table = SymbolTable::new();
        let err = table
            .upsert(&script("ScriptName Foo\nFunction Foo() Global\nEndFunction\n"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::GlobalNameCollision);

        table
            .upsert(&script("ScriptName Utility\nFunction Wait() Global\nEndFunction\n"))
            .expect("upsert");
        let err = table.upsert(&script("ScriptName Wait\n")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::GlobalNameCollision);
        let err = table
            .upsert(&script("ScriptName Other\nFunction Utility() Global\nEndFunction\n"))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::GlobalNameCollision);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let table = SymbolTable::new();
        let foo = script("ScriptName Foo\nFunction Bar() Global\nEndFunction\n");
        table.upsert(&foo).expect("first");
        let before = global_keys(&table);
        table.upsert(&foo).expect("second");
        assert_eq!(global_keys(&table), before);
    }

    #[test]
    fn test_incremental_replace() {
        let table = SymbolTable::new();
        table
            .upsert(&script(
                "ScriptName Foo\nFunction Old() Global\nEndFunction\nFunction Kept() Global\nEndFunction\n",
            ))
            .expect("first");
        table
            .upsert(&script(
                "ScriptName foo\nFunction Kept() Global\nEndFunction\nFunction New() Global\nEndFunction\n",
            ))
            .expect("second");

        assert_eq!(global_keys(&table), vec!["FOO", "KEPT", "NEW"]);
        assert!(table.resolve_global(&ident("Old")).is_err());
        assert_eq!(table.read().scripts().len(), 1);
    }

    #[test]
    fn test_replaced_export_frees_name_for_other_scripts() {
        let table = SymbolTable::new();
        table
            .upsert(&script("ScriptName Foo\nFunction Shared() Global\nEndFunction\n"))
            .expect("foo");
        table.upsert(&script("ScriptName Foo\n")).expect("foo again");
        table
            .upsert(&script("ScriptName Bar\nFunction Shared() Global\nEndFunction\n"))
            .expect("bar");
        let owner = table.resolve_global(&ident("shared")).expect("shared");
        assert_eq!(owner.kind(), SymbolKind::GlobalFunction);
    }

    #[test]
    fn test_remove() {
        let table = SymbolTable::new();
        let foo = script("ScriptName Foo\nFunction Bar() Global\nEndFunction\n");
        table.upsert(&foo).expect("upsert");

        assert!(table.remove(&ident("FOO")));
        assert!(table.read().global().is_empty());
        assert!(!table.remove(&ident("Foo")));

        let err = table.resolve_in_scope(function(&foo, 0), &ident("x")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Contract);
    }

    #[test]
    fn test_resolve_in_scope() {
        let table = SymbolTable::new();
        table
            .upsert(&script("ScriptName Util\nFunction Log() Global\nEndFunction\n"))
            .expect("util");
        let main = script("ScriptName Main\nImport Util\nInt counter\nFunction Tick(Int step)\nEndFunction\n");
        table.upsert(&main).expect("main");

        let tick = function(&main, 2);
        let resolved = |name: &str| table.resolve_in_scope(tick, &ident(name)).map(|s| s.kind());
        assert_eq!(resolved("STEP").ok(), Some(SymbolKind::Variable));
        assert_eq!(resolved("Counter").ok(), Some(SymbolKind::Variable));
        assert_eq!(resolved("tick").ok(), Some(SymbolKind::Function));
        assert_eq!(resolved("log").ok(), Some(SymbolKind::GlobalFunction));
        assert_eq!(resolved("main").ok(), Some(SymbolKind::Script));
        let err = table.resolve_in_scope(tick, &ident("missing")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnresolvedIdentifier);
    }

    #[test]
    fn test_unindexed_and_stale_nodes() {
        let table = SymbolTable::new();
        let first = script("ScriptName Foo\nFunction Go()\nEndFunction\n");
        let err = table.resolve_in_scope(&first, &ident("Go")).unwrap_err();
        assert!(matches!(err, Error::UnindexedConstruct { node } if node == first.id));

        table.upsert(&first).expect("first");
        assert!(table.resolve_in_scope(&first, &ident("go")).is_ok());

        let second = script("ScriptName Foo\nFunction Go()\nEndFunction\n");
        table.upsert(&second).expect("second");
        assert!(table.resolve_in_scope(&first, &ident("go")).is_err());
        assert!(table.resolve_in_scope(&second, &ident("go")).is_ok());
    }

    #[test]
    fn test_readers_see_whole_scripts() {
        let table = SymbolTable::new();
        let versions = [
            script("ScriptName Foo\nFunction A() Global\nEndFunction\n"),
            script("ScriptName Foo\nFunction B() Global\nEndFunction\n"),
        ];
        table.upsert(&versions[0]).expect("seed");

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200 {
                    table.upsert(&versions[i % 2]).expect("upsert");
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let index = table.read();
                        assert_eq!(index.global().len(), 2);
                        assert!(index.resolve_global(&ident("Foo")).is_ok());
                    }
                });
            }
        });
    }
}
