//! Lexical scopes
//!
//! `ScopeBuilder` is a [`Walker`] that mirrors the AST structure into an
//! arena of [`Scope`]s: scripts, states, invokables and blocks each open
//! one, while declarations insert symbols into the innermost open scope.
//! The builder is private: [`ScriptScopes::build`] is the only way to get
//! scopes, and it hands them out only after a complete walk.

use std::collections::HashMap;

use indexmap::map::Entry;
use indexmap::IndexMap;
use log::trace;

use crate::frontend::ast::{Identifier, NodeId, Script, Scoped};
use crate::frontend::symbol::{Symbol, SymbolKind};
use crate::frontend::walker::{walk, Node, Walker};
use crate::utils::{Error, Result};

/// Anything identifiers can be resolved against
pub trait Resolver {
    fn resolve(&self, identifier: &Identifier) -> Result<Symbol>;
}

/// Index of a scope within its [`ScriptScopes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Script,
    State,
    Function,
    Event,
    AnonymousBlock,
}

#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    /// `None` for a script scope, whose parent is the global scope
    parent: Option<ScopeId>,
    symbol: Option<Symbol>,
    symbols: IndexMap<String, Symbol>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, symbol: Option<Symbol>) -> Self {
        Self {
            kind,
            parent,
            symbol,
            symbols: IndexMap::new(),
        }
    }

    fn insert(&mut self, symbol: Symbol) -> Result<()> {
        match self.symbols.entry(symbol.key()) {
            Entry::Occupied(existing) => Err(Error::DefinitionCollision {
                name: symbol.identifier().name().to_string(),
                reference: symbol.identifier().source().clone(),
                original: existing.get().identifier().source().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(symbol);
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// The symbol naming this scope; blocks and property accessors have none
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Local symbols in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn lookup(&self, identifier: &Identifier) -> Option<&Symbol> {
        self.symbols.get(&identifier.key())
    }
}

/// Builds the scopes of one script during a walk
struct ScopeBuilder {
    script: Symbol,
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
    by_node: HashMap<NodeId, ScopeId>,
    in_property: bool,
}

impl ScopeBuilder {
    /// Opens the script scope; its parent is the global scope
    fn new(script: &Script) -> Self {
        let symbol = Symbol::script(script.name().clone());
        let root = Scope::new(ScopeKind::Script, None, Some(symbol.clone()));
        Self {
            script: symbol,
            scopes: vec![root],
            stack: Vec::new(),
            by_node: HashMap::from([(script.node_id(), ScopeId(0))]),
            in_property: false,
        }
    }

    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }

    fn insert(&mut self, symbol: Symbol) -> Result<()> {
        trace!("insert {:?} {}", symbol.kind(), symbol.identifier());
        let current = self.current();
        self.scopes[current.0].insert(symbol)
    }

    fn push(&mut self, node: &impl Scoped, kind: ScopeKind, symbol: Option<Symbol>) {
        let id = ScopeId(self.scopes.len());
        let parent = Some(self.current());
        trace!("open {:?} scope {:?} for {}", kind, id, node.node_id());
        self.scopes.push(Scope::new(kind, parent, symbol));
        self.by_node.insert(node.node_id(), id);
        self.stack.push(id);
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn finish(self) -> ScriptScopes {
        ScriptScopes {
            script: self.script,
            scopes: self.scopes,
            by_node: self.by_node,
        }
    }
}

impl Walker for ScopeBuilder {
    type Error = Error;

    fn enter(&mut self, node: Node<'_>) -> Result<()> {
        match node {
            Node::Import(import) => self.insert(Symbol::script(import.script.clone()))?,
            Node::ScriptVariable(variable) => {
                self.insert(Symbol::variable(variable.name.clone(), &variable.ty))?
            }
            Node::Property(property) => {
                self.insert(Symbol::property(property))?;
                self.in_property = true;
            }
            Node::State(state) => {
                let symbol = Symbol::state(state.name.clone());
                self.insert(symbol.clone())?;
                self.push(state, ScopeKind::State, Some(symbol));
            }
            Node::Function(function) if self.in_property => {
                self.push(function, ScopeKind::Function, None);
            }
            Node::Function(function) => {
                let symbol = Symbol::function(function);
                self.insert(symbol.clone())?;
                self.push(function, ScopeKind::Function, Some(symbol));
            }
            Node::Event(event) => {
                let symbol = Symbol::event(event.name.clone());
                self.insert(symbol.clone())?;
                self.push(event, ScopeKind::Event, Some(symbol));
            }
            Node::Parameter(parameter) => {
                self.insert(Symbol::variable(parameter.name.clone(), &parameter.ty))?
            }
            Node::Block(block) => self.push(block, ScopeKind::AnonymousBlock, None),
            Node::Variable(variable) => {
                self.insert(Symbol::variable(variable.name.clone(), &variable.ty))?
            }
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, node: Node<'_>) -> Result<()> {
        match node {
            Node::State(_) | Node::Function(_) | Node::Event(_) | Node::Block(_) => self.pop(),
            Node::Property(_) => self.in_property = false,
            _ => {}
        }
        Ok(())
    }
}

/// The completed, read-only scopes of one script
#[derive(Debug, Clone)]
pub struct ScriptScopes {
    script: Symbol,
    scopes: Vec<Scope>,
    by_node: HashMap<NodeId, ScopeId>,
}

impl ScriptScopes {
    /// Walk `script` and collect its scopes
    pub fn build(script: &Script) -> Result<Self> {
        let mut builder = ScopeBuilder::new(script);
        walk(script, &mut builder)?;
        Ok(builder.finish())
    }

    pub fn script_symbol(&self) -> &Symbol {
        &self.script
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }

    /// The scope recorded for a scope-introducing node
    pub fn scope_for(&self, node: NodeId) -> Option<ScopeId> {
        self.by_node.get(&node).copied()
    }

    /// Every node that introduced a scope in this script
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_node.keys().copied()
    }

    /// Search `scope` and its ancestors, stopping before the global scope
    pub fn lookup(&self, scope: ScopeId, identifier: &Identifier) -> Option<&Symbol> {
        let mut current = self.scope(scope);
        while let Some(scope) = current {
            if let Some(symbol) = scope.lookup(identifier) {
                return Some(symbol);
            }
            current = scope.parent.and_then(|parent| self.scope(parent));
        }
        None
    }

    /// Resolve through the scope chain, then `global`
    pub fn resolve(&self, scope: ScopeId, identifier: &Identifier, global: &dyn Resolver) -> Result<Symbol> {
        match self.lookup(scope, identifier) {
            Some(symbol) => Ok(symbol.clone()),
            None => global.resolve(identifier),
        }
    }

    /// Symbols this script contributes to the global scope besides itself
    pub fn exports(&self) -> Vec<Symbol> {
        self.scope(self.root())
            .map(|root| {
                root.symbols()
                    .filter(|s| s.kind() == SymbolKind::GlobalFunction)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A resolver bound to one scope of this script
    pub fn view<'a>(&'a self, scope: ScopeId, global: &'a dyn Resolver) -> ScopeView<'a> {
        ScopeView {
            scopes: self,
            scope,
            global,
        }
    }
}

pub struct ScopeView<'a> {
    scopes: &'a ScriptScopes,
    scope: ScopeId,
    global: &'a dyn Resolver,
}

impl Resolver for ScopeView<'_> {
    fn resolve(&self, identifier: &Identifier) -> Result<Symbol> {
        self.scopes.resolve(self.scope, identifier, self.global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Declaration, Function, Statement};
    use crate::frontend::parse_script;
    use crate::frontend::symbol_table::GlobalScope;
    use crate::types::DataType;
    use crate::utils::{ErrorCategory, SourceReference};
    use pretty_assertions::assert_eq;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, SourceReference::detached(name))
    }

    fn function(script: &Script, index: usize) -> &Function {
        match &script.declarations[index] {
            Declaration::Function(f) => f,
            other => panic!("expected function, got {:?}", other),
        }
    }

    fn build(source: &str) -> (Script, ScriptScopes) {
        let script = parse_script(source).expect("parse");
        let scopes = ScriptScopes::build(&script).expect("scopes");
        (script, scopes)
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let (script, scopes) = build("ScriptName Foo\nInt counter\n");
        let root = scopes.scope_for(script.id).expect("script scope");
        let symbol = scopes.lookup(root, &ident("COUNTER")).expect("resolved");
        assert_eq!(symbol.identifier().name(), "counter");
        assert_eq!(symbol.kind(), SymbolKind::Variable);
    }

    #[test]
    fn test_scopes_are_complete_once_built() {
        let (script, scopes) = build(
            "ScriptName Foo\nInt counter\nFunction F()\n  Int inner\nEndFunction\nFloat late\n",
        );
        let root = scopes.root();
        assert_eq!(scopes.scope_for(script.id), Some(root));
        for name in ["counter", "F", "late"] {
            assert!(scopes.lookup(root, &ident(name)).is_some(), "{} missing", name);
        }
        let f = scopes.scope_for(function(&script, 1).id).expect("function scope");
        assert!(scopes.lookup(f, &ident("inner")).is_some());
        assert!(scopes.lookup(root, &ident("inner")).is_none());
    }

    #[test]
    fn test_interrupted_build_yields_no_scopes() {
        let script = parse_script("ScriptName Foo\nInt counter\nInt COUNTER\nFloat late\n").expect("parse");
        let err = ScriptScopes::build(&script).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::DefinitionCollision);
    }

    #[test]
    fn test_shadowing_in_block() {
        let (script, scopes) = build(
            "ScriptName Foo\nFunction F(Int a)\n  If true\n    Float a = 1.0\n  EndIf\nEndFunction\n",
        );
        let f = function(&script, 0);
        let block = match &f.body.as_ref().expect("body")[0] {
            Statement::If(i) => &i.branches[0].block,
            other => panic!("expected if, got {:?}", other),
        };
        let inner = scopes.scope_for(block.id).expect("block scope");
        let outer = scopes.scope_for(f.id).expect("function scope");
        let global = GlobalScope::default();

        let shadowed = scopes.resolve(inner, &ident("a"), &global).expect("inner");
        assert_eq!(shadowed.data_type().ok(), Some(DataType::Float));
        let parameter = scopes.resolve(outer, &ident("A"), &global).expect("outer");
        assert_eq!(parameter.data_type().ok(), Some(DataType::Int));
    }

    #[test]
    fn test_chain_fallback_to_ancestor() {
        let (script, scopes) = build(
            "ScriptName Foo\nInt total\nState Busy\n  Event OnUpdate()\n    While total\n    EndWhile\n  EndEvent\nEndState\n",
        );
        let state = match &script.declarations[1] {
            Declaration::State(s) => s,
            other => panic!("expected state, got {:?}", other),
        };
        let event = match &state.invokables[0] {
            crate::frontend::ast::Invokable::Event(e) => e,
            other => panic!("expected event, got {:?}", other),
        };
        let event_scope = scopes.scope_for(event.id).expect("event scope");
        let symbol = scopes.lookup(event_scope, &ident("Total")).expect("resolved");
        assert_eq!(symbol.identifier().name(), "total");

        let state_scope = scopes.scope_for(state.id).expect("state scope");
        assert_eq!(scopes.scope(event_scope).and_then(Scope::parent), Some(state_scope));
        assert_eq!(scopes.scope(state_scope).and_then(Scope::parent), Some(scopes.root()));
        assert_eq!(scopes.scope(scopes.root()).and_then(Scope::parent), None);
    }

    #[test]
    fn test_duplicate_definition_rejected_in_either_order() {
        for source in [
            "ScriptName Foo\nInt value\nFloat VALUE\n",
            "ScriptName Foo\nFloat VALUE\nInt value\n",
        ] {
            let script = parse_script(source).expect("parse");
            let err = ScriptScopes::build(&script).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::DefinitionCollision);
            assert_eq!(err.location().map(|(line, _)| line), Some(3));
            assert_eq!(err.original().map(SourceReference::line), Some(2));
        }
    }

    #[test]
    fn test_parameter_collides_with_local() {
        let script = parse_script("ScriptName Foo\nFunction F(Int a)\n  Int a\nEndFunction\n").expect("parse");
        let err = ScriptScopes::build(&script).unwrap_err();
        assert!(matches!(err, Error::DefinitionCollision { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_state_may_redefine_script_function() {
        let (script, scopes) = build(
            "ScriptName Foo\nFunction Go()\nEndFunction\nState Busy\n  Function Go()\n  EndFunction\nEndState\n",
        );
        let root = scopes.root();
        let names: Vec<&str> = scopes
            .scope(root)
            .map(|s| s.symbols().map(|sym| sym.identifier().name()).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Go", "Busy"]);
        assert!(scopes.scope_for(function(&script, 0).id).is_some());
    }

    #[test]
    fn test_accessors_get_unnamed_function_scopes() {
        let (script, scopes) = build(
            "ScriptName Foo\nInt Property P\n  Int Function Get()\n    Return 1\n  EndFunction\n  Function Set(Int value)\n  EndFunction\nEndProperty\n",
        );
        let property = match &script.declarations[0] {
            Declaration::Property(p) => p,
            other => panic!("expected property, got {:?}", other),
        };
        let set = property.set_function().expect("set");
        let set_scope = scopes.scope_for(set.id).expect("accessor scope");
        let scope = scopes.scope(set_scope).expect("scope");
        assert_eq!(scope.kind(), ScopeKind::Function);
        assert!(scope.symbol().is_none());
        assert_eq!(scope.parent(), Some(scopes.root()));

        let root_names: Vec<String> = scopes
            .scope(scopes.root())
            .map(|s| s.symbols().map(Symbol::key).collect())
            .unwrap_or_default();
        assert_eq!(root_names, vec!["P".to_string()]);
        assert!(scopes.lookup(set_scope, &ident("value")).is_some());
    }

    #[test]
    fn test_unresolved_reports_reference_location() {
        let (script, scopes) = build("ScriptName Foo\nFunction F()\nEndFunction\n");
        let scope = scopes.scope_for(function(&script, 0).id).expect("scope");
        let missing = Identifier::new(
            "ghost",
            SourceReference::new(std::sync::Arc::from("x\n  ghost"), crate::utils::Span::new(4, 9, 2, 3)),
        );
        let err = scopes.resolve(scope, &missing, &GlobalScope::default()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnresolvedIdentifier);
        assert_eq!(err.location(), Some((2, 3)));
    }

    #[test]
    fn test_exports_and_imports() {
        let (_, scopes) = build(
            "ScriptName Foo\nImport Utility\nInt Function Sum() Global\nEndFunction\nFunction Local()\nEndFunction\n",
        );
        let exports: Vec<String> = scopes.exports().iter().map(Symbol::key).collect();
        assert_eq!(exports, vec!["SUM".to_string()]);
        let import = scopes.lookup(scopes.root(), &ident("utility")).expect("import");
        assert_eq!(import.kind(), SymbolKind::Script);
        assert_eq!(scopes.script_symbol().identifier().name(), "Foo");
    }
}
