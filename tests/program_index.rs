//! Indexing a small program from disk and re-indexing one changed script

use std::fs;
use std::path::Path;

use papyrus_front::frontend::ast::{Declaration, Identifier, Invokable, NodeId, Script};
use papyrus_front::frontend::module::SourceLoader;
use papyrus_front::frontend::scope::Resolver;
use papyrus_front::frontend::symbol::SymbolKind;
use papyrus_front::frontend::symbol_table::SymbolTable;
use papyrus_front::frontend::walker::{walk, Node, Walker};
use papyrus_front::utils::{Error, ErrorCategory, SourceReference};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const UTILITY: &str = r#"ScriptName Utility Hidden
{Helpers shared by every quest}

Float Function Clamp(Float value, Float low = 0.0, Float high = 1.0) Global
    If value < low
        Return low
    ElseIf value > high
        Return high
    EndIf
    Return value
EndFunction

Function Wait(Float seconds) Global Native
"#;

const QUEST: &str = r#"ScriptName MainQuest extends Quest Conditional
Import Utility

Int Property Stage = 0 Auto Conditional
Float progress

Auto State Waiting
    Event OnUpdate()
        progress = Clamp(progress + 0.1)
        Wait(seconds = 1.0)
    EndEvent
EndState

State Finished
EndState

Function Advance()
    Int[] stages = new Int[10]
    Int i = 0
    While i < stages.Length
        Int next = stages[i]
        i += 1
    EndWhile
EndFunction
"#;

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).expect("write");
}

fn load_all(dir: &Path) -> Vec<Script> {
    let loader = SourceLoader::new();
    SourceLoader::collect(&[dir.to_path_buf()])
        .expect("collect")
        .iter()
        .map(|path| loader.load(path).and_then(|file| file.parse()).expect("parse"))
        .collect()
}

fn ident(name: &str) -> Identifier {
    Identifier::new(name, SourceReference::detached(name))
}

/// Resolves every local variable declaration in the scope it was declared in
struct LocalsResolve<'t> {
    table: &'t SymbolTable,
    scopes: Vec<NodeId>,
    resolved: Vec<String>,
}

impl Walker for LocalsResolve<'_> {
    type Error = Error;

    fn enter(&mut self, node: Node<'_>) -> Result<(), Error> {
        match node {
            Node::Function(f) => self.scopes.push(f.id),
            Node::Event(e) => self.scopes.push(e.id),
            Node::Block(b) => self.scopes.push(b.id),
            Node::Variable(v) => {
                let scope = self.scopes.last().copied().expect("inside a body");
                let symbol = self.table.resolve_in_scope(&scope, &v.name)?;
                assert_eq!(symbol.kind(), SymbolKind::Variable);
                self.resolved.push(symbol.identifier().name().to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn exit(&mut self, node: Node<'_>) -> Result<(), Error> {
        if matches!(node, Node::Function(_) | Node::Event(_) | Node::Block(_)) {
            self.scopes.pop();
        }
        Ok(())
    }
}

fn resolve_from_auto_state_event(table: &SymbolTable, script: &Script, names: &[&str]) -> Result<Vec<SymbolKind>, Error> {
    let state = script
        .declarations
        .iter()
        .find_map(|d| match d {
            Declaration::State(s) if s.is_auto => Some(s),
            _ => None,
        })
        .expect("auto state");
    let event = match &state.invokables[0] {
        Invokable::Event(e) => e,
        other => panic!("expected event, got {:?}", other),
    };
    let program = table.read();
    let resolver = program.resolver(event)?;
    names
        .iter()
        .map(|name| resolver.resolve(&ident(name)).map(|s| s.kind()))
        .collect()
}

#[test]
fn index_program_and_resolve_across_scripts() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "Utility.psc", UTILITY);
    write(dir.path(), "MainQuest.psc", QUEST);

    let scripts = load_all(dir.path());
    assert_eq!(scripts.len(), 2);

    let table = SymbolTable::new();
    for script in &scripts {
        table.upsert(script).expect("upsert");
    }

    let clamp = table.resolve_global(&ident("CLAMP")).expect("clamp");
    assert_eq!(clamp.kind(), SymbolKind::GlobalFunction);
    assert_eq!(table.resolve_global(&ident("mainquest")).map(|s| s.kind()).ok(), Some(SymbolKind::Script));

    let quest = scripts
        .iter()
        .find(|s| s.name().is_equivalent("MainQuest"))
        .expect("quest");
    let mut locals = LocalsResolve {
        table: &table,
        scopes: Vec::new(),
        resolved: Vec::new(),
    };
    walk(quest, &mut locals).expect("walk");
    assert!(locals.scopes.is_empty());
    assert_eq!(locals.resolved, vec!["stages", "i", "next"]);

    let kinds = resolve_from_auto_state_event(
        &table,
        quest,
        &["progress", "Clamp", "wait", "Stage", "Finished", "utility", "OnUpdate"],
    )
    .expect("resolve");
    assert_eq!(
        kinds,
        vec![
            SymbolKind::Variable,
            SymbolKind::GlobalFunction,
            SymbolKind::GlobalFunction,
            SymbolKind::ReadWriteProperty,
            SymbolKind::State,
            SymbolKind::Script,
            SymbolKind::Event,
        ]
    );
    let err = resolve_from_auto_state_event(&table, quest, &["Advance", "nowhere"]).unwrap_err();
    assert!(matches!(err, Error::UnresolvedIdentifier { ref name, .. } if name == "nowhere"));
}

#[test]
fn reindex_changed_script_replaces_exports() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "Utility.psc", UTILITY);
    write(dir.path(), "MainQuest.psc", QUEST);

    let table = SymbolTable::new();
    for script in load_all(dir.path()) {
        table.upsert(&script).expect("upsert");
    }
    let before = table.read().global().len();

    write(
        dir.path(),
        "Utility.psc",
        "ScriptName Utility\nFloat Function Lerp(Float a, Float b, Float t) Global\n    Return a + (b - a) * t\nEndFunction\n",
    );
    let loader = SourceLoader::with_search_paths([dir.path().to_path_buf()]);
    let path = loader.find_script("utility").expect("utility");
    let changed = loader.load(&path).and_then(|f| f.parse()).expect("parse");
    table.upsert(&changed).expect("reindex");

    assert_eq!(table.read().global().len(), before - 1);
    assert!(table.resolve_global(&ident("Lerp")).is_ok());
    for stale in ["Clamp", "Wait"] {
        let err = table.resolve_global(&ident(stale)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnresolvedIdentifier);
    }
    assert_eq!(table.read().scripts().len(), 2);
}

#[test]
fn colliding_script_is_rejected_without_side_effects() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "Utility.psc", UTILITY);
    write(
        dir.path(),
        "Other.psc",
        "ScriptName Other\nFunction clamp() Global\nEndFunction\nFunction Fresh() Global\nEndFunction\n",
    );

    let table = SymbolTable::new();
    let mut errors = Vec::new();
    for script in load_all(dir.path()) {
        if let Err(e) = table.upsert(&script) {
            errors.push(e);
        }
    }

    // Other.psc sorts first, so Utility is the one rejected
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].category(), ErrorCategory::GlobalNameCollision);
    assert!(table.resolve_global(&ident("Fresh")).is_ok());
    assert!(table.resolve_global(&ident("Utility")).is_err());
    assert!(table.resolve_global(&ident("Wait")).is_err());
}
