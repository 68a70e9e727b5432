//! Symbols
//!
//! A symbol names something a script defines: the script itself, a state,
//! an invokable, a property or a variable.

use serde::Serialize;

use crate::frontend::ast::{Function, Identifier, Property, PropertyKind, Type};
use crate::types::DataType;
use crate::utils::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Script,
    State,
    Event,
    Function,
    GlobalFunction,
    ReadOnlyProperty,
    WriteOnlyProperty,
    ReadWriteProperty,
    Variable,
}

impl SymbolKind {
    /// Script, State and Event symbols carry no data type
    pub fn has_data_type(&self) -> bool {
        !matches!(self, SymbolKind::Script | SymbolKind::State | SymbolKind::Event)
    }

    pub fn is_property(&self) -> bool {
        matches!(
            self,
            SymbolKind::ReadOnlyProperty | SymbolKind::WriteOnlyProperty | SymbolKind::ReadWriteProperty
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    kind: SymbolKind,
    identifier: Identifier,
    data_type: Option<DataType>,
}

impl Symbol {
    fn typed(kind: SymbolKind, identifier: Identifier, data_type: DataType) -> Self {
        Self {
            kind,
            identifier,
            data_type: Some(data_type),
        }
    }

    fn untyped(kind: SymbolKind, identifier: Identifier) -> Self {
        Self {
            kind,
            identifier,
            data_type: None,
        }
    }

    pub fn script(identifier: Identifier) -> Self {
        Self::untyped(SymbolKind::Script, identifier)
    }

    pub fn state(identifier: Identifier) -> Self {
        Self::untyped(SymbolKind::State, identifier)
    }

    pub fn event(identifier: Identifier) -> Self {
        Self::untyped(SymbolKind::Event, identifier)
    }

    pub fn variable(identifier: Identifier, ty: &Type) -> Self {
        Self::typed(SymbolKind::Variable, identifier, ty.data_type())
    }

    /// A `Global` function becomes a [`SymbolKind::GlobalFunction`]; a
    /// function without a return type has type [`DataType::Void`].
    pub fn function(function: &Function) -> Self {
        let kind = if function.is_global {
            SymbolKind::GlobalFunction
        } else {
            SymbolKind::Function
        };
        let data_type = function
            .return_type
            .as_ref()
            .map_or(DataType::Void, Type::data_type);
        Self::typed(kind, function.name.clone(), data_type)
    }

    /// Readability follows the property mode and which accessors exist
    pub fn property(property: &Property) -> Self {
        let kind = match &property.kind {
            PropertyKind::Auto { .. } => SymbolKind::ReadWriteProperty,
            PropertyKind::AutoReadOnly { .. } => SymbolKind::ReadOnlyProperty,
            PropertyKind::Full { get, set } => match (get.is_some(), set.is_some()) {
                (true, true) => SymbolKind::ReadWriteProperty,
                (false, true) => SymbolKind::WriteOnlyProperty,
                _ => SymbolKind::ReadOnlyProperty,
            },
        };
        Self::typed(kind, property.name.clone(), property.ty.data_type())
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Case-insensitive lookup key
    pub fn key(&self) -> String {
        self.identifier.key()
    }

    pub fn data_type(&self) -> Result<DataType> {
        self.data_type
            .ok_or(Error::MissingDataType { kind: self.kind })
    }
}
