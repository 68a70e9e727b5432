//! The closed set of Papyrus data types

use std::fmt;

/// A base type plus an array flag. Arrays never nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int,
    Float,
    String,
    /// A script type; a [`Type`](crate::frontend::ast::Type) names which one
    Object,
    BoolArray,
    IntArray,
    FloatArray,
    StringArray,
    ObjectArray,
    /// Return type of functions that declare none. Never written in source.
    Void,
}

impl DataType {
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Self::BoolArray | Self::IntArray | Self::FloatArray | Self::StringArray | Self::ObjectArray
        )
    }

    /// Whether a `Type` of this data type must name a script
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object | Self::ObjectArray)
    }

    /// The array variant of a base type; `None` for arrays and `Void`
    pub fn array_of(&self) -> Option<DataType> {
        match self {
            Self::Bool => Some(Self::BoolArray),
            Self::Int => Some(Self::IntArray),
            Self::Float => Some(Self::FloatArray),
            Self::String => Some(Self::StringArray),
            Self::Object => Some(Self::ObjectArray),
            _ => None,
        }
    }

    /// The element type of an array; base types are their own element
    pub fn element(&self) -> DataType {
        match self {
            Self::BoolArray => Self::Bool,
            Self::IntArray => Self::Int,
            Self::FloatArray => Self::Float,
            Self::StringArray => Self::String,
            Self::ObjectArray => Self::Object,
            other => *other,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.element() {
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::String => "String",
            Self::Object => "Object",
            _ => "None",
        };
        if self.is_array() {
            write!(f, "{}[]", base)
        } else {
            f.write_str(base)
        }
    }
}
