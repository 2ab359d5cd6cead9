//! Typed values flowing between nodes.
//!
//! A [`Value`] is either a literal known while the graph is being built or a
//! reference to an output pin of an already registered node. The declared
//! [`ValueType`] always agrees with the literal shape; this is checked when the
//! value is constructed.

use crate::{
    error::{CompileError, ErrorKind, Result},
    model::NodeId,
};
use serde::Serialize;
use std::{fmt, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarType {
    Bool,
    Int,
    Float,
    Str,
    Vec3,
    Guid,
    Entity,
    Faction,
    ConfigId,
    PrefabId,
    Struct,
    Dict,
    Enumeration,
    Generic,
}

impl ScalarType {
    pub const ALL: [ScalarType; 14] = [
        ScalarType::Bool,
        ScalarType::Int,
        ScalarType::Float,
        ScalarType::Str,
        ScalarType::Vec3,
        ScalarType::Guid,
        ScalarType::Entity,
        ScalarType::Faction,
        ScalarType::ConfigId,
        ScalarType::PrefabId,
        ScalarType::Struct,
        ScalarType::Dict,
        ScalarType::Enumeration,
        ScalarType::Generic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Str => "str",
            ScalarType::Vec3 => "vec3",
            ScalarType::Guid => "guid",
            ScalarType::Entity => "entity",
            ScalarType::Faction => "faction",
            ScalarType::ConfigId => "config_id",
            ScalarType::PrefabId => "prefab_id",
            ScalarType::Struct => "struct",
            ScalarType::Dict => "dict",
            ScalarType::Enumeration => "enum",
            ScalarType::Generic => "generic",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ScalarType::Int | ScalarType::Float)
    }

    /// Whether a value of this type may be written inline as a literal.
    pub fn accepts_literal(self) -> bool {
        !matches!(
            self,
            ScalarType::Entity | ScalarType::Struct | ScalarType::Dict | ScalarType::Generic
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum ValueType {
    Scalar(ScalarType),
    List(ScalarType),
    LocalVariable,
    CustomVariableSnapshot,
}

impl ValueType {
    pub const BOOL: ValueType = ValueType::Scalar(ScalarType::Bool);
    pub const INT: ValueType = ValueType::Scalar(ScalarType::Int);
    pub const FLOAT: ValueType = ValueType::Scalar(ScalarType::Float);
    pub const STR: ValueType = ValueType::Scalar(ScalarType::Str);

    pub fn is_list(self) -> bool {
        matches!(self, ValueType::List(_))
    }

    pub fn element_type(self) -> Option<ValueType> {
        match self {
            ValueType::List(elem) => Some(ValueType::Scalar(elem)),
            _ => None,
        }
    }

    pub fn list_of(self) -> Option<ValueType> {
        match self {
            ValueType::Scalar(elem) => Some(ValueType::List(elem)),
            _ => None,
        }
    }

    fn scalar(self) -> Option<ScalarType> {
        match self {
            ValueType::Scalar(s) | ValueType::List(s) => Some(s),
            _ => None,
        }
    }

    /// Suggests the type the author most likely meant when `self` was
    /// requested but `found` was supplied.
    pub fn suggest(self, found: ValueType) -> Option<String> {
        let related = match (self.scalar(), found.scalar()) {
            (Some(a), Some(b)) => a == b || (a.is_numeric() && b.is_numeric()),
            _ => false,
        };
        related.then(|| format!("did you mean `{found}`?"))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Scalar(s) => f.write_str(s.name()),
            ValueType::List(s) => write!(f, "{}_list", s.name()),
            ValueType::LocalVariable => f.write_str("local_variable"),
            ValueType::CustomVariableSnapshot => f.write_str("custom_variable_snapshot"),
        }
    }
}

impl From<ValueType> for String {
    fn from(ty: ValueType) -> Self {
        ty.to_string()
    }
}

impl FromStr for ValueType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "local_variable" => return Ok(ValueType::LocalVariable),
            "custom_variable_snapshot" => return Ok(ValueType::CustomVariableSnapshot),
            "enumeration" => return Ok(ValueType::Scalar(ScalarType::Enumeration)),
            "enumeration_list" => return Ok(ValueType::List(ScalarType::Enumeration)),
            _ => {}
        }
        let (base, list) = match s.strip_suffix("_list") {
            Some(base) => (base, true),
            None => (s, false),
        };
        let scalar = ScalarType::ALL
            .into_iter()
            .find(|t| t.name() == base)
            .ok_or_else(|| CompileError::type_mismatch("a known type name", s, None))?;
        Ok(if list {
            ValueType::List(scalar)
        } else {
            ValueType::Scalar(scalar)
        })
    }
}

/// Inline value known while the graph is being built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Vec3([f64; 3]),
    List(Vec<Literal>),
}

impl Literal {
    pub fn shape(&self) -> &'static str {
        match self {
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::Vec3(_) => "vec3",
            Literal::List(_) => "list",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s) => write!(f, "{s:?}"),
            Literal::Vec3([x, y, z]) => write!(f, "({x:?}, {y:?}, {z:?})"),
            Literal::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Output pin of a registered node that a value flows from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PinRef {
    pub node: NodeId,
    pub slot: String,
    pub source_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Literal { value: Literal },
    Pin(PinRef),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Value {
    #[serde(rename = "type")]
    ty: ValueType,
    #[serde(flatten)]
    provenance: Provenance,
}

impl Value {
    /// Builds a literal value, checking (and for numbers, widening) its shape
    /// against the declared type.
    pub fn literal(ty: ValueType, literal: Literal) -> Result<Self> {
        let literal = check_literal(ty, literal)?;
        Ok(Self {
            ty,
            provenance: Provenance::Literal { value: literal },
        })
    }

    pub fn pin(ty: ValueType, pin: PinRef) -> Self {
        Self {
            ty,
            provenance: Provenance::Pin(pin),
        }
    }

    pub fn bool(b: bool) -> Self {
        Self::trusted(ValueType::BOOL, Literal::Bool(b))
    }

    pub fn int(i: i64) -> Self {
        Self::trusted(ValueType::INT, Literal::Int(i))
    }

    pub fn float(x: f64) -> Self {
        Self::trusted(ValueType::FLOAT, Literal::Float(x))
    }

    pub fn str(s: impl Into<String>) -> Self {
        Self::trusted(ValueType::STR, Literal::Str(s.into()))
    }

    fn trusted(ty: ValueType, literal: Literal) -> Self {
        Self {
            ty,
            provenance: Provenance::Literal { value: literal },
        }
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.provenance, Provenance::Literal { .. })
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.provenance {
            Provenance::Literal { value } => Some(value),
            Provenance::Pin(_) => None,
        }
    }

    pub fn as_pin(&self) -> Option<&PinRef> {
        match &self.provenance {
            Provenance::Pin(pin) => Some(pin),
            Provenance::Literal { .. } => None,
        }
    }

    /// Fails with a hinted type mismatch unless this value has type `expected`.
    pub fn expect_type(&self, expected: ValueType) -> Result<&Self> {
        if self.ty == expected {
            Ok(self)
        } else {
            Err(CompileError::type_mismatch(
                expected,
                self,
                expected.suggest(self.ty),
            ))
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provenance {
            Provenance::Literal { value } => write!(f, "{} literal {value}", self.ty),
            Provenance::Pin(pin) => write!(
                f,
                "{} pin (node {} `{}`[{}])",
                self.ty, pin.node.0, pin.slot, pin.source_index
            ),
        }
    }
}

/// Raw argument handed over by a front-end: an inline literal or a value that
/// was produced earlier.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueInput {
    Literal(Literal),
    Value(Value),
}

impl From<Literal> for ValueInput {
    fn from(literal: Literal) -> Self {
        ValueInput::Literal(literal)
    }
}

impl From<Value> for ValueInput {
    fn from(value: Value) -> Self {
        ValueInput::Value(value)
    }
}

impl From<bool> for ValueInput {
    fn from(b: bool) -> Self {
        ValueInput::Literal(Literal::Bool(b))
    }
}

impl From<i32> for ValueInput {
    fn from(i: i32) -> Self {
        ValueInput::Literal(Literal::Int(i64::from(i)))
    }
}

impl From<i64> for ValueInput {
    fn from(i: i64) -> Self {
        ValueInput::Literal(Literal::Int(i))
    }
}

impl From<f64> for ValueInput {
    fn from(x: f64) -> Self {
        ValueInput::Literal(Literal::Float(x))
    }
}

impl From<&str> for ValueInput {
    fn from(s: &str) -> Self {
        ValueInput::Literal(Literal::Str(s.to_string()))
    }
}

/// Interprets a front-end argument as a value of type `ty`.
pub fn parse_value(input: impl Into<ValueInput>, ty: ValueType) -> Result<Value> {
    match input.into() {
        ValueInput::Literal(literal) => Value::literal(ty, literal),
        ValueInput::Value(value) => {
            value.expect_type(ty)?;
            Ok(value)
        }
    }
}

fn check_literal(ty: ValueType, literal: Literal) -> Result<Literal> {
    let elem = match ty {
        ValueType::LocalVariable | ValueType::CustomVariableSnapshot => {
            return Err(ErrorKind::LiteralNotAllowed { ty: ty.to_string() }.into())
        }
        ValueType::List(elem) => {
            let Literal::List(items) = literal else {
                return Err(CompileError::type_mismatch(
                    ty,
                    format!("{} literal {literal}", literal.shape()),
                    Some("wrap the value in a list".to_string()),
                ));
            };
            return items
                .into_iter()
                .map(|item| check_literal(ValueType::Scalar(elem), item))
                .collect::<Result<Vec<_>>>()
                .map(Literal::List);
        }
        ValueType::Scalar(elem) => elem,
    };

    if !elem.accepts_literal() {
        return Err(ErrorKind::LiteralNotAllowed { ty: ty.to_string() }.into());
    }

    let mismatch = |literal: &Literal, hint: Option<&str>| {
        CompileError::type_mismatch(
            ty,
            format!("{} literal {literal}", literal.shape()),
            hint.map(str::to_string),
        )
    };

    match (elem, literal) {
        (ScalarType::Bool, l @ Literal::Bool(_)) => Ok(l),
        (ScalarType::Int, l @ Literal::Int(_)) => Ok(l),
        (ScalarType::Int, l @ Literal::Float(_)) => {
            Err(mismatch(&l, Some("did you mean `float`?")))
        }
        (ScalarType::Float, l @ Literal::Float(_)) => Ok(l),
        (ScalarType::Float, Literal::Int(i)) => Ok(Literal::Float(i as f64)),
        (ScalarType::Str | ScalarType::Enumeration, l @ Literal::Str(_)) => Ok(l),
        (ScalarType::Vec3, l @ Literal::Vec3(_)) => Ok(l),
        (ScalarType::Vec3, Literal::List(items)) if items.len() == 3 => {
            let mut xyz = [0.0; 3];
            for (slot, item) in xyz.iter_mut().zip(items.iter()) {
                *slot = item
                    .as_f64()
                    .ok_or_else(|| mismatch(item, Some("vec3 components must be numbers")))?;
            }
            Ok(Literal::Vec3(xyz))
        }
        (
            ScalarType::Guid | ScalarType::Faction | ScalarType::ConfigId | ScalarType::PrefabId,
            Literal::Int(i),
        ) => {
            if i < 0 {
                Err(mismatch(&Literal::Int(i), Some("ids are non-negative")))
            } else {
                Ok(Literal::Int(i))
            }
        }
        (_, l @ Literal::List(_)) => {
            let hint = format!("did you mean `{}_list`?", elem.name());
            Err(mismatch(&l, Some(&hint)))
        }
        (_, l) => Err(mismatch(&l, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(ty: ValueType) -> Value {
        Value::pin(
            ty,
            PinRef {
                node: NodeId(4),
                slot: "value".to_string(),
                source_index: 0,
            },
        )
    }

    #[test]
    fn type_names_parse_back() {
        for name in ["int", "float_list", "config_id", "enum", "local_variable"] {
            let ty: ValueType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert_eq!(
            "enumeration".parse::<ValueType>().unwrap(),
            ValueType::Scalar(ScalarType::Enumeration)
        );
        assert!("quaternion".parse::<ValueType>().is_err());
    }

    #[test]
    fn int_literal_widens_to_float() {
        let v = Value::literal(ValueType::FLOAT, Literal::Int(2)).unwrap();
        assert_eq!(v.as_literal(), Some(&Literal::Float(2.0)));

        let list = Value::literal(
            ValueType::List(ScalarType::Float),
            Literal::List(vec![Literal::Int(1), Literal::Float(0.5)]),
        )
        .unwrap();
        assert_eq!(
            list.as_literal(),
            Some(&Literal::List(vec![Literal::Float(1.0), Literal::Float(0.5)]))
        );
    }

    #[test]
    fn float_literal_is_not_an_int() {
        let err = Value::literal(ValueType::INT, Literal::Float(1.5)).unwrap_err();
        match err.kind {
            ErrorKind::TypeMismatch { hint, .. } => {
                assert_eq!(hint.0.as_deref(), Some("did you mean `float`?"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pin_only_types_reject_literals() {
        let err =
            Value::literal(ValueType::Scalar(ScalarType::Entity), Literal::Int(1)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::LiteralNotAllowed { .. }));
        let err = Value::literal(ValueType::LocalVariable, Literal::Bool(true)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::LiteralNotAllowed { .. }));
    }

    #[test]
    fn negative_ids_are_rejected() {
        assert!(Value::literal(ValueType::Scalar(ScalarType::ConfigId), Literal::Int(-1)).is_err());
        assert!(Value::literal(ValueType::Scalar(ScalarType::PrefabId), Literal::Int(7)).is_ok());
    }

    #[test]
    fn vec3_from_three_numbers() {
        let v = Value::literal(
            ValueType::Scalar(ScalarType::Vec3),
            Literal::List(vec![Literal::Int(1), Literal::Float(2.0), Literal::Int(3)]),
        )
        .unwrap();
        assert_eq!(v.as_literal(), Some(&Literal::Vec3([1.0, 2.0, 3.0])));
    }

    #[test]
    fn requesting_int_list_from_float_list_pin_hints() {
        let err = parse_value(pin(ValueType::List(ScalarType::Float)), ValueType::List(ScalarType::Int))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("expected int_list"), "{text}");
        assert!(text.contains("float_list pin (node 4 `value`[0])"), "{text}");
        assert!(text.contains("did you mean `float_list`?"), "{text}");
    }

    #[test]
    fn unrelated_types_have_no_hint() {
        let err = parse_value(pin(ValueType::STR), ValueType::BOOL).unwrap_err();
        match err.kind {
            ErrorKind::TypeMismatch { hint, .. } => assert_eq!(hint.0, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Value::int(3)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "int", "kind": "literal", "value": 3}));

        let json = serde_json::to_value(pin(ValueType::BOOL)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "bool",
                "kind": "pin",
                "node": 4,
                "slot": "value",
                "source_index": 0
            })
        );
    }
}
