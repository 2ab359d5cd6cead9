use super::GraphBuilder;
use crate::{
    context::LocalVariable,
    error::{CompileError, ErrorKind, Result},
    fold::{binary_result_type, fold_binary, fold_unary, BinaryOp, UnaryOp},
    model::NodeId,
    nodes::{
        AssemblyDictionaryNode, AssemblyListNode, BinaryOperatorNode, GetLocalVariableNode,
        PrintStringNode, SetLocalVariableNode, UnaryOperatorNode, MAX_DICTIONARY_PAIRS,
        MAX_LIST_ELEMENTS,
    },
    value::{parse_value, ScalarType, Value, ValueInput, ValueType},
};

/// Rejects collections that are empty or larger than `limit`.
pub(crate) fn check_cardinality(what: &'static str, limit: usize, found: usize) -> Result<()> {
    if found == 0 {
        return Err(ErrorKind::EmptyCollection(what).into());
    }
    if found > limit {
        return Err(ErrorKind::TooManyElements { what, limit, found }.into());
    }
    Ok(())
}

fn expect_numeric(value: &Value) -> Result<()> {
    match value.ty() {
        ValueType::Scalar(s) if s.is_numeric() => Ok(()),
        _ => Err(CompileError::type_mismatch("int or float", value, None)),
    }
}

/// An int literal meeting a float operand is read as a float literal.
fn widen_int_literal(value: Value, other: &Value) -> Result<Value> {
    match value.as_literal() {
        Some(literal) if value.ty() == ValueType::INT && other.ty() == ValueType::FLOAT => {
            Value::literal(ValueType::FLOAT, literal.clone())
        }
        _ => Ok(value),
    }
}

impl GraphBuilder {
    /// Declares a local variable holding `initial`.
    pub fn declare_local_variable(&mut self, initial: Value) -> Result<LocalVariable> {
        let ty = initial.ty();
        let node = self.emit_data(&GetLocalVariableNode, vec![initial], Some(ty));
        Ok(LocalVariable {
            node,
            variable: self.mark_pin(node, "variable", 0)?,
            value: self.mark_pin(node, "value", 1)?,
        })
    }

    pub fn set_local_variable(
        &mut self,
        variable: &LocalVariable,
        value: impl Into<ValueInput>,
    ) -> Result<NodeId> {
        let value = parse_value(value, variable.value.ty())?;
        self.emit_exec(
            &SetLocalVariableNode,
            vec![variable.variable.clone(), value],
            None,
        )
    }

    pub fn print_string(&mut self, text: impl Into<ValueInput>) -> Result<NodeId> {
        let text = parse_value(text, ValueType::STR)?;
        self.emit_exec(&PrintStringNode, vec![text], None)
    }

    /// Applies `op`, folding literal operands when enabled.
    ///
    /// Both operands must have the same type once int literals facing a float
    /// have been widened. Arithmetic and ordering take numbers, `and`/`or`/`xor`
    /// take booleans, equality takes anything.
    pub fn binary(&mut self, op: BinaryOp, a: Value, b: Value) -> Result<Value> {
        let a = widen_int_literal(a, &b)?;
        let b = widen_int_literal(b, &a)?;
        b.expect_type(a.ty())?;
        if op.is_arithmetic() || op.is_ordering() {
            expect_numeric(&a)?;
        } else if op.is_logical() {
            a.expect_type(ValueType::BOOL)?;
        }

        if let Some(folded) = fold_binary(&self.config, op, &a, &b) {
            return Ok(folded);
        }

        let result = binary_result_type(op, a.ty());
        let node = self.emit_data(&BinaryOperatorNode(op), vec![a, b], Some(result));
        self.mark_pin(node, "result", 0)
    }

    pub fn unary(&mut self, op: UnaryOp, a: Value) -> Result<Value> {
        match op {
            UnaryOp::Neg | UnaryOp::Abs => expect_numeric(&a)?,
            UnaryOp::Not => {
                a.expect_type(ValueType::BOOL)?;
            }
        }

        if let Some(folded) = fold_unary(&self.config, op, &a) {
            return Ok(folded);
        }

        let ty = a.ty();
        let node = self.emit_data(&UnaryOperatorNode(op), vec![a], Some(ty));
        self.mark_pin(node, "result", 0)
    }

    /// Builds a list of `element` values through an `assembly_list` node.
    pub fn assemble_list(
        &mut self,
        element: ScalarType,
        items: Vec<ValueInput>,
    ) -> Result<Value> {
        check_cardinality("assembly_list", MAX_LIST_ELEMENTS, items.len())?;
        let element_ty = ValueType::Scalar(element);
        let args = items
            .into_iter()
            .map(|item| parse_value(item, element_ty))
            .collect::<Result<Vec<_>>>()?;

        let node = self.emit_data(&AssemblyListNode, args, Some(ValueType::List(element)));
        self.mark_pin(node, "list", 0)
    }

    /// Builds a dictionary through an `assembly_dictionary` node. Arguments
    /// alternate key, value.
    pub fn assemble_dictionary(
        &mut self,
        key: ValueType,
        value: ValueType,
        pairs: Vec<(ValueInput, ValueInput)>,
    ) -> Result<Value> {
        check_cardinality("assembly_dictionary", MAX_DICTIONARY_PAIRS, pairs.len())?;
        let mut args = Vec::with_capacity(pairs.len() * 2);
        for (k, v) in pairs {
            args.push(parse_value(k, key)?);
            args.push(parse_value(v, value)?);
        }

        let node = self.emit_data(&AssemblyDictionaryNode, args, None);
        self.mark_pin(node, "dictionary", 0)
    }
}
