use super::{BranchOutcome, GraphBuilder};
use crate::{
    error::{CompileError, ErrorKind, Result},
    model::{ExecEndpoint, NodeId},
    nodes::{DoubleBranchNode, MultipleBranchesNode},
    value::{Value, ValueType},
};
use indexmap::IndexMap;
use std::fmt;
use tracing::debug;

pub type BranchBody<'a> = Box<dyn FnOnce(&mut GraphBuilder) -> Result<()> + 'a>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaseLabel {
    Int(i64),
    Str(String),
}

impl CaseLabel {
    fn value(&self) -> Value {
        match self {
            CaseLabel::Int(i) => Value::int(*i),
            CaseLabel::Str(s) => Value::str(s.clone()),
        }
    }

    fn ty(&self) -> ValueType {
        match self {
            CaseLabel::Int(_) => ValueType::INT,
            CaseLabel::Str(_) => ValueType::STR,
        }
    }
}

impl fmt::Display for CaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseLabel::Int(i) => write!(f, "{i}"),
            CaseLabel::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for CaseLabel {
    fn from(i: i64) -> Self {
        CaseLabel::Int(i)
    }
}

impl From<i32> for CaseLabel {
    fn from(i: i32) -> Self {
        CaseLabel::Int(i64::from(i))
    }
}

impl From<&str> for CaseLabel {
    fn from(s: &str) -> Self {
        CaseLabel::Str(s.to_string())
    }
}

/// Where an aliased case continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    Case(CaseLabel),
    Default,
}

impl From<CaseLabel> for AliasTarget {
    fn from(label: CaseLabel) -> Self {
        AliasTarget::Case(label)
    }
}

impl From<i64> for AliasTarget {
    fn from(i: i64) -> Self {
        AliasTarget::Case(CaseLabel::Int(i))
    }
}

impl From<i32> for AliasTarget {
    fn from(i: i32) -> Self {
        AliasTarget::Case(CaseLabel::from(i))
    }
}

impl From<&str> for AliasTarget {
    fn from(s: &str) -> Self {
        AliasTarget::Case(CaseLabel::from(s))
    }
}

pub enum CaseTarget<'a> {
    Body(BranchBody<'a>),
    /// Shares the compiled body of another case.
    Alias(AliasTarget),
    /// Falls straight through to the code after the switch.
    Empty,
}

/// Cases of a `multiple_branches` dispatch, in declaration order.
pub struct SwitchCases<'a> {
    cases: IndexMap<CaseLabel, CaseTarget<'a>>,
    default: CaseTarget<'a>,
    duplicate: Option<CaseLabel>,
}

impl Default for SwitchCases<'_> {
    fn default() -> Self {
        Self {
            cases: IndexMap::new(),
            default: CaseTarget::Empty,
            duplicate: None,
        }
    }
}

impl<'a> SwitchCases<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, label: impl Into<CaseLabel>, target: CaseTarget<'a>) -> Self {
        let label = label.into();
        if self.cases.contains_key(&label) {
            self.duplicate.get_or_insert(label);
        } else {
            self.cases.insert(label, target);
        }
        self
    }

    pub fn case<F>(self, label: impl Into<CaseLabel>, body: F) -> Self
    where
        F: FnOnce(&mut GraphBuilder) -> Result<()> + 'a,
    {
        self.target(label, CaseTarget::Body(Box::new(body)))
    }

    pub fn alias(self, label: impl Into<CaseLabel>, to: impl Into<AliasTarget>) -> Self {
        self.target(label, CaseTarget::Alias(to.into()))
    }

    pub fn empty(self, label: impl Into<CaseLabel>) -> Self {
        self.target(label, CaseTarget::Empty)
    }

    pub fn default_case<F>(mut self, body: F) -> Self
    where
        F: FnOnce(&mut GraphBuilder) -> Result<()> + 'a,
    {
        self.default = CaseTarget::Body(Box::new(body));
        self
    }

    pub fn default_alias(mut self, to: impl Into<AliasTarget>) -> Self {
        self.default = CaseTarget::Alias(to.into());
        self
    }

    fn target_at(&self, key: BranchKey) -> &CaseTarget<'a> {
        match key {
            BranchKey::Default => &self.default,
            BranchKey::Case(i) => &self.cases[i],
        }
    }

    fn label(&self, key: BranchKey) -> String {
        match key {
            BranchKey::Default => "default".to_string(),
            BranchKey::Case(i) => self
                .cases
                .get_index(i)
                .map(|(label, _)| label.to_string())
                .unwrap_or_default(),
        }
    }

    /// Follows the alias chain starting at `key` to a body or empty case.
    fn resolve_target(&self, key: BranchKey) -> Result<BranchKey> {
        let mut chain = vec![key];
        let mut current = key;
        loop {
            let next = match self.target_at(current) {
                CaseTarget::Body(_) | CaseTarget::Empty => return Ok(current),
                CaseTarget::Alias(AliasTarget::Default) => BranchKey::Default,
                CaseTarget::Alias(AliasTarget::Case(label)) => self
                    .cases
                    .get_index_of(label)
                    .map(BranchKey::Case)
                    .ok_or_else(|| CompileError::new(ErrorKind::UnknownCase(label.to_string())))?,
            };
            if chain.contains(&next) {
                chain.push(next);
                let path: Vec<_> = chain.iter().map(|k| self.label(*k)).collect();
                return Err(CompileError::new(ErrorKind::AliasCycle(path.join(" -> "))));
            }
            chain.push(next);
            current = next;
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum BranchKey {
    Default,
    Case(usize),
}

impl BranchKey {
    fn source_index(self) -> u32 {
        match self {
            BranchKey::Default => 0,
            BranchKey::Case(i) => i as u32 + 1,
        }
    }
}

/// Appends `endpoints` to `join`, skipping ones already present.
fn extend_join(join: &mut Vec<ExecEndpoint>, endpoints: impl IntoIterator<Item = ExecEndpoint>) {
    for endpoint in endpoints {
        if !join.contains(&endpoint) {
            join.push(endpoint);
        }
    }
}

impl GraphBuilder {
    /// if/else. Code emitted afterwards continues from every branch that did
    /// not end in `return`, `break` or `continue`.
    pub fn double_branch<T, F>(
        &mut self,
        condition: Value,
        true_branch: T,
        false_branch: F,
    ) -> Result<NodeId>
    where
        T: FnOnce(&mut Self) -> Result<()>,
        F: FnOnce(&mut Self) -> Result<()>,
    {
        condition.expect_type(ValueType::BOOL)?;
        let node = self.emit_exec(&DoubleBranchNode, vec![condition], None)?;

        let on_true = self.with_exec_branch(node, 0, true_branch)?;
        let on_false = self.with_exec_branch(node, 1, false_branch)?;

        let mut join = Vec::new();
        extend_join(&mut join, on_true.tail_endpoints);
        extend_join(&mut join, on_false.tail_endpoints);
        self.ctx.set_current_exec_tail_endpoints(join);
        Ok(node)
    }

    pub fn if_then<T>(&mut self, condition: Value, body: T) -> Result<NodeId>
    where
        T: FnOnce(&mut Self) -> Result<()>,
    {
        self.double_branch(condition, body, |_| Ok(()))
    }

    /// switch. Exec output 0 is the default branch, output `i + 1` the `i`-th
    /// declared case.
    pub fn multiple_branches(&mut self, control: Value, cases: SwitchCases<'_>) -> Result<NodeId> {
        let control_ty = control.ty();
        if control_ty != ValueType::INT && control_ty != ValueType::STR {
            return Err(CompileError::type_mismatch("int or str", &control, None));
        }
        if let Some(label) = &cases.duplicate {
            return Err(CompileError::new(ErrorKind::DuplicateCase(label.to_string())));
        }
        for label in cases.cases.keys() {
            if label.ty() != control_ty {
                return Err(CompileError::type_mismatch(
                    control_ty,
                    format!("case {label}"),
                    control_ty.suggest(label.ty()),
                ));
            }
        }

        let keys: Vec<BranchKey> = std::iter::once(BranchKey::Default)
            .chain((0..cases.cases.len()).map(BranchKey::Case))
            .collect();
        let resolved = keys
            .iter()
            .map(|&key| cases.resolve_target(key))
            .collect::<Result<Vec<_>>>()?;

        let mut args = vec![control];
        args.extend(cases.cases.keys().map(CaseLabel::value));
        let node = self.emit_exec(&MultipleBranchesNode, args, None)?;

        let SwitchCases {
            cases: declared,
            default,
            ..
        } = cases;
        let targets = std::iter::once(default).chain(declared.into_values());

        let mut outcomes: Vec<Option<BranchOutcome>> = Vec::with_capacity(keys.len());
        for (key, target) in keys.iter().zip(targets) {
            let index = key.source_index();
            let outcome = match target {
                CaseTarget::Body(body) => Some(self.with_exec_branch(node, index, body)?),
                CaseTarget::Empty => Some(BranchOutcome {
                    contains_return: false,
                    terminated_by_return: false,
                    tail_endpoints: vec![ExecEndpoint::new(node, index)],
                    head_node_id: None,
                }),
                CaseTarget::Alias(_) => None,
            };
            outcomes.push(outcome);
        }

        let mut join = Vec::new();
        for outcome in outcomes.iter().flatten() {
            extend_join(&mut join, outcome.tail_endpoints.iter().copied());
        }

        for (position, (key, target)) in keys.iter().zip(resolved.iter()).enumerate() {
            if outcomes[position].is_some() {
                continue;
            }
            let index = key.source_index();
            let target_index = target.source_index();
            let Some(shared) = outcomes[target_index as usize].as_ref() else {
                continue;
            };
            debug!(node = node.0, from = index, to = target_index, "case alias");

            match shared.head_node_id {
                Some(head) => self.graph.connect_exec_branch_output(node, index, head)?,
                // The shared body emitted nothing, so the alias continues
                // wherever that case's own output does.
                None => {
                    let own = ExecEndpoint::new(node, target_index);
                    let redirected = shared.tail_endpoints.iter().map(|&ep| {
                        if ep == own {
                            ExecEndpoint::new(node, index)
                        } else {
                            ep
                        }
                    });
                    extend_join(&mut join, redirected.collect::<Vec<_>>());
                }
            }
        }

        self.ctx.set_current_exec_tail_endpoints(join);
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::CompilerConfig, model::ExecEndpoint, value::PinRef};

    fn ep(node: NodeId, index: u32) -> ExecEndpoint {
        ExecEndpoint::new(node, index)
    }

    fn builder() -> (GraphBuilder, NodeId) {
        let mut b = GraphBuilder::new("test", CompilerConfig::default());
        let entry = b.begin_function("main");
        (b, entry)
    }

    fn live(b: &mut GraphBuilder, ty: ValueType) -> Value {
        let node = b.call_data(
            "get_custom_variable",
            vec![],
            vec![crate::model::OutputPin::new("value", ty)],
        );
        b.mark_pin(node, "value", 0).unwrap()
    }

    #[test]
    fn empty_branches_join_on_both_outputs() {
        let (mut b, entry) = builder();
        let cond = live(&mut b, ValueType::BOOL);
        let node = b.double_branch(cond, |_| Ok(()), |_| Ok(())).unwrap();
        assert_eq!(b.graph().exec_target(ep(entry, 0)), Some(node));
        assert_eq!(b.current_exec_tail_endpoints(), &[ep(node, 0), ep(node, 1)]);
    }

    #[test]
    fn returning_branch_is_left_out_of_join() {
        let (mut b, _) = builder();
        let cond = live(&mut b, ValueType::BOOL);
        let node = b
            .double_branch(cond, |b| b.return_(), |b| b.print_string("else").map(drop))
            .unwrap();
        let print = b.graph().exec_target(ep(node, 1)).unwrap();
        assert_eq!(b.current_exec_tail_endpoints(), &[ep(print, 0)]);
    }

    #[test]
    fn both_branches_returning_leave_nothing_open() {
        let (mut b, _) = builder();
        let cond = live(&mut b, ValueType::BOOL);
        b.double_branch(cond, |b| b.return_(), |b| b.return_()).unwrap();
        assert!(b.current_exec_tail_endpoints().is_empty());
    }

    #[test]
    fn nested_partial_return_keeps_fallthrough() {
        let (mut b, _) = builder();
        let outer = live(&mut b, ValueType::BOOL);
        let inner = live(&mut b, ValueType::BOOL);
        let node = b
            .if_then(outer, |b| {
                b.if_then(inner, |b| b.return_())?;
                b.print_string("after inner").map(drop)
            })
            .unwrap();
        let tails = b.current_exec_tail_endpoints().to_vec();
        assert_eq!(tails.len(), 2);
        assert!(tails.contains(&ep(node, 1)));
    }

    #[test]
    fn condition_must_be_bool() {
        let (mut b, _) = builder();
        let err = b.if_then(Value::int(1), |_| Ok(())).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn switch_wires_cases_in_declaration_order() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let node = b
            .multiple_branches(
                control,
                SwitchCases::new()
                    .case(1, |b| b.print_string("one").map(drop))
                    .case(2, |b| b.print_string("two").map(drop))
                    .default_case(|b| b.print_string("other").map(drop)),
            )
            .unwrap();

        let graph = b.graph();
        let args = &graph.nodes[&node].args;
        assert_eq!(args.len(), 3);
        assert_eq!(args[1], Value::int(1));
        assert_eq!(args[2], Value::int(2));
        assert_eq!(graph.nodes[&node].exec_outputs, 3);

        let heads: Vec<_> = (0..3)
            .map(|i| graph.exec_target(ep(node, i)).unwrap())
            .collect();
        let text = |id: NodeId| graph.nodes[&id].args[0].clone();
        assert_eq!(text(heads[0]), Value::str("other"));
        assert_eq!(text(heads[1]), Value::str("one"));
        assert_eq!(text(heads[2]), Value::str("two"));

        let tails: Vec<_> = heads.iter().map(|&h| ep(h, 0)).collect();
        assert_eq!(b.current_exec_tail_endpoints(), tails.as_slice());
    }

    #[test]
    fn alias_shares_the_target_body() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::STR);
        let node = b
            .multiple_branches(
                control,
                SwitchCases::new()
                    .alias("a", "b")
                    .case("b", |b| b.print_string("shared").map(drop)),
            )
            .unwrap();
        let graph = b.graph();
        let shared = graph.exec_target(ep(node, 2)).unwrap();
        assert_eq!(graph.exec_target(ep(node, 1)), Some(shared));
        // Omitted default falls through.
        assert_eq!(b.current_exec_tail_endpoints(), &[ep(node, 0), ep(shared, 0)]);
    }

    #[test]
    fn alias_to_empty_case_falls_through_on_its_own_output() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let node = b
            .multiple_branches(
                control,
                SwitchCases::new()
                    .empty(1)
                    .alias(2, 1)
                    .default_alias(AliasTarget::Case(CaseLabel::Int(2))),
            )
            .unwrap();
        assert_eq!(
            b.current_exec_tail_endpoints(),
            &[ep(node, 1), ep(node, 0), ep(node, 2)]
        );
    }

    #[test]
    fn alias_cycles_are_rejected_before_emitting() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let before = b.graph().nodes.len();
        let err = b
            .multiple_branches(control, SwitchCases::new().alias(1, 2).alias(2, 1))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AliasCycle("1 -> 2 -> 1".to_string()));
        assert_eq!(b.graph().nodes.len(), before);
    }

    #[test]
    fn default_aliasing_itself_is_a_cycle() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let err = b
            .multiple_branches(
                control,
                SwitchCases::new().empty(1).default_alias(AliasTarget::Default),
            )
            .unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::AliasCycle("default -> default".to_string())
        );
    }

    #[test]
    fn alias_to_undeclared_case_fails() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let err = b
            .multiple_branches(control, SwitchCases::new().alias(1, 7))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownCase("7".to_string()));
    }

    #[test]
    fn duplicate_and_mistyped_cases_fail() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let err = b
            .multiple_branches(control.clone(), SwitchCases::new().empty(1).empty(1))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateCase("1".to_string()));

        let err = b
            .multiple_branches(control, SwitchCases::new().empty("one"))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));

        let float = Value::pin(
            ValueType::FLOAT,
            PinRef {
                node: NodeId(1),
                slot: "value".to_string(),
                source_index: 0,
            },
        );
        assert!(b.multiple_branches(float, SwitchCases::new()).is_err());
    }

    #[test]
    fn returning_cases_do_not_join() {
        let (mut b, _) = builder();
        let control = live(&mut b, ValueType::INT);
        let node = b
            .multiple_branches(
                control,
                SwitchCases::new()
                    .case(1, |b| b.return_())
                    .alias(2, 1)
                    .default_case(|b| b.return_()),
            )
            .unwrap();
        assert!(b.current_exec_tail_endpoints().is_empty());
        let shared = b.graph().exec_target(ep(node, 1)).unwrap();
        assert_eq!(b.graph().exec_target(ep(node, 2)), Some(shared));
    }
}
