//! Case clauses.
//!
//! Both kinds open a frame, evaluate the enquiry, pick one alternative and
//! run it, falling back to the `OUT` part (which may itself be a nested
//! case for `OUSE`). The alternatives of a clause are flattened once into a
//! cached chain, so later visits select by position directly.

use std::rc::Rc;

use a68_ir::{ModeId, NodeId, NodeKind, NodeRange};

use super::serial::flatten;
use super::Genie;
use crate::annotation::{ChainStep, GenieFlags};
use crate::config::ConformityPolicy;
use crate::errors::{
    undefined_value, unknown_node_kind, unmatched_conformity, value_mismatch, GenieResult,
};
use crate::value::{describe_mode, Value};

impl Genie<'_> {
    /// Cached positional list of a case clause's alternatives.
    fn alternatives(&mut self, node: NodeId, alternatives: NodeRange) -> Rc<[ChainStep]> {
        if let Some(chain) = self.annotations.chain(node) {
            return chain;
        }
        self.annotations.begin_linearizing(node);
        let mut steps = Vec::with_capacity(alternatives.len());
        flatten(&self.program.tree, alternatives, &mut steps);
        steps.retain(|step| matches!(step, ChainStep::Unit(_)));
        tracing::trace!(?node, alternatives = steps.len(), "flattened case alternatives");
        self.annotations
            .finish_linearizing(node, steps.into(), GenieFlags::empty())
    }

    /// `CASE k IN a1, a2, ... OUT o ESAC`: alternative `k` when
    /// `1 <= k <= n`, else the `OUT` part.
    pub(crate) fn eval_integer_case(&mut self, node: NodeId) -> GenieResult {
        let program = self.program;
        let NodeKind::IntegerCase {
            scope,
            enquiry,
            alternatives,
            out_part,
        } = program.tree.kind(node)
        else {
            return Err(unknown_node_kind("case clause").into());
        };
        let mode = program.tree.mode(node);
        let chain = self.alternatives(node, alternatives);
        self.with_frame(scope, |g| {
            g.execute_enquiry(enquiry)?;
            let selector = g.stack.pop()?.as_int()?;
            let chosen = usize::try_from(selector)
                .ok()
                .and_then(|k| k.checked_sub(1))
                .and_then(|k| chain.get(k));
            match chosen {
                Some(&ChainStep::Unit(alternative)) => g.eval_unit(alternative),
                _ if out_part.is_valid() => g.eval_unit(out_part),
                _ => Ok(g.push_undefined(mode)?),
            }
        })
    }

    /// `CASE u IN (INT i): a, (BOOL b): c OUT o ESAC`: the first
    /// alternative whose specifier accepts the union's active variant.
    pub(crate) fn eval_conformity_case(&mut self, node: NodeId) -> GenieResult {
        let program = self.program;
        let NodeKind::ConformityCase {
            scope,
            enquiry,
            alternatives,
            out_part,
        } = program.tree.kind(node)
        else {
            return Err(unknown_node_kind("conformity clause").into());
        };
        let mode = program.tree.mode(node);
        let chain = self.alternatives(node, alternatives);
        let strict = self.config.conformity == ConformityPolicy::Strict;
        self.with_frame(scope, |g| {
            g.execute_enquiry(enquiry)?;
            let (variant, payload) = match g.stack.pop()? {
                Value::Union { variant, payload } => (variant, *payload),
                Value::Undefined(m) => {
                    return Err(undefined_value(describe_mode(&program.modes, m)).into());
                }
                other => return Err(value_mismatch("UNION", &other).into()),
            };
            for step in chain.iter() {
                let ChainStep::Unit(alt_node) = *step else {
                    continue;
                };
                let NodeKind::ConformityAlternative(alt_id) = program.tree.kind(alt_node) else {
                    return Err(unknown_node_kind(program.tree.kind(alt_node).name()).into());
                };
                let alt = *program.tree.alternative(alt_id);
                let Some(&specifier) = program
                    .tree
                    .mode_list(alt.specifiers)
                    .iter()
                    .find(|&&spec| g.oracle.accepts(spec, variant))
                else {
                    continue;
                };
                tracing::trace!(?node, ?variant, ?specifier, "conformity matched");
                let bound = if g.oracle.variants(specifier).is_some() {
                    Value::Union {
                        variant,
                        payload: Box::new(payload),
                    }
                } else {
                    payload
                };
                return g.with_frame(alt.scope, |a| {
                    if let Some(slot) = alt.binding {
                        a.frames.store(slot, bound)?;
                    }
                    a.eval_unit(alt.unit)
                });
            }
            if out_part.is_valid() {
                g.eval_unit(out_part)
            } else if strict && mode != ModeId::VOID {
                Err(unmatched_conformity().into())
            } else {
                Ok(g.push_undefined(mode)?)
            }
        })
    }
}
