//! Branch lowering: the shared "check and branch" routine every
//! conditional (`if`/`while`/`do`/`for`/`&&`/`||`/ternary) bottoms out in.

use crate::front::types::TypePool;

use super::ir::Label;
use super::state::{Answer, Emit};

/// Inspect `answer`'s kind and branch to `true_label`/`false_label`
/// accordingly (§4.5). Malformed answers (`Mem`, `Str`, `Null` reaching
/// here, e.g. from a mistyped program the upstream checker should have
/// rejected) emit nothing rather than crash, per the generator's
/// best-effort failure semantics.
pub fn check_and_branch(
    emit: &mut Emit,
    types: &TypePool,
    answer: Answer,
    true_label: Label,
    false_label: Label,
) {
    match answer {
        Answer::IntConst(c) => {
            let target = if c != 0 { true_label } else { false_label };
            emit.line(format!("br label %{target}"));
        }
        Answer::FloatConst(c) => {
            let target = if c != 0.0 { true_label } else { false_label };
            emit.line(format!("br label %{target}"));
        }
        Answer::Logic(v) => {
            emit.line(format!(
                "br i1 {v}, label %{true_label}, label %{false_label}"
            ));
        }
        Answer::Reg(v, ty) => {
            let cmp = emit.fresh_reg();
            if ty.is_floating(types) {
                emit.line(format!("{cmp} = fcmp one double {v}, 0.0"));
            } else {
                let ty_text = ty.text(types, &mut emit.needs);
                emit.line(format!("{cmp} = icmp ne {ty_text} {v}, 0"));
            }
            emit.line(format!(
                "br i1 {cmp}, label %{true_label}, label %{false_label}"
            ));
        }
        Answer::Mem(..) | Answer::Str(_) | Answer::Null => {
            // Nothing typeable to branch on; the type checker should
            // already have rejected this program.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::back::ir::Value;

    #[test]
    fn const_true_branches_unconditionally() {
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let types = TypePool::new();
        check_and_branch(
            &mut emit,
            &types,
            Answer::IntConst(1),
            Label::Synthetic(0),
            Label::Synthetic(1),
        );
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.trim(), "br label %label0");
    }

    #[test]
    fn reg_answer_compares_before_branching() {
        let mut buf = Vec::new();
        let mut emit = Emit::new(&mut buf);
        let types = TypePool::new();
        check_and_branch(
            &mut emit,
            &types,
            Answer::Reg(Value::Reg(3), types.int().into()),
            Label::Synthetic(0),
            Label::Synthetic(1),
        );
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("icmp ne i32 %.3, 0"));
        assert!(text.contains("br i1 %.1, label %label0, label %label1"));
    }
}
