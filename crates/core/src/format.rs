//! Inline Michelson rendering of Micheline expressions.

use bcd_interchange::Micheline;

/// Render `m` as single-line Michelson, e.g. `Pair 1 (Some "a")` or
/// `{ Elt 1 Unit ; Elt 2 Unit }`.
pub fn to_michelson_inline(m: &Micheline) -> String {
    let mut out = String::new();
    write_expr(m, false, &mut out);
    out
}

fn write_expr(m: &Micheline, nested: bool, out: &mut String) {
    match m {
        Micheline::Int(i) => out.push_str(i),
        Micheline::String(s) => write_string(s, out),
        Micheline::Bytes(b) => {
            out.push_str("0x");
            out.push_str(b);
        }
        Micheline::Seq(items) => {
            if items.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(" ; ");
                }
                write_expr(item, false, out);
            }
            out.push_str(" }");
        }
        Micheline::Prim { prim, args, annots } => {
            let wrap = nested && (!args.is_empty() || !annots.is_empty());
            if wrap {
                out.push('(');
            }
            out.push_str(prim);
            for annot in annots {
                out.push(' ');
                out.push_str(annot);
            }
            for arg in args {
                out.push(' ');
                write_expr(arg, true, out);
            }
            if wrap {
                out.push(')');
            }
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(v: serde_json::Value) -> String {
        to_michelson_inline(&Micheline::from_json(&v).unwrap())
    }

    #[test]
    fn literals() {
        assert_eq!(render(json!({"int": "-5"})), "-5");
        assert_eq!(render(json!({"bytes": "00ab"})), "0x00ab");
        assert_eq!(render(json!({"string": "say \"hi\"\n"})), r#""say \"hi\"\n""#);
        assert_eq!(render(json!({"prim": "Unit"})), "Unit");
    }

    #[test]
    fn nested_args_are_parenthesised() {
        assert_eq!(
            render(json!({"prim": "Pair", "args": [
                {"int": "1"},
                {"prim": "Some", "args": [{"string": "a"}]},
                {"prim": "None"}
            ]})),
            r#"Pair 1 (Some "a") None"#
        );
    }

    #[test]
    fn sequences() {
        assert_eq!(render(json!([])), "{}");
        assert_eq!(
            render(json!([
                {"prim": "Elt", "args": [{"int": "1"}, {"prim": "Unit"}]},
                {"prim": "DROP"}
            ])),
            "{ Elt 1 Unit ; DROP }"
        );
    }

    #[test]
    fn annotations_follow_keyword() {
        assert_eq!(
            render(json!({"prim": "pair", "args": [
                {"prim": "nat", "annots": ["%a"]},
                {"prim": "int"}
            ]})),
            "pair (nat %a) int"
        );
    }
}
