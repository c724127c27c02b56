//! CPLEX LP text export.
//!
//! Writes a `LinearModel` in the LP file format read by CBC, HiGHS,
//! GLPK and CPLEX, for audit and for solving outside this crate.

use std::fmt::Write as _;
use std::io;

use super::{LinearModel, Sense, Term};

/// Terms per physical line (LP readers cap line length).
const TERMS_PER_LINE: usize = 8;

/// Writes `model` in LP format.
pub fn write_lp<W: io::Write>(model: &LinearModel, mut out: W) -> io::Result<()> {
    out.write_all(to_lp_string(model).as_bytes())
}

/// Renders `model` in LP format.
pub fn to_lp_string(model: &LinearModel) -> String {
    let names: Vec<String> = model.decisions().iter().map(|d| d.var_name()).collect();
    let mut text = String::new();

    let _ = writeln!(text, "\\* {} *\\", model.name);
    text.push_str("Minimize\n");
    let objective: Vec<Term> = model
        .costs()
        .iter()
        .enumerate()
        .map(|(var, &coef)| Term { var, coef })
        .collect();
    text.push_str("OBJ:");
    push_terms(&mut text, &objective, &names);
    text.push('\n');

    text.push_str("Subject To\n");
    for row in model.constraints() {
        if row.terms.is_empty() {
            let _ = writeln!(text, "\\ {}: no terms", row.name);
            continue;
        }
        let _ = write!(text, "{}:", row.name);
        push_terms(&mut text, &row.terms, &names);
        let op = match row.sense {
            Sense::LessEq => "<=",
            Sense::Equal => "=",
        };
        let _ = writeln!(text, " {op} {}", row.rhs);
    }

    text.push_str("Binaries\n");
    for name in &names {
        let _ = writeln!(text, "{name}");
    }
    text.push_str("End\n");
    text
}

fn push_terms(text: &mut String, terms: &[Term], names: &[String]) {
    for (pos, term) in terms.iter().enumerate() {
        if pos > 0 && pos % TERMS_PER_LINE == 0 {
            text.push_str("\n ");
        }
        let name = names.get(term.var).map(String::as_str).unwrap_or("?");
        let sign = if term.coef < 0.0 { '-' } else { '+' };
        let magnitude = term.coef.abs();
        let coef = if magnitude == 1.0 {
            String::new()
        } else {
            format!("{magnitude} ")
        };
        if pos == 0 && sign == '+' {
            let _ = write!(text, " {coef}{name}");
        } else {
            let _ = write!(text, " {sign} {coef}{name}");
        }
    }
}
