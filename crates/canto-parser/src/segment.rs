//! Statement segmenter: splits a token stream into statement-sized groups.
//!
//! A group ends at a `;` outside any open brace, or at the `}` that closes
//! a top-level brace region (a compound statement header plus its body is
//! one group). Terminator tokens are consumed, never retained in a group.

use crate::context::{DelimiterKind, ParseContext};
use canto_lexer::Token;

/// Split `tokens` into statement groups, balance-checking each group before
/// it is released to the parser. Imbalanced groups are dropped after
/// recording a diagnostic naming the delimiter kind.
pub fn segment(tokens: &[Token], ctx: &mut ParseContext) -> Vec<Vec<Token>> {
    let mut groups = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut brace_depth: i32 = 0;

    for tok in tokens {
        if tok.is_symbol(";") && brace_depth == 0 {
            flush(&mut current, &mut groups, ctx);
            continue;
        }
        if tok.is_symbol("{") {
            brace_depth += 1;
        } else if tok.is_symbol("}") {
            brace_depth -= 1;
        }
        current.push(tok.clone());
        if brace_depth == 0 && tok.is_symbol("}") {
            flush(&mut current, &mut groups, ctx);
        }
    }
    flush(&mut current, &mut groups, ctx);

    groups
}

fn flush(current: &mut Vec<Token>, groups: &mut Vec<Vec<Token>>, ctx: &mut ParseContext) {
    if current.is_empty() {
        return;
    }
    let group = std::mem::take(current);
    if check_balance(&group, ctx) {
        groups.push(group);
    }
}

/// Check open/close counts for each delimiter kind independently.
///
/// This is a count equality check only: it does not probe nesting order, so
/// input like `)(` or `([)]` passes as "closed". That weakness is part of
/// the segmenter's contract; callers must not rely on it rejecting
/// structurally misnested but count-balanced groups.
fn check_balance(group: &[Token], ctx: &mut ParseContext) -> bool {
    let line = group.first().map(|t| t.line).unwrap_or(0);
    let mut ok = true;
    for kind in [
        DelimiterKind::Paren,
        DelimiterKind::Bracket,
        DelimiterKind::Brace,
    ] {
        let opens = group.iter().filter(|t| t.is_symbol(kind.open())).count();
        let closes = group.iter().filter(|t| t.is_symbol(kind.close())).count();
        if opens != closes {
            ctx.delimiter_error(line, kind);
            ok = false;
        }
    }
    ok
}
