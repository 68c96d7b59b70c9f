//! Line rules - each rewrites one wiki construct.
//!
//! Rules run in a fixed order over every line outside code regions. A rule
//! takes one line and returns the lines that replace it, so a rule may
//! split a line (deadlines, horizontal rules) and later rules see every
//! produced line.
//!
//! | Rule | Wiki | Markdown |
//! |------|------|----------|
//! | `heading` | `===== Title =====` | `## Title` |
//! | `deadline` | `[d:2024-6-15]` | `DEADLINE: <2024-06-15 Sat>` |
//! | `references` | `[[+Sub]]`, `{{./a.png}}` | `[[Parent/Sub]]`, `![[a.png]]` |
//! | `checklist` | `[*] done` | `- [*] done` |
//! | `tags` | `@idea` | `#idea` |
//! | `emphasis` | `//x//`, `__x__` | `*x*`, `==x==` |
//! | `rule` | `--------------------` | `---` |

mod block;
mod deadline;
mod inline;
mod reference;

use smallvec::{SmallVec, smallvec};

use super::PageContext;
use crate::core::ErrorKind;
use crate::debug;

pub use block::{Checklist, Heading, HorizontalRule};
pub use deadline::Deadline;
pub use inline::{Emphasis, Tags};
pub use reference::References;

/// Lines produced from one input line.
pub type Lines = SmallVec<[String; 2]>;

/// One rewrite step over a single line.
pub trait LineRule: Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, line: String, ctx: &PageContext<'_>) -> Result<Lines, ErrorKind>;
}

/// All rules, in application order.
pub const RULES: &[&dyn LineRule] = &[
    &Heading,
    &Deadline,
    &References,
    &Checklist,
    &Tags,
    &Emphasis,
    &HorizontalRule,
];

/// Run every rule over `line`.
pub fn apply_rules(line: String, ctx: &PageContext<'_>) -> Result<Lines, ErrorKind> {
    let mut lines: Lines = smallvec![line];
    for rule in RULES {
        let mut next = Lines::new();
        for line in lines {
            let produced = rule.apply(line, ctx).inspect_err(|e| {
                debug!("markup"; "{} rule failed: {}", rule.name(), e);
            })?;
            next.extend(produced);
        }
        lines = next;
    }
    Ok(lines)
}

/// Single unchanged line.
#[inline]
fn keep(line: String) -> Result<Lines, ErrorKind> {
    Ok(smallvec![line])
}
