//! Links and embeds, rewritten through the [`LinkResolver`](crate::address::LinkResolver).

use smallvec::smallvec;

use super::{LineRule, Lines, keep};
use crate::core::ErrorKind;
use crate::markup::{PageContext, Segment, scan};

/// `[[...]]` and `{{...}}` tokens.
pub struct References;

impl LineRule for References {
    fn name(&self) -> &'static str {
        "references"
    }

    fn apply(&self, line: String, ctx: &PageContext<'_>) -> Result<Lines, ErrorKind> {
        let segments = scan(&line);
        if segments.iter().all(|s| matches!(s, Segment::Text(_))) {
            return keep(line);
        }

        let mut out = String::with_capacity(line.len());
        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Link(token) => {
                    out.push_str(&ctx.resolver.resolve_link(&token, &ctx.scope, ctx.diagnostics)?);
                }
                Segment::Embed(token) => {
                    out.push_str(&ctx.resolver.resolve_embed(&token, &ctx.scope, ctx.diagnostics)?);
                }
            }
        }
        Ok(smallvec![out])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::core::Warning;
    use crate::markup::tests::Fixture;

    #[test]
    fn test_links_in_line() {
        let fixture = Fixture::new();
        let ctx = fixture.context("Home.txt");

        let lines = References
            .apply("see [[+Garden|the garden]] and [[Work Log]].".into(), &ctx)
            .unwrap();
        assert_eq!(
            lines.as_slice(),
            ["see [the garden](Home/Garden/Garden) and [Work Log](Work_Log)."]
        );
    }

    #[test]
    fn test_sized_embed() {
        let fixture = Fixture::new();
        let ctx = fixture.context("Home.txt");

        let lines = References
            .apply("{{./pasted_image.png?width=100}}".into(), &ctx)
            .unwrap();
        assert_eq!(lines.as_slice(), ["![[pasted_image.png|100x50]]"]);
    }

    #[test]
    fn test_mirrored_embed() {
        let fixture = Fixture::with_policy(Policy {
            global_attachments: false,
            ..Policy::default()
        });
        let ctx = fixture.context("Home.txt");

        let lines = References
            .apply("{{./pasted_image.png}}".into(), &ctx)
            .unwrap();
        assert_eq!(lines.as_slice(), ["![[Home/pasted_image.png]]"]);
    }

    #[test]
    fn test_unresolved_kept() {
        let fixture = Fixture::new();
        let ctx = fixture.context("Home.txt");

        let lines = References.apply("[[Nowhere|x]]".into(), &ctx).unwrap();
        assert_eq!(lines.as_slice(), ["[[Nowhere|x]]"]);
        assert_eq!(
            fixture.diagnostics.drain()[0].warning,
            Warning::UnresolvedLink("Nowhere".into())
        );
    }

    #[test]
    fn test_web_embed_keeps_query() {
        let fixture = Fixture::new();
        let ctx = fixture.context("Home.txt");

        let lines = References
            .apply("{{https://example.com/a.png?raw=true}}".into(), &ctx)
            .unwrap();
        assert_eq!(lines.as_slice(), ["![](https://example.com/a.png?raw=true)"]);
        assert!(fixture.diagnostics.is_empty());
    }
}
