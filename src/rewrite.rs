//! Replaces local `<script src>` includes with a single bundle reference before `</html>`.

use html_escape::encode_double_quoted_attribute;
use tracing::{debug, info, warn};

use crate::inspect::{extract_local_source, should_ignore};
use crate::token::{Tag, Token};
use crate::tokenizer::Tokenizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptState {
    #[default]
    Outside,
    /// Inside an inline or ignored script; body and closing tag are copied.
    InsidePreserved,
    /// Inside a script that was swept into the bundle; body and closing tag are dropped.
    InsideMerged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub html: Vec<u8>,
    pub sources: Vec<String>,
    /// False when the document had no `</html>`; the bundler was never invoked.
    pub bundle_injected: bool,
}

pub struct Rewriter<'s> {
    bundle_src: &'s str,
    state: ScriptState,
    out: Vec<u8>,
    sources: Vec<String>,
    injected: bool,
}

impl<'s> Rewriter<'s> {
    pub fn new(bundle_src: &'s str) -> Self {
        Self {
            bundle_src,
            state: ScriptState::Outside,
            out: Vec::new(),
            sources: Vec::new(),
            injected: false,
        }
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    /// Processes one token. `bundle` is called with every collected source when the
    /// first `</html>` is reached; its error aborts the rewrite.
    pub fn feed<F, E>(&mut self, token: &Token<'_>, bundle: &mut F) -> Result<(), E>
    where
        F: FnMut(&[String]) -> Result<(), E>,
    {
        match token {
            Token::StartTag(tag) if tag.is("script") => {
                self.state = self.script_tag(tag);
            }
            Token::EndTag(tag) if tag.is("script") => {
                if self.state == ScriptState::InsidePreserved {
                    self.out.extend_from_slice(tag.raw);
                }
                self.state = ScriptState::Outside;
            }
            Token::SelfClosingTag(tag) if tag.is("script") => {
                self.script_tag(tag);
            }
            Token::Text(text) if self.state != ScriptState::Outside => {
                if self.state == ScriptState::InsidePreserved {
                    self.out.extend_from_slice(text);
                }
            }
            Token::EndTag(tag) if tag.is("html") && !self.injected => {
                bundle(&self.sources)?;
                self.inject_bundle_reference();
                self.out.extend_from_slice(tag.raw);
            }
            other => self.out.extend_from_slice(other.raw()),
        }
        Ok(())
    }

    pub fn finish(self) -> RewriteOutcome {
        if !self.injected {
            warn!("document has no </html>; bundle was not written or referenced");
        }
        RewriteOutcome {
            html: self.out,
            sources: self.sources,
            bundle_injected: self.injected,
        }
    }

    /// Emits or records a script tag and returns the state its body should be read in.
    fn script_tag(&mut self, tag: &Tag<'_>) -> ScriptState {
        if should_ignore(&tag.attributes) {
            debug!(tag = %String::from_utf8_lossy(tag.raw), "keeping ignored script");
            self.out.extend_from_slice(tag.raw);
            return ScriptState::InsidePreserved;
        }
        match extract_local_source(&tag.attributes) {
            Some("") => {
                debug!("dropping script with empty src");
                ScriptState::InsideMerged
            }
            Some(src) => {
                info!("Found JS source file to merge: {src}");
                self.sources.push(src.to_owned());
                ScriptState::InsideMerged
            }
            None => {
                debug!("keeping inline script");
                self.out.extend_from_slice(tag.raw);
                ScriptState::InsidePreserved
            }
        }
    }

    fn inject_bundle_reference(&mut self) {
        let src = encode_double_quoted_attribute(self.bundle_src);
        self.out
            .extend_from_slice(format!("<script src=\"{src}\"></script>\n").as_bytes());
        self.injected = true;
    }
}

/// Tokenizes `input` and runs it through a [`Rewriter`].
pub fn rewrite<F, E>(input: &[u8], bundle_src: &str, mut bundle: F) -> Result<RewriteOutcome, E>
where
    F: FnMut(&[String]) -> Result<(), E>,
{
    let mut rewriter = Rewriter::new(bundle_src);
    for token in Tokenizer::new(input) {
        rewriter.feed(&token, &mut bundle)?;
    }
    Ok(rewriter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn run(input: &str) -> (String, Vec<Vec<String>>) {
        let mut calls = Vec::new();
        let outcome = rewrite(input.as_bytes(), "bundle.js", |sources| {
            calls.push(sources.to_vec());
            Ok::<_, Infallible>(())
        })
        .unwrap();
        (String::from_utf8(outcome.html).unwrap(), calls)
    }

    #[test]
    fn merges_local_scripts_before_closing_html() {
        let (html, calls) = run(
            r#"<html><head><script src="a.js"></script><script src="b.js"></script></head></html>"#,
        );
        assert_eq!(
            html,
            "<html><head></head><script src=\"bundle.js\"></script>\n</html>"
        );
        assert_eq!(calls, vec![vec!["a.js".to_string(), "b.js".to_string()]]);
    }

    #[test]
    fn ignored_script_is_kept_with_body() {
        let input = r#"<html><script src="x.js" data-bundlescript="ignore">var a = 1;</script></html>"#;
        let (html, calls) = run(input);
        assert_eq!(
            html,
            r#"<html><script src="x.js" data-bundlescript="ignore">var a = 1;</script><script src="bundle.js"></script>
</html>"#
        );
        assert!(calls[0].is_empty());
    }

    #[test]
    fn external_scripts_are_kept() {
        let input = concat!(
            "<html>",
            "<script src=\"https://cdn.example.com/lib.js\"></script>",
            "<script src='//cdn.example.com/other.js'></script>",
            "<script src=\"local.js\"></script>",
            "</html>"
        );
        let (html, calls) = run(input);
        assert!(html.contains("<script src=\"https://cdn.example.com/lib.js\"></script>"));
        assert!(html.contains("<script src='//cdn.example.com/other.js'></script>"));
        assert!(!html.contains("local.js"));
        assert_eq!(calls, vec![vec!["local.js".to_string()]]);
    }

    #[test]
    fn inline_script_is_kept_verbatim() {
        let input = "<html><body><script type=\"text/javascript\">\n  if (a < b) { go(); }\n</script></body></html>";
        let (html, _) = run(input);
        assert!(html.starts_with(
            "<html><body><script type=\"text/javascript\">\n  if (a < b) { go(); }\n</script></body>"
        ));
    }

    #[test]
    fn merged_script_body_is_dropped() {
        let (html, calls) = run("<html><script src=\"a.js\">fallback()</script></html>");
        assert_eq!(html, "<html><script src=\"bundle.js\"></script>\n</html>");
        assert_eq!(calls[0], vec!["a.js".to_string()]);
    }

    #[test]
    fn document_without_scripts_only_gains_reference() {
        let input = "<!DOCTYPE html>\n<HTML>\n<!-- note --><body class=main>Hi &amp; bye</body>\n</HTML>";
        let (html, calls) = run(input);
        assert_eq!(
            html,
            "<!DOCTYPE html>\n<HTML>\n<!-- note --><body class=main>Hi &amp; bye</body>\n<script src=\"bundle.js\"></script>\n</HTML>"
        );
        assert_eq!(calls, vec![Vec::<String>::new()]);
    }

    #[test]
    fn empty_src_is_dropped_entirely() {
        let (html, calls) = run("<html><script src=\"\">x()</script></html>");
        assert_eq!(html, "<html><script src=\"bundle.js\"></script>\n</html>");
        assert!(calls[0].is_empty());
    }

    #[test]
    fn self_closing_scripts() {
        let (html, calls) = run(concat!(
            "<html><script src=\"a.js\"/><script/>",
            "<script src=\"//cdn/x.js\"/><script data-bundlescript=ignore src=b.js />",
            "<p>x</p></html>"
        ));
        assert_eq!(
            html,
            concat!(
                "<html><script/>",
                "<script src=\"//cdn/x.js\"/><script data-bundlescript=ignore src=b.js />",
                "<p>x</p><script src=\"bundle.js\"></script>\n</html>"
            )
        );
        assert_eq!(calls[0], vec!["a.js".to_string()]);
    }

    #[test]
    fn scripts_inside_noscript_stay_put() {
        let (html, calls) =
            run("<html><noscript><script src=\"a.js\"></script></noscript></html>");
        assert_eq!(
            html,
            "<html><noscript><script src=\"a.js\"></script></noscript><script src=\"bundle.js\"></script>\n</html>"
        );
        assert_eq!(calls, vec![Vec::<String>::new()]);
    }

    #[test]
    fn empty_comment_does_not_swallow_scripts() {
        let (html, calls) = run("<html><!--><script src=\"a.js\"></script><!-- x --></html>");
        assert_eq!(
            html,
            "<html><!--><!-- x --><script src=\"bundle.js\"></script>\n</html>"
        );
        assert_eq!(calls[0], vec!["a.js".to_string()]);
    }

    #[test]
    fn stray_script_end_tag_is_dropped() {
        let (html, _) = run("<html><p></script></p></html>");
        assert_eq!(html, "<html><p></p><script src=\"bundle.js\"></script>\n</html>");
    }

    #[test]
    fn only_first_closing_html_gets_bundle() {
        let (html, calls) = run("<html></html></html>");
        assert_eq!(html, "<html><script src=\"bundle.js\"></script>\n</html></html>");
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn missing_closing_html_skips_bundle() {
        let mut called = false;
        let outcome = rewrite(b"<p><script src=a.js></script></p>", "bundle.js", |_| {
            called = true;
            Ok::<_, Infallible>(())
        })
        .unwrap();
        assert!(!called);
        assert!(!outcome.bundle_injected);
        assert_eq!(outcome.html, b"<p></p>");
        assert_eq!(outcome.sources, vec!["a.js".to_string()]);
    }

    #[test]
    fn bundle_path_is_attribute_escaped() {
        let outcome = rewrite(b"<html></html>", "js/\"odd\".js", |_| {
            Ok::<_, Infallible>(())
        })
        .unwrap();
        assert_eq!(
            outcome.html,
            b"<html><script src=\"js/&quot;odd&quot;.js\"></script>\n</html>"
        );
    }

    #[test]
    fn bundler_error_aborts() {
        let result = rewrite(b"<html><script src=a.js></script></html>", "b.js", |_| {
            Err("boom")
        });
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[test]
    fn state_tracks_script_regions() {
        let mut rewriter = Rewriter::new("b.js");
        let mut bundle = |_: &[String]| Ok::<_, Infallible>(());
        let mut tokens = Tokenizer::new(b"<script src=a.js>x</script><script>y</script>");

        let mut step = |rewriter: &mut Rewriter<'_>| {
            let token = tokens.next().unwrap();
            rewriter.feed(&token, &mut bundle).unwrap();
            rewriter.state()
        };
        assert_eq!(step(&mut rewriter), ScriptState::InsideMerged);
        assert_eq!(step(&mut rewriter), ScriptState::InsideMerged);
        assert_eq!(step(&mut rewriter), ScriptState::Outside);
        assert_eq!(step(&mut rewriter), ScriptState::InsidePreserved);
        assert_eq!(step(&mut rewriter), ScriptState::InsidePreserved);
        assert_eq!(step(&mut rewriter), ScriptState::Outside);
    }
}
