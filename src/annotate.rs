// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Documentation comments generated per function
//!
//! Every function the regex detector finds is sent to the model on its own,
//! in a single-turn request with no shared history. The reply is turned into
//! `///` lines placed above the function's first line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::llm::provider::{ChatRequest, ChatTransport};
use crate::source::functions::find_functions;

/// Result of annotating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Annotated source
    pub code: String,
    /// Functions that received a comment
    pub documented: usize,
    /// Functions whose request failed
    pub failed: usize,
}

/// Asks a model for one documentation comment per function
pub struct DocAnnotator {
    transport: Arc<dyn ChatTransport>,
    model: String,
    language: String,
}

impl DocAnnotator {
    pub fn new(model: impl Into<String>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            model: model.into(),
            language: "Swift".to_string(),
        }
    }

    /// Language named in the request
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    fn prompt(&self, function_code: &str) -> String {
        format!(
            "Add a {} documentation comment above this function:\n\n{}",
            self.language, function_code
        )
    }

    /// Annotate every detected function in `code`.
    ///
    /// Text outside functions is kept as is. A failed request is logged and
    /// leaves its function without a comment.
    pub async fn annotate(&self, code: &str) -> Result<Annotation> {
        let spans = find_functions(code);
        let mut out = String::with_capacity(code.len() * 2);
        let mut cursor = 0;
        let mut documented = 0;
        let mut failed = 0;

        for span in &spans {
            let line_start = code[..span.start].rfind('\n').map_or(0, |i| i + 1);
            let indent: String = code[line_start..span.start]
                .chars()
                .take_while(|c| c.is_whitespace())
                .collect();

            let request = ChatRequest::single(&self.model, self.prompt(span.text(code)));
            let comment = match self.transport.send(&request).await {
                Ok(reply) => {
                    let comment = format_doc_comment(&reply, &indent);
                    if comment.is_empty() {
                        tracing::warn!("empty documentation reply for {}", span.name);
                        None
                    } else {
                        Some(comment)
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to document {}: {}", span.name, e);
                    None
                }
            };
            let Some(comment) = comment else {
                failed += 1;
                out.push_str(&code[cursor..span.end]);
                cursor = span.end;
                continue;
            };

            let lead = &code[line_start..span.start];
            if line_start >= cursor && is_declaration_lead(lead) {
                // Only modifiers precede `func` on its line
                out.push_str(&code[cursor..line_start]);
                out.push_str(&comment);
                out.push_str(&code[line_start..span.end]);
            } else {
                // Other code shares the line; move the function onto its own
                out.push_str(code[cursor..span.start].trim_end());
                out.push('\n');
                out.push_str(&comment);
                out.push_str(&indent);
                out.push_str(span.text(code));
            }
            documented += 1;
            cursor = span.end;
        }
        out.push_str(&code[cursor..]);

        tracing::info!(
            functions = spans.len(),
            documented,
            failed,
            "annotation finished"
        );
        Ok(Annotation {
            code: out,
            documented,
            failed,
        })
    }

    /// Annotate `input` and write the result to `output`
    pub async fn annotate_file(&self, input: &Path, output: &Path) -> Result<Annotation> {
        let code = std::fs::read_to_string(input)?;
        let annotation = self.annotate(&code).await?;
        std::fs::write(output, &annotation.code)?;
        Ok(annotation)
    }
}

/// Turn a model reply into `///` lines, each ending with a newline.
///
/// Code fences are dropped and blank edges trimmed; lines already starting
/// with `///` are kept as they are.
pub fn format_doc_comment(reply: &str, indent: &str) -> String {
    let lines: Vec<&str> = reply
        .trim()
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();

    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };

    let mut comment = String::new();
    for line in &lines[first..=last] {
        let line = line.trim_end();
        let trimmed = line.trim_start();
        comment.push_str(indent);
        if trimmed.starts_with("///") {
            comment.push_str(trimmed);
        } else if trimmed.is_empty() {
            comment.push_str("///");
        } else {
            comment.push_str("/// ");
            comment.push_str(line);
        }
        comment.push('\n');
    }
    comment
}

/// Whether `lead` holds nothing but indentation, attributes and modifiers
fn is_declaration_lead(lead: &str) -> bool {
    lead.chars()
        .all(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | '@' | '(' | ')'))
}

/// `annotated.<ext>` next to `input`
pub fn default_output_path(input: &Path) -> PathBuf {
    let name = match input.extension() {
        Some(ext) => format!("annotated.{}", ext.to_string_lossy()),
        None => "annotated".to_string(),
    };
    input.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::llm::mock_transport::MockTransport;

    const CODE: &str = "import Foundation\n\nfunc add(a: Int, b: Int) -> Int {\n    return a + b\n}\n\nlet x = 1\n\nstruct Math {\n    static func half(_ v: Int) -> Int {\n        v / 2\n    }\n}\n";

    fn annotator(transport: &MockTransport) -> DocAnnotator {
        DocAnnotator::new("llama3", Arc::new(transport.clone()))
    }

    #[test]
    fn test_format_doc_comment_prefixes_lines() {
        assert_eq!(
            format_doc_comment("  Adds two numbers.\nReturns the sum.  ", ""),
            "/// Adds two numbers.\n/// Returns the sum.\n"
        );
    }

    #[test]
    fn test_format_doc_comment_keeps_existing_prefix() {
        assert_eq!(
            format_doc_comment("/// Adds.\n///\n/// - Returns: sum", "    "),
            "    /// Adds.\n    ///\n    /// - Returns: sum\n"
        );
    }

    #[test]
    fn test_format_doc_comment_strips_fences() {
        assert_eq!(
            format_doc_comment("```swift\n/// Halves a value.\n```", ""),
            "/// Halves a value.\n"
        );
        assert_eq!(format_doc_comment("  \n ```\n```  ", ""), "");
    }

    #[test]
    fn test_format_doc_comment_blank_inner_line() {
        assert_eq!(
            format_doc_comment("Summary.\n\nDetails.", ""),
            "/// Summary.\n///\n/// Details.\n"
        );
    }

    #[tokio::test]
    async fn test_annotate_inserts_comments_and_keeps_other_text() {
        let transport = MockTransport::new().with_replies(["Adds a and b.", "Halves v."]);
        let annotation = annotator(&transport).annotate(CODE).await.unwrap();

        assert_eq!(annotation.documented, 2);
        assert_eq!(annotation.failed, 0);
        assert_eq!(
            annotation.code,
            "import Foundation\n\n/// Adds a and b.\nfunc add(a: Int, b: Int) -> Int {\n    return a + b\n}\n\nlet x = 1\n\nstruct Math {\n    /// Halves v.\n    static func half(_ v: Int) -> Int {\n        v / 2\n    }\n}\n"
        );
    }

    #[tokio::test]
    async fn test_each_function_is_a_single_turn_request() {
        let transport = MockTransport::new();
        annotator(&transport).annotate(CODE).await.unwrap();

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.messages.len(), 1);
            assert_eq!(request.model, "llama3");
        }
        assert_eq!(
            requests[0].last_content(),
            Some("Add a Swift documentation comment above this function:\n\nfunc add(a: Int, b: Int) -> Int {\n    return a + b\n}")
        );
    }

    #[tokio::test]
    async fn test_failed_request_leaves_function_undocumented() {
        let transport = MockTransport::new()
            .with_failure(ApiError::Timeout)
            .with_reply("Halves v.");
        let annotation = annotator(&transport).annotate(CODE).await.unwrap();

        assert_eq!(annotation.documented, 1);
        assert_eq!(annotation.failed, 1);
        assert!(annotation.code.contains("\n\nfunc add("));
        assert!(annotation.code.contains("    /// Halves v.\n    static func half"));
    }

    #[tokio::test]
    async fn test_functions_sharing_a_line_are_split() {
        let transport = MockTransport::new().with_replies(["Doc A.", "Doc B."]);
        let annotation = annotator(&transport)
            .annotate("func a() {}; func b() {}\n")
            .await
            .unwrap();

        assert_eq!(annotation.documented, 2);
        assert_eq!(
            annotation.code,
            "/// Doc A.\nfunc a() {};\n/// Doc B.\nfunc b() {}\n"
        );
    }

    #[tokio::test]
    async fn test_adjacent_functions_without_separator() {
        let transport = MockTransport::new().with_replies(["Doc A.", "Doc B."]);
        let annotation = annotator(&transport)
            .annotate("func a() {} func b() {}")
            .await
            .unwrap();

        assert_eq!(
            annotation.code,
            "/// Doc A.\nfunc a() {}\n/// Doc B.\nfunc b() {}"
        );
    }

    #[tokio::test]
    async fn test_statement_before_function_keeps_its_line() {
        let transport = MockTransport::new().with_reply("Doc F.");
        let annotation = annotator(&transport)
            .annotate("    let x = 1; func f() {}\n")
            .await
            .unwrap();

        assert_eq!(
            annotation.code,
            "    let x = 1;\n    /// Doc F.\n    func f() {}\n"
        );
    }

    #[tokio::test]
    async fn test_failed_request_on_shared_line_leaves_text_alone() {
        let transport = MockTransport::new()
            .with_reply("Doc A.")
            .with_failure(ApiError::Timeout);
        let annotation = annotator(&transport)
            .annotate("func a() {}; func b() {}\n")
            .await
            .unwrap();

        assert_eq!(annotation.failed, 1);
        assert_eq!(annotation.code, "/// Doc A.\nfunc a() {}; func b() {}\n");
    }

    #[tokio::test]
    async fn test_code_without_functions_is_unchanged() {
        let transport = MockTransport::new();
        let code = "let a = 1\nvar b = \"func\"\n";
        let annotation = annotator(&transport).annotate(code).await.unwrap();

        assert_eq!(annotation.code, code);
        assert_eq!(annotation.documented, 0);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_language_is_named_in_prompt() {
        let transport = MockTransport::new();
        annotator(&transport)
            .with_language("Kotlin")
            .annotate("func f() {}")
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert!(request
            .last_content()
            .unwrap()
            .starts_with("Add a Kotlin documentation comment"));
    }

    #[tokio::test]
    async fn test_annotate_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("test.swift");
        std::fs::write(&input, "func greet() {\n    print(\"hi\")\n}\n").unwrap();
        let output = default_output_path(&input);

        let transport = MockTransport::new().with_reply("Prints a greeting.");
        let annotation = annotator(&transport)
            .annotate_file(&input, &output)
            .await
            .unwrap();

        assert_eq!(output, dir.path().join("annotated.swift"));
        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written, annotation.code);
        assert!(written.starts_with("/// Prints a greeting.\nfunc greet()"));
    }

    #[test]
    fn test_default_output_path_without_extension() {
        assert_eq!(
            default_output_path(Path::new("/tmp/Makefile")),
            PathBuf::from("/tmp/annotated")
        );
    }
}
