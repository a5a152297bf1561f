use crate::Statement;
use crate::parser::error::ParseError;
use crate::parser::sentence::parse_terms;

/// Lines starting with this char (after indentation) are skipped.
const COMMENT_PREFIX: char = '#';

/// Split a source into one sentence per line and parse each.
///
/// Blank and comment lines are skipped. Every line is parsed even after a
/// failure so the caller sees all errors at once.
pub fn parse_statements(
    source: &str,
    base_offset: usize,
    file_id: usize,
) -> Result<Vec<Statement>, Vec<ParseError>> {
    let mut statements = Vec::new();
    let mut errors = Vec::new();
    let mut line_start = 0;

    for (index, raw_line) in source.split_inclusive('\n').enumerate() {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let offset = base_offset + line_start;
        line_start += raw_line.len();

        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }

        match parse_terms(line, offset, file_id) {
            Ok(terms) => statements.push(Statement {
                terms,
                span: offset..offset + line.len(),
                line: index + 1,
            }),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(statements)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn skips_blank_and_comment_lines() {
        let source = "# greeting\n\nv(print) o(\"hi\")\n   \n  # done\n";
        let statements = parse_statements(source, 0, 0).unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].line, 3);
        assert_eq!(statements[0].span, 12..28);
    }

    #[test]
    fn crlf_line_endings() {
        let source = "v(print)\r\no(\"x\") v(print)\r\n";
        let statements = parse_statements(source, 0, 0).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].span, 10..25);
        assert_eq!(statements[1].terms[0].node, Term::direct_object("\"x\""));
    }

    #[test]
    fn collects_every_bad_line() {
        let source = "v(print)\nnoun(x)\nv(print) o(\"ok\")\nverb(\n";
        let errors = parse_statements(source, 0, 0).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].span, 9..13);
        assert_eq!(errors[1].fragment, "verb(");
    }
}
