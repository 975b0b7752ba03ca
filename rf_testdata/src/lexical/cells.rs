//! Cell grouping
//!
//! Folds the raw lexical stream into cells, one line at a time. In the space
//! separated format a whitespace run separates cells when it holds a tab, is
//! two or more characters wide, or touches the start or end of the line. A line
//! whose first non-whitespace token is a pipe uses the pipe format instead:
//! only pipes with whitespace (or the line boundary) on both sides separate.
//! A cell that starts with `#` turns the rest of the line into one comment
//! cell. Line terminators pass through unchanged, so the cell stream still
//! concatenates back to the source.

use crate::logging::codes;
use crate::log_success;
use crate::tokens::{Token, TokenStream, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    SpaceSeparated,
    PipeSeparated,
}

/// Group a raw token stream into cells
pub fn group_cells(raw: &TokenStream) -> TokenStream {
    let tokens = raw.tokens();
    let mut cells = Vec::new();
    let mut line_start = 0;

    for (index, token) in tokens.iter().enumerate() {
        if token.token_type.is_line_terminator() {
            group_line(&tokens[line_start..index], &mut cells);
            cells.push(token.clone());
            line_start = index + 1;
        }
    }
    group_line(&tokens[line_start..], &mut cells);

    let stream = TokenStream::from_tokens(cells);
    log_success!(
        codes::success::CELL_GROUPING_COMPLETE,
        "Cell grouping completed",
        "raw_tokens" => raw.len(),
        "cells" => stream.count_of(TokenType::Cell),
        "comment_cells" => stream.count_of(TokenType::CommentCell)
    );
    stream
}

/// Format of one line of raw tokens (terminator excluded)
pub fn line_format(line: &[Token]) -> LineFormat {
    match line.iter().find(|t| !t.token_type.is_whitespace()) {
        Some(token) if token.is(TokenType::Pipe) => LineFormat::PipeSeparated,
        _ => LineFormat::SpaceSeparated,
    }
}

fn group_line(line: &[Token], cells: &mut Vec<Token>) {
    if line.is_empty() {
        return;
    }

    let separators = match line_format(line) {
        LineFormat::SpaceSeparated => space_separators(line),
        LineFormat::PipeSeparated => pipe_separators(line),
    };

    let mut index = 0;
    while index < line.len() {
        let is_separator = separators[index];
        let mut end = index + 1;
        while end < line.len() && separators[end] == is_separator {
            end += 1;
        }

        if is_separator {
            // Adjacent pipe separators collapse into one token, so an empty
            // pipe cell (`| a | | b |`) leaves no `Cell` behind. Only the pipe
            // count in the separator text records it.
            cells.push(merge(&line[index..end], TokenType::CellSeparator));
        } else if line[index].token_type.is_comment_marker() {
            cells.push(merge(&line[index..], TokenType::CommentCell));
            return;
        } else {
            cells.push(merge(&line[index..end], TokenType::Cell));
        }
        index = end;
    }
}

fn space_separators(line: &[Token]) -> Vec<bool> {
    let mut separators = vec![false; line.len()];
    let mut index = 0;

    while index < line.len() {
        if !line[index].token_type.is_whitespace() {
            index += 1;
            continue;
        }

        let start = index;
        while index < line.len() && line[index].token_type.is_whitespace() {
            index += 1;
        }
        let run = &line[start..index];
        let width: usize = run.iter().map(|t| t.text.chars().count()).sum();
        let has_tab = run.iter().any(|t| t.is(TokenType::Tab));

        if start == 0 || index == line.len() || width >= 2 || has_tab {
            separators[start..index].fill(true);
        }
    }

    separators
}

fn pipe_separators(line: &[Token]) -> Vec<bool> {
    let mut separators = vec![false; line.len()];
    let is_ws = |i: usize| line[i].token_type.is_whitespace();

    for (index, token) in line.iter().enumerate() {
        if !token.is(TokenType::Pipe) {
            continue;
        }
        let left_open = index == 0 || is_ws(index - 1);
        let right_open = index + 1 == line.len() || is_ws(index + 1);
        if !(left_open && right_open) {
            continue;
        }

        separators[index] = true;
        let mut left = index;
        while left > 0 && is_ws(left - 1) {
            left -= 1;
            separators[left] = true;
        }
        let mut right = index + 1;
        while right < line.len() && is_ws(right) {
            separators[right] = true;
            right += 1;
        }
    }

    // Trailing whitespace never belongs to a cell
    let mut tail = line.len();
    while tail > 0 && is_ws(tail - 1) {
        tail -= 1;
        separators[tail] = true;
    }

    separators
}

fn merge(run: &[Token], token_type: TokenType) -> Token {
    let text: String = run.iter().map(|t| t.text.as_str()).collect();
    Token::new(token_type, text, run[0].start, run[run.len() - 1].end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::lex;

    fn cells(input: &str) -> Vec<(TokenType, String)> {
        let raw = lex(input).unwrap().tokens;
        group_cells(&raw)
            .iter()
            .map(|t| (t.token_type, t.text.clone()))
            .collect()
    }

    fn data_cells(input: &str) -> Vec<String> {
        cells(input)
            .into_iter()
            .filter(|(t, _)| *t == TokenType::Cell)
            .map(|(_, text)| text)
            .collect()
    }

    #[test]
    fn test_two_spaces_separate() {
        assert_eq!(
            data_cells("Variables    vars.py  arg1  arg2"),
            vec!["Variables", "vars.py", "arg1", "arg2"]
        );
    }

    #[test]
    fn test_single_space_stays_inside_cell() {
        assert_eq!(
            data_cells("*** Settings ***"),
            vec!["*** Settings ***"]
        );
        assert_eq!(
            data_cells("Library  OperatingSystem  WITH NAME  OS"),
            vec!["Library", "OperatingSystem", "WITH NAME", "OS"]
        );
    }

    #[test]
    fn test_tab_separates() {
        assert_eq!(data_cells("Resource\tcommon.resource"), vec!["Resource", "common.resource"]);
    }

    #[test]
    fn test_leading_whitespace_is_separator() {
        let grouped = cells(" ...  arg3");
        assert_eq!(grouped[0], (TokenType::CellSeparator, " ".to_string()));
        assert_eq!(grouped[1], (TokenType::Cell, "...".to_string()));
    }

    #[test]
    fn test_pipe_format() {
        assert_eq!(
            data_cells("| Library | Collections | a|b |"),
            vec!["Library", "Collections", "a|b"]
        );
        assert_eq!(
            data_cells("| Variables | my vars.py |"),
            vec!["Variables", "my vars.py"]
        );
    }

    #[test]
    fn test_empty_pipe_cell_collapses_into_separator() {
        let grouped = cells("| Library | | arg |");
        assert_eq!(
            grouped,
            vec![
                (TokenType::CellSeparator, "| ".to_string()),
                (TokenType::Cell, "Library".to_string()),
                (TokenType::CellSeparator, " | | ".to_string()),
                (TokenType::Cell, "arg".to_string()),
                (TokenType::CellSeparator, " |".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_takes_rest_of_line() {
        let grouped = cells("Library  OS  # pinned  for now\nResource  x");
        assert!(grouped.contains(&(TokenType::CommentCell, "# pinned  for now".to_string())));
        assert!(grouped.contains(&(TokenType::LineFeed, "\n".to_string())));
        assert_eq!(grouped.last().unwrap(), &(TokenType::Cell, "x".to_string()));
    }

    #[test]
    fn test_hash_inside_cell_is_not_comment() {
        assert_eq!(data_cells("Library  a#b"), vec!["Library", "a#b"]);
    }

    #[test]
    fn test_cell_positions() {
        let raw = lex("Library  OS").unwrap().tokens;
        let grouped = group_cells(&raw);
        let os = &grouped.tokens()[2];
        assert_eq!(os.text, "OS");
        assert_eq!((os.start.line, os.start.column), (1, 10));
        assert_eq!((os.end.line, os.end.column), (1, 12));
    }

    #[test]
    fn test_cell_stream_round_trips() {
        let input = "*** Settings ***\r\nLibrary    OS    # c\n| Resource | r.resource |  \n\n...\targ\n";
        let raw = lex(input).unwrap().tokens;
        let grouped = group_cells(&raw);
        assert_eq!(grouped.text(), input);
        assert!(crate::tokens::stream::validation::validate_token_stream(&grouped).is_ok());
    }

    #[test]
    fn test_empty_input() {
        let raw = lex("").unwrap().tokens;
        assert!(group_cells(&raw).is_empty());
    }
}
