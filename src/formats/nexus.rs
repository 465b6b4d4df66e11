//! NEXUS alignment parser and writer.
//!
//! Supports the DATA and CHARACTERS blocks used for sequence
//! alignments:
//! ```text
//! #NEXUS
//! BEGIN DATA;
//!   DIMENSIONS NTAX=3 NCHAR=10;
//!   FORMAT DATATYPE=DNA MISSING=? GAP=-;
//!   MATRIX
//!     seq1 ACGTACGTAC
//!     seq2 TGCATGCATG
//!     seq3 AAAACCCCGG
//!   ;
//! END;
//! ```
//!
//! ## Supported Features
//!
//! - DATA and CHARACTERS blocks
//! - DIMENSIONS command (NTAX, NCHAR)
//! - FORMAT command (DATATYPE, MISSING, GAP, INTERLEAVE)
//! - MATRIX command (sequential and interleaved)
//! - Bracket comments and quoted taxon labels
//!
//! NCHAR is required: the trimming pipeline leans on the rectangular
//! invariant, so every sequence is validated against it at parse time.
//! MISSING and GAP symbols default to `?` and `-` when the FORMAT
//! command omits them.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Alignment, Sequence, DEFAULT_GAP, DEFAULT_MISSING};

/// Errors that can occur during NEXUS parsing.
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("not a NEXUS file (must start with #NEXUS)")]
    NotNexus,

    #[error("empty NEXUS file")]
    EmptyFile,

    #[error("no DATA or CHARACTERS block found")]
    NoDataBlock,

    #[error("missing MATRIX command in data block")]
    MissingMatrix,

    #[error("unterminated MATRIX (missing ';')")]
    UnterminatedMatrix,

    #[error("MATRIX holds no sequences")]
    EmptyMatrix,

    #[error("NCHAR not specified in DIMENSIONS")]
    MissingNchar,

    #[error("invalid {name} value '{value}' in DIMENSIONS")]
    InvalidDimension { name: &'static str, value: String },

    #[error("duplicate taxon label '{0}'")]
    DuplicateTaxon(String),

    #[error("expected {expected} taxa (NTAX), found {found}")]
    TaxonCountMismatch { expected: usize, found: usize },

    #[error("taxon '{taxon}' has {found} characters, expected {expected} (NCHAR)")]
    LengthMismatch {
        taxon: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for NEXUS operations.
pub type NexusResult<T> = Result<T, NexusError>;

/// Parses NEXUS content from a string.
pub fn parse_nexus_str(content: &str) -> NexusResult<Alignment> {
    let first_non_empty = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .ok_or(NexusError::EmptyFile)?;
    if !first_non_empty.trim().to_ascii_uppercase().starts_with("#NEXUS") {
        return Err(NexusError::NotNexus);
    }

    let block = data_block(content).ok_or(NexusError::NoDataBlock)?;
    parse_data_block(&block)
}

/// Serializes an alignment as a NEXUS DATA block.
///
/// Taxon labels are padded to a common width; labels containing
/// whitespace are single-quoted. An alignment with no taxa serializes
/// to an empty matrix (NTAX=0).
pub fn write_nexus_str(alignment: &Alignment) -> String {
    let labels: Vec<String> = alignment
        .sequences
        .iter()
        .map(|s| quote_label(&s.id))
        .collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str("#NEXUS\n");
    out.push_str("BEGIN DATA;\n");
    out.push_str(&format!(
        "    DIMENSIONS NTAX={} NCHAR={};\n",
        alignment.taxon_count(),
        alignment.nchar
    ));
    out.push_str(&format!(
        "    FORMAT DATATYPE={} MISSING={} GAP={};\n",
        alignment.datatype, alignment.missing as char, alignment.gap as char
    ));
    out.push_str("    MATRIX\n");
    for (label, seq) in labels.iter().zip(&alignment.sequences) {
        out.push_str(&format!(
            "        {:<width$} {}\n",
            label,
            seq.as_str(),
            width = width
        ));
    }
    out.push_str("    ;\nEND;\n");
    out
}

/// Single-quotes a taxon label when NEXUS requires it.
fn quote_label(label: &str) -> String {
    if label.chars().any(|c| c.is_whitespace()) {
        format!("'{}'", label)
    } else {
        label.to_string()
    }
}

/// Extracts the lines of the first DATA or CHARACTERS block.
fn data_block(content: &str) -> Option<String> {
    let mut in_block = false;
    let mut block_lines: Vec<&str> = Vec::new();

    for line in content.lines() {
        let upper = line.trim().to_ascii_uppercase();
        if !in_block {
            if upper.starts_with("BEGIN")
                && (upper.contains("DATA") || upper.contains("CHARACTERS"))
            {
                in_block = true;
            }
        } else {
            // "END" must stand alone: taxon labels may start with it.
            if upper == "END" || upper.starts_with("END;") || upper.starts_with("END ") {
                break;
            }
            block_lines.push(line);
        }
    }

    in_block.then(|| block_lines.join("\n"))
}

/// Parses the content of a DATA or CHARACTERS block.
fn parse_data_block(block: &str) -> NexusResult<Alignment> {
    let clean = strip_comments(block);
    let (commands, trailing) = split_commands(&clean);

    let mut ntax: Option<usize> = None;
    let mut nchar: Option<usize> = None;
    let mut missing = DEFAULT_MISSING;
    let mut gap = DEFAULT_GAP;
    let mut datatype = String::from("DNA");
    let mut interleave = false;
    let mut matrix: Option<Vec<Token>> = None;

    for command in &commands {
        let keyword = command
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        match keyword.as_str() {
            "DIMENSIONS" => {
                ntax = parse_dimension(command, "NTAX")?;
                nchar = parse_dimension(command, "NCHAR")?;
            }
            "FORMAT" => {
                if let Some(value) = extract_param(command, "DATATYPE") {
                    datatype = value.to_ascii_uppercase();
                }
                if let Some(value) = extract_param(command, "MISSING") {
                    if let Some(&symbol) = value.as_bytes().first() {
                        missing = symbol;
                    }
                }
                if let Some(value) = extract_param(command, "GAP") {
                    if let Some(&symbol) = value.as_bytes().first() {
                        gap = symbol;
                    }
                }
                interleave = command.to_ascii_uppercase().contains("INTERLEAVE");
            }
            "MATRIX" => {
                let upper = command.to_ascii_uppercase();
                let idx = upper.find("MATRIX").unwrap_or(0);
                matrix = Some(tokenize(&command[idx + "MATRIX".len()..]));
            }
            _ => {}
        }
    }

    let tokens = match matrix {
        Some(tokens) => tokens,
        // A MATRIX left open runs to the end of the block and never
        // lands in `commands`.
        None if trailing
            .trim_start()
            .to_ascii_uppercase()
            .starts_with("MATRIX") =>
        {
            return Err(NexusError::UnterminatedMatrix)
        }
        None => return Err(NexusError::MissingMatrix),
    };

    let nchar = nchar.ok_or(NexusError::MissingNchar)?;
    let rows = if interleave {
        parse_interleaved(&tokens)
    } else {
        parse_sequential(&tokens, nchar)
    };

    build_alignment(rows, ntax, nchar, missing, gap, datatype)
}

/// Parses one NTAX/NCHAR value out of a DIMENSIONS command.
fn parse_dimension(command: &str, name: &'static str) -> NexusResult<Option<usize>> {
    match extract_param(command, name) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| NexusError::InvalidDimension {
                name,
                value: value.to_string(),
            }),
    }
}

/// Extracts a `KEY=value` parameter from a command, matching the key
/// case-insensitively while preserving the value's case.
fn extract_param<'a>(command: &'a str, key: &str) -> Option<&'a str> {
    let upper = command.to_ascii_uppercase();
    let idx = upper.find(key)?;
    let after = &command[idx + key.len()..];
    let eq_idx = after.find('=')?;
    let after_eq = after[eq_idx + 1..].trim_start();
    let end = after_eq
        .find(|c: char| c.is_whitespace())
        .unwrap_or(after_eq.len());
    let value = &after_eq[..end];
    (!value.is_empty()).then_some(value)
}

/// Removes bracket comments, quote-aware, preserving line structure.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if depth > 0 {
            match c {
                '[' => depth += 1,
                ']' => depth -= 1,
                // Keep newlines so token line grouping survives
                // comments that span lines.
                '\n' => out.push('\n'),
                _ => {}
            }
            continue;
        }
        match c {
            '[' => depth += 1,
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Splits block text into `;`-terminated commands (quote-aware).
/// Returns the commands plus any unterminated trailing text.
fn split_commands(text: &str) -> (Vec<String>, String) {
    let mut commands = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            ';' => commands.push(std::mem::take(&mut current)),
            '\'' | '"' => {
                quote = Some(c);
                current.push(c);
            }
            _ => current.push(c),
        }
    }

    (commands, current)
}

/// A matrix token with the (block-relative) line it appeared on.
struct Token {
    text: String,
    line: usize,
}

/// Splits matrix text into whitespace-separated tokens. Quoted tokens
/// may contain whitespace; quotes are stripped.
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_line = 0usize;
    let mut line = 0usize;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                tokens.push(Token {
                    text: std::mem::take(&mut current),
                    line: current_line,
                });
            } else {
                current.push(c);
            }
            if c == '\n' {
                line += 1;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                if !current.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        line: current_line,
                    });
                }
                quote = Some(c);
                current_line = line;
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        line: current_line,
                    });
                }
                if c == '\n' {
                    line += 1;
                }
            }
            _ => {
                if current.is_empty() {
                    current_line = line;
                }
                current.push(c);
            }
        }
    }
    if !current.is_empty() {
        tokens.push(Token {
            text: current,
            line: current_line,
        });
    }

    tokens
}

/// Parses sequential-format tokens: each taxon label is followed by
/// residue chunks until NCHAR characters are collected (chunks may
/// span lines).
fn parse_sequential(tokens: &[Token], nchar: usize) -> Vec<(String, Vec<u8>)> {
    let mut rows: Vec<(String, Vec<u8>)> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let name = tokens[i].text.clone();
        i += 1;
        let mut data = Vec::with_capacity(nchar);
        while i < tokens.len() && data.len() < nchar {
            data.extend_from_slice(tokens[i].text.as_bytes());
            i += 1;
        }
        rows.push((name, data));
    }

    rows
}

/// Parses interleaved-format tokens: every matrix line starts with a
/// taxon label, and labels repeat across blocks.
fn parse_interleaved(tokens: &[Token]) -> Vec<(String, Vec<u8>)> {
    let mut rows: Vec<(String, Vec<u8>)> = Vec::new();
    let mut current_line = usize::MAX;
    let mut row_idx = 0usize;

    for token in tokens {
        if token.line != current_line {
            current_line = token.line;
            row_idx = match rows.iter().position(|(name, _)| *name == token.text) {
                Some(idx) => idx,
                None => {
                    rows.push((token.text.clone(), Vec::new()));
                    rows.len() - 1
                }
            };
        } else {
            rows[row_idx].1.extend_from_slice(token.text.as_bytes());
        }
    }

    rows
}

/// Validates parsed rows and assembles the alignment.
fn build_alignment(
    rows: Vec<(String, Vec<u8>)>,
    ntax: Option<usize>,
    nchar: usize,
    missing: u8,
    gap: u8,
    datatype: String,
) -> NexusResult<Alignment> {
    if rows.is_empty() {
        return Err(NexusError::EmptyMatrix);
    }
    if let Some(expected) = ntax {
        if rows.len() != expected {
            return Err(NexusError::TaxonCountMismatch {
                expected,
                found: rows.len(),
            });
        }
    }

    let mut seen = HashSet::new();
    for (name, data) in &rows {
        if !seen.insert(name.as_str()) {
            return Err(NexusError::DuplicateTaxon(name.clone()));
        }
        if data.len() != nchar {
            return Err(NexusError::LengthMismatch {
                taxon: name.clone(),
                expected: nchar,
                found: data.len(),
            });
        }
    }

    let sequences = rows
        .into_iter()
        .map(|(name, data)| Sequence::from_bytes(name, data))
        .collect();
    Ok(Alignment {
        sequences,
        nchar,
        missing,
        gap,
        datatype,
    })
}
