use crate::error::SqlAppenderError;

/// Target placeholder style for template translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

/// A template translated to one backend's placeholder style.
///
/// `order[k]` is the index of the configured binding that supplies the
/// value for ordinal `k + 1`. Each distinct placeholder name gets one
/// ordinal; repeating a name in the template reuses its ordinal.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedTemplate {
    pub sql: String,
    pub order: Vec<usize>,
}

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'-' && bytes.get(idx + 1) == Some(&b'-')
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'/' && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes[idx] == b'*' && bytes.get(idx + 1) == Some(&b'/')
}

fn scan_ident(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let mut idx = start;
    if idx >= bytes.len() || !(bytes[idx].is_ascii_alphabetic() || bytes[idx] == b'_') {
        return None;
    }
    while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
        idx += 1;
    }
    std::str::from_utf8(&bytes[start..idx])
        .ok()
        .map(|ident| (idx, ident))
}

/// Translate `@name` placeholders into positional ones for the target
/// backend, skipping quoted strings and comments via a lightweight
/// state machine.
///
/// `names` are the configured binding names (without the leading `@`),
/// in binding order; the returned `order` maps placeholder ordinals
/// back onto them. A placeholder with no matching binding is a
/// configuration error. The template author is trusted for everything
/// this scanner does not model (e.g. dialect-specific quoting).
///
/// # Errors
///
/// Returns `SqlAppenderError::ConfigError` for an unknown placeholder.
pub fn translate_named(
    sql: &str,
    target: PlaceholderStyle,
    names: &[&str],
) -> Result<TranslatedTemplate, SqlAppenderError> {
    let marker = match target {
        PlaceholderStyle::Postgres => b'$',
        PlaceholderStyle::Sqlite => b'?',
    };

    let mut out: Vec<u8> = Vec::with_capacity(sql.len());
    let mut order: Vec<usize> = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        let mut replaced = false;
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => state = State::BlockComment(1),
                b'@' => {
                    if let Some((ident_end, ident)) = scan_ident(bytes, idx + 1) {
                        let binding_idx = names.iter().position(|n| *n == ident).ok_or_else(
                            || {
                                SqlAppenderError::ConfigError(format!(
                                    "template placeholder @{ident} has no configured parameter"
                                ))
                            },
                        )?;
                        let ordinal = match order.iter().position(|&o| o == binding_idx) {
                            Some(existing) => existing + 1,
                            None => {
                                order.push(binding_idx);
                                order.len()
                            }
                        };
                        out.push(marker);
                        out.extend_from_slice(ordinal.to_string().as_bytes());
                        idx = ident_end - 1;
                        replaced = true;
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        out.push(b'\'');
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        out.push(b'"');
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                } else if is_block_comment_end(bytes, idx) {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                }
            }
        }

        if !replaced {
            out.push(b);
        }
        idx += 1;
    }

    // Splices only ever happen at ASCII boundaries, so this cannot fail.
    let sql = String::from_utf8(out)
        .map_err(|e| SqlAppenderError::Other(format!("template translation produced invalid UTF-8: {e}")))?;
    Ok(TranslatedTemplate { sql, order })
}
