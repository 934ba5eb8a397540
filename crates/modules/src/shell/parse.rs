//! Parser for the `sh` code module tools print
//!
//! Module tools do not change the caller's environment themselves; they print
//! shell statements for the caller to evaluate. Only the statements that touch
//! variables matter here:
//!
//! ```text
//! PATH=/opt/gcc/bin:/usr/bin ;export PATH;
//! LOADEDMODULES='gcc/7.3.0';
//! export LOADEDMODULES;
//! unset GCC_OLD;
//! ```
//!
//! Anything else (aliases, function definitions, `test 0;`) is skipped.

use tracing::trace;

/// A variable change requested by a module tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    Set { name: String, value: String },
    Unset { name: String },
}

/// Parse module tool output into the variable changes it requests, in order
#[must_use]
pub fn parse_shell_output(output: &str) -> Vec<ShellAction> {
    let mut actions = Vec::new();
    for statement in split_statements(output) {
        let words = split_words(&statement);
        let Some((first, rest)) = words.split_first() else {
            continue;
        };

        match first.as_str() {
            // `unset -f` removes shell functions, not variables
            "unset" if rest.first().is_some_and(|flag| flag == "-f") => {}
            "unset" => actions.extend(
                rest.iter()
                    .filter(|word| !word.starts_with('-') && is_var_name(word))
                    .map(|name| ShellAction::Unset { name: name.clone() }),
            ),
            "export" => actions.extend(rest.iter().filter_map(|word| assignment(word))),
            _ => match assignment(first) {
                Some(action) if rest.is_empty() => actions.push(action),
                _ => trace!(statement = %statement, "skipping module tool statement"),
            },
        }
    }
    actions
}

fn assignment(word: &str) -> Option<ShellAction> {
    let (name, value) = word.split_once('=')?;
    is_var_name(name).then(|| ShellAction::Set {
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split on unquoted `;` and newlines, keeping quotes intact for word splitting
fn split_statements(output: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = output.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, ';' | '\n') => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_string());
                }
                current.clear();
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                current.push(c);
            }
            (Some(q), _) if c == q => {
                quote = None;
                current.push(c);
            }
            (None | Some('"'), '\\') => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }
    statements
}

/// Split a statement into words, removing quotes and backslash escapes
fn split_words(statement: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = statement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for inner in chars.by_ref() {
                    if inner == '\'' {
                        break;
                    }
                    current.push(inner);
                }
            }
            '"' => {
                in_word = true;
                while let Some(inner) = chars.next() {
                    match inner {
                        '"' => break,
                        '\\' => match chars.peek() {
                            Some(&next @ ('"' | '\\' | '$' | '`')) => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        _ => current.push(inner),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            _ => {
                in_word = true;
                current.push(c);
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(name: &str, value: &str) -> ShellAction {
        ShellAction::Set {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_tmod_style_output() {
        let out = "PATH=/opt/gcc/bin:/usr/bin ;export PATH;\nLOADEDMODULES=gcc/7.3.0 ;export LOADEDMODULES;\n";
        assert_eq!(
            parse_shell_output(out),
            vec![
                set("PATH", "/opt/gcc/bin:/usr/bin"),
                set("LOADEDMODULES", "gcc/7.3.0"),
            ]
        );
    }

    #[test]
    fn test_lmod_style_output() {
        let out = "LOADEDMODULES=\"gcc/7.3.0\";\nexport LOADEDMODULES;\nunset GCC_OLD;\n__LMOD_REF_COUNT_PATH='/opt/gcc/bin:1';\nexport __LMOD_REF_COUNT_PATH;\n";
        assert_eq!(
            parse_shell_output(out),
            vec![
                set("LOADEDMODULES", "gcc/7.3.0"),
                ShellAction::Unset {
                    name: "GCC_OLD".to_string()
                },
                set("__LMOD_REF_COUNT_PATH", "/opt/gcc/bin:1"),
            ]
        );
    }

    #[test]
    fn test_quoted_semicolons_and_escapes() {
        let out = r#"MSG='a;b' ;export MSG; GREETING=hello\ world; Q="say \"hi\"";"#;
        assert_eq!(
            parse_shell_output(out),
            vec![
                set("MSG", "a;b"),
                set("GREETING", "hello world"),
                set("Q", "say \"hi\""),
            ]
        );
    }

    #[test]
    fn test_skips_unrelated_statements() {
        let out = "test 0;\nalias ll='ls -l';\nexport FOO=bar;\n";
        assert_eq!(parse_shell_output(out), vec![set("FOO", "bar")]);
    }

    #[test]
    fn test_unset_function_statement_skipped() {
        let out = "unset -f module_fn; unset A B;";
        assert_eq!(
            parse_shell_output(out),
            vec![
                ShellAction::Unset {
                    name: "A".to_string()
                },
                ShellAction::Unset {
                    name: "B".to_string()
                },
            ]
        );
    }
}
