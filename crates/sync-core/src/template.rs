//! `$name` / `${name}` placeholder substitution.
//!
//! Follows "safe substitution" rules: `$$` becomes a literal `$`, placeholders
//! without a value are left verbatim, and a `$` not followed by an identifier is
//! kept as is. Identifiers are ASCII letters, digits and `_`, not starting with
//! a digit.

/// Substitute placeholders using a lookup function.
pub fn substitute_with<F>(template: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
            continue;
        }

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                let name = &braced[..end];
                if is_identifier(name) {
                    match lookup(name) {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(&rest[pos..pos + 1 + 1 + end + 1]),
                    }
                    rest = &braced[end + 1..];
                    continue;
                }
            }
            out.push('$');
            rest = after;
            continue;
        }

        let len = identifier_len(after);
        if len == 0 {
            out.push('$');
            rest = after;
            continue;
        }
        let name = &after[..len];
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('$');
                out.push_str(name);
            }
        }
        rest = &after[len..];
    }

    out.push_str(rest);
    out
}

/// Substitute placeholders from `(name, value)` pairs.
///
/// ```
/// use sync_core::template::safe_substitute;
///
/// let sql = safe_substitute("(CAST($field->'$$.v' AS CHAR(128) ARRAY))", &[("field", "jansRedirectURI")]);
/// assert_eq!(sql, "(CAST(jansRedirectURI->'$.v' AS CHAR(128) ARRAY))");
/// ```
pub fn safe_substitute(template: &str, vars: &[(&str, &str)]) -> String {
    substitute_with(template, |name| {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    })
}

fn identifier_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let ok = c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit());
        if !ok {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && identifier_len(s) == s.len()
}
