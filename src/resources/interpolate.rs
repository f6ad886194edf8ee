//! Placeholder substitution for translation templates
//!
//! Templates use double-brace placeholders, `"Hello, {{name}}!"`. Whitespace
//! inside the braces is ignored. Placeholders without a matching argument are
//! left in place so the gap stays visible. Values are inserted verbatim, with
//! no HTML escaping.

use std::borrow::Cow;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Substitute `{{name}}` placeholders from `args`
///
/// Returns the template unchanged (borrowed) when there is nothing to do.
pub fn interpolate<'a>(template: &'a str, args: &[(&str, &str)]) -> Cow<'a, str> {
    if args.is_empty() || !template.contains(OPEN) {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };

        out.push_str(&rest[..start]);
        let name = after_open[..end].trim();
        match args.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
        }
        rest = &after_open[end + CLOSE.len()..];
    }

    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_named_placeholders() {
        let out = interpolate("Hi {{name}}, {{count}} new", &[("name", "Ayu"), ("count", "3")]);
        assert_eq!(out, "Hi Ayu, 3 new");
    }

    #[test]
    fn test_whitespace_inside_braces() {
        assert_eq!(interpolate("{{ year }} ©", &[("year", "2025")]), "2025 ©");
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        assert_eq!(
            interpolate("{{greeting}}, {{name}}", &[("name", "Budi")]),
            "{{greeting}}, Budi"
        );
    }

    #[test]
    fn test_no_args_borrows() {
        let out = interpolate("Plain {{text}}", &[]);
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn test_unterminated_placeholder() {
        assert_eq!(interpolate("Oops {{name", &[("name", "x")]), "Oops {{name");
        assert_eq!(
            interpolate("{{name}} and {{rest", &[("name", "x")]),
            "x and {{rest"
        );
    }

    #[test]
    fn test_values_not_escaped() {
        assert_eq!(
            interpolate("{{tag}}", &[("tag", "<b>bold</b>")]),
            "<b>bold</b>"
        );
    }
}
