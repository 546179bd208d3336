use once_cell::sync::Lazy;
use syntect::{
    highlighting::ThemeSet,
    html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};
use thiserror::Error;
use tracing::warn;

pub(crate) const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "syn-" };
const STYLESHEET_THEME: &str = "InspiredGitHub";

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static STYLESHEET: Lazy<String> = Lazy::new(|| {
    let themes = ThemeSet::load_defaults();
    let Some(theme) = themes.themes.get(STYLESHEET_THEME) else {
        warn!(
            target = "vgwritings::render::highlight",
            theme = STYLESHEET_THEME,
            "syntax theme missing from defaults"
        );
        return String::new();
    };
    css_for_theme_with_class_style(theme, CLASS_STYLE).unwrap_or_else(|err| {
        warn!(
            target = "vgwritings::render::highlight",
            error = %err,
            "failed to build syntax stylesheet"
        );
        String::new()
    })
});

#[derive(Debug, Error)]
#[error("failed to highlight `{language}`: {message}")]
pub(crate) struct HighlightError {
    pub(crate) language: String,
    pub(crate) message: String,
}

/// Stylesheet matching the classes emitted by [`highlight_code`].
pub fn stylesheet() -> &'static str {
    STYLESHEET.as_str()
}

pub(crate) fn highlight_code(language: &str, code: &str) -> Result<String, HighlightError> {
    let syntax_set = &*SYNTAX_SET;
    let syntax =
        find_syntax(syntax_set, language).unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut code_with_newline = code.to_string();
    if !code_with_newline.ends_with('\n') {
        code_with_newline.push('\n');
    }

    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(code_with_newline.as_str()) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .map_err(|err| HighlightError {
                language: language.to_string(),
                message: err.to_string(),
            })?;
    }

    let lang = language.to_ascii_lowercase();
    Ok(format!(
        "<pre class=\"syntax-highlight syntax-lang-{lang}\" data-language=\"{lang}\"><code class=\"language-{lang} syntax-code\">{}</code></pre>",
        generator.finalize()
    ))
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_is_tokenized() {
        let html = highlight_code("rust", "fn main() {}").expect("highlight");
        assert!(html.starts_with("<pre class=\"syntax-highlight syntax-lang-rust\""));
        assert!(html.contains("syn-"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        let html = highlight_code("klingon", "<b>qapla'</b>").expect("highlight");
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
