//! Package minification for scripts and stylesheets.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Minification is best
//! effort: input that fails to parse is returned unchanged by [`minify`].

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::MediaType;

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Option<String> {
    let allocator = Allocator::default();
    // Classic script: top-level declarations are globals other files use
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if !ret.errors.is_empty() {
        return None;
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Some(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Option<String> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default()).ok()?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .ok()?;
    Some(result.code)
}

/// Minify `source` for its media type, returning it unchanged if it does
/// not parse.
pub fn minify(kind: MediaType, source: &str) -> String {
    let minified = match kind {
        MediaType::Script => minify_js(source),
        MediaType::Style => minify_css(source),
    };
    minified.unwrap_or_else(|| source.to_string())
}

/// Check whether a URI names an already minified file (`app.min.js`).
pub fn is_minified(uri: &str) -> bool {
    let (stem, _) = super::buster::strip_extension(uri);
    stem.ends_with(".min")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify(MediaType::Style, "body {\n  color: red;\n}\n");
        assert_eq!(out, "body{color:red}");
    }

    #[test]
    fn test_minify_js_shrinks() {
        let source = "function add(first, second) {\n  return first + second;\n}\nconsole.log(add(1, 2));\n";
        let out = minify(MediaType::Script, source);
        assert!(out.len() < source.len());
        assert!(out.contains("console.log"));
    }

    #[test]
    fn test_minify_js_keeps_globals() {
        let source = "function formatPrice(amount) {\n  return '$' + amount.toFixed(2);\n}\nvar appVersion = '1.0';\n";
        let out = minify(MediaType::Script, source);
        assert!(out.contains("function formatPrice("), "{out}");
        assert!(out.contains("var appVersion="), "{out}");
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_invalid_input_unchanged() {
        let source = "function (";
        assert_eq!(minify(MediaType::Script, source), source);
    }

    #[test]
    fn test_is_minified() {
        assert!(is_minified("/js/jquery.min.js"));
        assert!(is_minified("/js/vendor/lib.min.js"));
        assert!(!is_minified("/js/app.js"));
        assert!(!is_minified("/js/admin.js"));
    }
}
