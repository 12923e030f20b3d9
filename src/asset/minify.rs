//! Script and stylesheet minification.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Errors are returned as
//! plain messages so callers can attach the file and stage.

use lightningcss::stylesheet::{MinifyOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::Targets;
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::css::{CssError, parser_options};

/// Minify JavaScript source code.
pub fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
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
    Ok(code)
}

/// Remove `console.*` calls and `debugger` statements.
///
/// Output stays readable (no mangling, regular codegen).
pub fn strip_debug_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(err.to_string());
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: None,
        compress: Some(CompressOptions {
            drop_console: true,
            drop_debugger: true,
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code for the given browser targets.
pub fn minify_css(source: &str, filename: &str, targets: Targets) -> Result<String, CssError> {
    let mut stylesheet =
        StyleSheet::parse(source, parser_options(filename)).map_err(CssError::from_parse)?;
    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(CssError::from_other)?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(CssError::from_other)?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_js_shrinks() {
        let source = "function add(first, second) {\n  // sum\n  return first + second;\n}\nwindow.add = add;\n";
        let minified = minify_js(source).unwrap();
        assert!(minified.len() < source.len());
        assert!(!minified.contains("// sum"));
    }

    #[test]
    fn test_minify_js_syntax_error() {
        assert!(minify_js("function (").is_err());
    }

    #[test]
    fn test_strip_debug_removes_console_and_debugger() {
        let source = "function go(x) {\n  console.log('x', x);\n  debugger;\n  return x * 2;\n}\nwindow.go = go;\n";
        let stripped = strip_debug_js(source).unwrap();
        assert!(!stripped.contains("console"));
        assert!(!stripped.contains("debugger"));
        assert!(stripped.contains("window.go"));
    }

    #[test]
    fn test_minify_css_shrinks() {
        let source = ".a {\n  color: #ff0000;\n  margin: 0px 0px 0px 0px;\n}\n";
        let minified = minify_css(source, "a.css", Targets::default()).unwrap();
        assert!(minified.len() < source.len());
        assert!(!minified.contains('\n'));
    }
}
