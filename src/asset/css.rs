//! Stylesheet rewriting with lightningcss: vendor prefixing and media query
//! combining.

use std::fmt;

use lightningcss::error::{Error, ErrorLocation};
use lightningcss::rules::CssRule;
use lightningcss::rules::media::MediaRule;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use lightningcss::traits::ToCss;

/// A lightningcss failure, detached from the borrowed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssError {
    pub message: String,
    /// 1-based line, when known
    pub line: Option<usize>,
}

impl CssError {
    pub(crate) fn from_parse<T: fmt::Display>(err: Error<T>) -> Self {
        Self {
            line: line_of(err.loc.as_ref()),
            message: err.kind.to_string(),
        }
    }

    pub(crate) fn from_other<T: fmt::Display>(err: Error<T>) -> Self {
        Self::from_parse(err)
    }
}

impl fmt::Display for CssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn line_of(loc: Option<&ErrorLocation>) -> Option<usize> {
    loc.map(|l| l.line as usize + 1)
}

pub(crate) fn parser_options<'i>(filename: &str) -> ParserOptions<'i> {
    ParserOptions {
        filename: filename.to_string(),
        ..ParserOptions::default()
    }
}

/// Encode `major[.minor[.patch]]` the way lightningcss expects
/// (`major << 16 | minor << 8 | patch`).
pub fn encode_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if parts.next().is_some() || major > 0xff || minor > 0xff || patch > 0xff {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

/// Build browser targets from `(browser, version)` pairs.
///
/// Returns the name of the first unknown browser or malformed version.
pub fn browsers_from_pairs<'a, I>(pairs: I) -> Result<Browsers, String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut browsers = Browsers::default();
    for (name, version) in pairs {
        let encoded = encode_version(version).ok_or_else(|| format!("{name} = \"{version}\""))?;
        let slot = match name {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios" | "ios_saf" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            _ => return Err(name.to_string()),
        };
        *slot = Some(encoded);
    }
    Ok(browsers)
}

/// Add the vendor prefixes the targets need. Output stays pretty-printed.
pub fn prefix_css(source: &str, filename: &str, targets: Targets) -> Result<String, CssError> {
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
            targets,
            ..PrinterOptions::default()
        })
        .map_err(CssError::from_other)?;
    Ok(result.code)
}

/// Merge every `@media` block with an identical query into one block and
/// move the merged blocks after the plain rules, in order of first
/// appearance.
pub fn combine_media_queries(source: &str, filename: &str) -> Result<String, CssError> {
    let mut stylesheet =
        StyleSheet::parse(source, parser_options(filename)).map_err(CssError::from_parse)?;

    let rules = std::mem::take(&mut stylesheet.rules.0);
    let mut plain = Vec::with_capacity(rules.len());
    let mut media: Vec<(String, MediaRule<'_, _>)> = Vec::new();

    for rule in rules {
        match rule {
            CssRule::Media(block) => {
                let key = block
                    .query
                    .to_css_string(PrinterOptions::default())
                    .map_err(CssError::from_other)?;
                match media.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, existing)) => existing.rules.0.extend(block.rules.0),
                    None => media.push((key, block)),
                }
            }
            other => plain.push(other),
        }
    }

    plain.extend(media.into_iter().map(|(_, block)| CssRule::Media(block)));
    stylesheet.rules.0 = plain;

    let result = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(CssError::from_other)?;
    Ok(result.code)
}
