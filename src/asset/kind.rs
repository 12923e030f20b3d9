//! Asset content type definitions.

/// Logical content type of an asset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Style,
    Script,
    Image,
    Font,
}

impl ContentType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Script => "script",
            Self::Image => "image",
            Self::Font => "font",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        assert_eq!(ContentType::Style.label(), "style");
        assert_eq!(ContentType::Font.label(), "font");
    }
}
