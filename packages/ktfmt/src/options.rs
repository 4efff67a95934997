use serde::{Deserialize, Serialize};

/// ktfmt's `FormattingOptions.Style`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeStyle {
    Facebook,
    Dropbox,
    Google,
}

/// The options object passed to ktfmt's `format(FormattingOptions, String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormattingOptions {
    pub style: CodeStyle,
    pub max_width: u32,
    pub block_indent: u32,
    pub continuation_indent: u32,
    pub remove_unused_imports: bool,
}

impl FormattingOptions {
    const MAX_WIDTH: u32 = 100;

    const fn preset(style: CodeStyle, indent: u32) -> Self {
        Self {
            style,
            max_width: Self::MAX_WIDTH,
            block_indent: indent,
            continuation_indent: indent,
            remove_unused_imports: true,
        }
    }

    /// ktfmt's own default, used by the single-argument `format`.
    #[must_use]
    pub const fn facebook() -> Self {
        Self::preset(CodeStyle::Facebook, 2)
    }

    /// `DROPBOX_FORMAT`
    #[must_use]
    pub const fn dropbox() -> Self {
        Self::preset(CodeStyle::Dropbox, 4)
    }

    /// `GOOGLE_FORMAT`
    #[must_use]
    pub const fn google() -> Self {
        Self::preset(CodeStyle::Google, 2)
    }

    /// `KOTLINLANG_FORMAT`: Google style with four space indents.
    #[must_use]
    pub const fn kotlinlang() -> Self {
        Self::preset(CodeStyle::Google, 4)
    }

    /// The ktfmt command line flag selecting these options.
    #[must_use]
    pub const fn cli_flag(&self) -> Option<&'static str> {
        match (self.style, self.block_indent) {
            (CodeStyle::Facebook, _) => None,
            (CodeStyle::Dropbox, _) => Some("--dropbox-style"),
            (CodeStyle::Google, 2) => Some("--google-style"),
            (CodeStyle::Google, _) => Some("--kotlinlang-style"),
        }
    }

    /// The preset that [`Self::cli_flag`] reproduces on the command line.
    #[must_use]
    pub const fn cli_preset(&self) -> Self {
        match (self.style, self.block_indent) {
            (CodeStyle::Facebook, _) => Self::facebook(),
            (CodeStyle::Dropbox, _) => Self::dropbox(),
            (CodeStyle::Google, 2) => Self::google(),
            (CodeStyle::Google, _) => Self::kotlinlang(),
        }
    }

    /// Whether passing [`Self::cli_flag`] alone reproduces every option.
    #[must_use]
    pub fn is_cli_preset(&self) -> bool {
        *self == self.cli_preset()
    }
}
