//! Line terminator handling shared by the rewriters

/// Line terminator used by a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\r\n`, what the generator writes
    #[default]
    Crlf,
    /// `\n`
    Lf,
}

impl LineEnding {
    /// CRLF when present anywhere in `text`, LF otherwise
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }

    /// Terminator string
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crlf => "\r\n",
            Self::Lf => "\n",
        }
    }

    /// Split `text` into lines; a trailing terminator yields a final empty line
    pub fn split(self, text: &str) -> std::str::Split<'_, &'static str> {
        text.split(self.as_str())
    }

    /// Join lines back, inverse of [`LineEnding::split`]
    #[must_use]
    pub fn join<S: AsRef<str>>(self, lines: &[S]) -> String {
        let mut out = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.push_str(self.as_str());
            }
            out.push_str(line.as_ref());
        }
        out
    }
}
