//! Types for the PostgrestClient

/// Options for returning data (`Prefer: return=...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOption {
    /// Return representation (the affected rows)
    Representation,
}

impl ReturnOption {
    /// Convert the option to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "representation",
        }
    }

    /// Value for the `Prefer` header
    pub fn prefer_header(&self) -> String {
        format!("return={}", self.as_str())
    }
}
