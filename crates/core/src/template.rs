//! Signature file naming.

use crate::error::SetupError;

/// Placeholder substituted with the input file path.
pub const FILE_PLACEHOLDER: &str = "%f";

/// Template deriving a signature path from an input path, e.g. `%f.sig`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureTemplate(String);

/// One input file and the signature file that belongs to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTask {
    pub file: String,
    pub signature: String,
}

impl SignatureTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, SetupError> {
        let template = template.into();
        if !template.contains(FILE_PLACEHOLDER) {
            return Err(SetupError::InvalidTemplate(template));
        }
        if template == FILE_PLACEHOLDER {
            return Err(SetupError::TemplateOverwritesInput(template));
        }
        Ok(Self(template))
    }

    /// Replace every `%f` with `file`.
    pub fn signature_path(&self, file: &str) -> String {
        self.0.replace(FILE_PLACEHOLDER, file)
    }

    pub fn task(&self, file: &str) -> FileTask {
        FileTask {
            file: file.to_string(),
            signature: self.signature_path(file),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SignatureTemplate {
    fn default() -> Self {
        Self(format!("{FILE_PLACEHOLDER}.sig"))
    }
}
