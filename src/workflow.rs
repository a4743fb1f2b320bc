//! The four analysis workflows and the payloads they send
//!
//! Each workflow has a submit-eligibility rule, a payload shape and an
//! endpoint. Code travels either inline or as a reference to a GitHub file the
//! backend fetches itself, never both.

use crate::selector::{CodeBuffer, RemoteFile};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowKind {
    ProjectIdea,
    #[default]
    CodeReview,
    TestGeneration,
    BugAnalysis,
}

impl WorkflowKind {
    /// Tab order
    pub const ALL: [WorkflowKind; 4] = [
        WorkflowKind::CodeReview,
        WorkflowKind::TestGeneration,
        WorkflowKind::BugAnalysis,
        WorkflowKind::ProjectIdea,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            WorkflowKind::ProjectIdea => "project-idea",
            WorkflowKind::CodeReview => "code-review",
            WorkflowKind::TestGeneration => "test-generation",
            WorkflowKind::BugAnalysis => "bug-analysis",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WorkflowKind::ProjectIdea => "Project Ideas",
            WorkflowKind::CodeReview => "Code Review",
            WorkflowKind::TestGeneration => "Generate Tests",
            WorkflowKind::BugAnalysis => "Bug Analysis",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            WorkflowKind::ProjectIdea => "Analyze Project",
            WorkflowKind::CodeReview => "Review Code",
            WorkflowKind::TestGeneration => "Generate Tests",
            WorkflowKind::BugAnalysis => "Analyze Bug",
        }
    }

    /// Path segments under the API base.
    pub fn endpoint_segments(&self) -> &'static [&'static str] {
        match self {
            WorkflowKind::ProjectIdea => &["analyze-project"],
            WorkflowKind::CodeReview => &["v2", "code-review"],
            WorkflowKind::TestGeneration => &["v2", "generate-tests"],
            WorkflowKind::BugAnalysis => &["v2", "analyze-bug"],
        }
    }

    /// Whether the workflow takes code (and therefore the GitHub picker).
    pub fn accepts_code(&self) -> bool {
        !matches!(self, WorkflowKind::ProjectIdea)
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|k| k == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Editable fields shown for this workflow, top to bottom.
    pub fn fields(&self) -> &'static [FormField] {
        match self {
            WorkflowKind::ProjectIdea => &[FormField::Idea],
            WorkflowKind::CodeReview => &[FormField::Language, FormField::Code, FormField::Context],
            WorkflowKind::TestGeneration => &[
                FormField::TestType,
                FormField::FeatureDescription,
                FormField::Code,
            ],
            WorkflowKind::BugAnalysis => &[
                FormField::BugDescription,
                FormField::ErrorLogs,
                FormField::Code,
            ],
        }
    }
}

pub const LANGUAGES: &[&str] = &[
    "auto-detect",
    "javascript",
    "typescript",
    "python",
    "java",
    "go",
    "rust",
];

pub const TEST_TYPES: &[&str] = &["all", "unit", "integration", "e2e"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Idea,
    Language,
    Code,
    Context,
    TestType,
    FeatureDescription,
    BugDescription,
    ErrorLogs,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Idea => "Project Idea",
            FormField::Language => "Language",
            FormField::Code => "Code",
            FormField::Context => "Context (optional)",
            FormField::TestType => "Test Type",
            FormField::FeatureDescription => "Feature Description",
            FormField::BugDescription => "Bug Description",
            FormField::ErrorLogs => "Error Logs",
        }
    }

    /// Choice fields cycle through a fixed list instead of taking text.
    pub fn choices(&self) -> Option<&'static [&'static str]> {
        match self {
            FormField::Language => Some(LANGUAGES),
            FormField::TestType => Some(TEST_TYPES),
            _ => None,
        }
    }
}

/// Everything the user has typed, across all workflows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowForms {
    pub idea: String,
    pub language: String,
    pub context: String,
    pub feature_description: String,
    pub test_type: String,
    pub bug_description: String,
    pub error_logs: String,
    /// Shared by every workflow that accepts code
    pub code: CodeBuffer,
}

impl Default for WorkflowForms {
    fn default() -> Self {
        Self {
            idea: String::new(),
            language: LANGUAGES[0].to_string(),
            context: String::new(),
            feature_description: String::new(),
            test_type: TEST_TYPES[0].to_string(),
            bug_description: String::new(),
            error_logs: String::new(),
            code: CodeBuffer::default(),
        }
    }
}

impl WorkflowForms {
    /// Current text of a field.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Idea => &self.idea,
            FormField::Language => &self.language,
            FormField::Code => self.code.text(),
            FormField::Context => &self.context,
            FormField::TestType => &self.test_type,
            FormField::FeatureDescription => &self.feature_description,
            FormField::BugDescription => &self.bug_description,
            FormField::ErrorLogs => &self.error_logs,
        }
    }

    /// Replace a text field. Code edits go through the buffer so a remote
    /// selection is detached rather than silently diverging.
    pub fn set_value(&mut self, field: FormField, value: String) {
        match field {
            FormField::Idea => self.idea = value,
            FormField::Language => self.language = value,
            FormField::Code => self.code.edit(value),
            FormField::Context => self.context = value,
            FormField::TestType => self.test_type = value,
            FormField::FeatureDescription => self.feature_description = value,
            FormField::BugDescription => self.bug_description = value,
            FormField::ErrorLogs => self.error_logs = value,
        }
    }

    /// Step a choice field forward or backward. No-op for text fields.
    pub fn cycle_choice(&mut self, field: FormField, forward: bool) {
        let Some(choices) = field.choices() else {
            return;
        };
        let current = self.value(field);
        let idx = choices.iter().position(|c| *c == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % choices.len()
        } else {
            (idx + choices.len() - 1) % choices.len()
        };
        self.set_value(field, choices[next].to_string());
    }

    /// Required-field predicate, ignoring whether a call is in flight.
    pub fn has_required_input(&self, kind: WorkflowKind) -> bool {
        match kind {
            WorkflowKind::ProjectIdea => !self.idea.trim().is_empty(),
            WorkflowKind::CodeReview => {
                self.code.is_remote() || !self.code.text().trim().is_empty()
            }
            WorkflowKind::TestGeneration => !self.feature_description.trim().is_empty(),
            WorkflowKind::BugAnalysis => !self.bug_description.trim().is_empty(),
        }
    }

    /// Build the request body for `kind`.
    pub fn build_payload(&self, kind: WorkflowKind) -> WorkflowPayload {
        match kind {
            WorkflowKind::ProjectIdea => WorkflowPayload::ProjectIdea {
                idea: self.idea.clone(),
            },
            WorkflowKind::CodeReview => WorkflowPayload::CodeReview {
                language: self.language.clone(),
                context: self.context.clone(),
                code: self.code.attachment(),
            },
            WorkflowKind::TestGeneration => WorkflowPayload::TestGeneration {
                feature_description: self.feature_description.clone(),
                test_type: self.test_type.clone(),
                code: self.code.attachment(),
            },
            WorkflowKind::BugAnalysis => WorkflowPayload::BugAnalysis {
                bug_description: self.bug_description.clone(),
                error_logs: self.error_logs.clone(),
                code: self.code.attachment(),
            },
        }
    }
}

/// How code rides along with a request. Serialized flattened, so it becomes
/// either a `code` key or a `github_auth` key on the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CodeAttachment {
    #[serde(rename = "code")]
    Inline(String),
    #[serde(rename = "github_auth")]
    Remote(RemoteFile),
}

/// Request body for one workflow call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WorkflowPayload {
    ProjectIdea {
        idea: String,
    },
    CodeReview {
        language: String,
        context: String,
        #[serde(flatten)]
        code: Option<CodeAttachment>,
    },
    TestGeneration {
        feature_description: String,
        test_type: String,
        #[serde(flatten)]
        code: Option<CodeAttachment>,
    },
    BugAnalysis {
        bug_description: String,
        error_logs: String,
        #[serde(flatten)]
        code: Option<CodeAttachment>,
    },
}

impl WorkflowPayload {
    pub fn kind(&self) -> WorkflowKind {
        match self {
            WorkflowPayload::ProjectIdea { .. } => WorkflowKind::ProjectIdea,
            WorkflowPayload::CodeReview { .. } => WorkflowKind::CodeReview,
            WorkflowPayload::TestGeneration { .. } => WorkflowKind::TestGeneration,
            WorkflowPayload::BugAnalysis { .. } => WorkflowKind::BugAnalysis,
        }
    }

    pub fn code(&self) -> Option<&CodeAttachment> {
        match self {
            WorkflowPayload::ProjectIdea { .. } => None,
            WorkflowPayload::CodeReview { code, .. }
            | WorkflowPayload::TestGeneration { code, .. }
            | WorkflowPayload::BugAnalysis { code, .. } => code.as_ref(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
