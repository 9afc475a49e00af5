use crate::prompts::CoursePrompt;

/// Instructor-provided material the student can pull up mid-conversation.
///
/// A closed set of tagged variants with one capability: `invoke` returns
/// the material text. No open-ended plugin dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseResource {
    /// Instructor's ideal summary of the week's learning materials.
    Exemplar(&'static str),
    /// The week's assignment text.
    Assignment(&'static str),
}

impl CourseResource {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exemplar(_) => "Exemplar",
            Self::Assignment(_) => "Assignment",
        }
    }

    #[must_use]
    pub fn invoke(&self) -> &'static str {
        match self {
            Self::Exemplar(text) | Self::Assignment(text) => text,
        }
    }
}

/// Materials available for a course script, in display order.
#[must_use]
pub fn resources_for(prompt: &CoursePrompt) -> Vec<CourseResource> {
    let mut resources = Vec::new();
    if let Some(text) = prompt.exemplar {
        resources.push(CourseResource::Exemplar(text));
    }
    if let Some(text) = prompt.assignment {
        resources.push(CourseResource::Assignment(text));
    }
    resources
}
