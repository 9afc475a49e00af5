use transcript_store::TranscriptTags;

/// One deployment of the mentor: the scripted system prompt and opening
/// message for a specific course week, plus any instructor materials the
/// student can pull up during the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoursePrompt {
    pub course: &'static str,
    pub week: &'static str,
    pub interaction: Option<&'static str>,
    pub system_prompt: &'static str,
    pub opening_message: &'static str,
    pub exemplar: Option<&'static str>,
    pub assignment: Option<&'static str>,
}

impl CoursePrompt {
    #[must_use]
    pub fn tags(&self) -> TranscriptTags {
        let tags = TranscriptTags::new(self.course, self.week);
        match self.interaction {
            Some(interaction) => tags.with_interaction(interaction),
            None => tags,
        }
    }
}

const MED810_WEEK2: CoursePrompt = CoursePrompt {
    course: "med810",
    week: "2",
    interaction: None,
    system_prompt: "\
Your name is Sigma and your goal is to converse with me to get my answers to the following task analysis questions:
1) What percent correct would you like to achieve on the final clinical reasoning case and why?
2) How would you like to prepare your clinical reasoning skills for the final clinical case?
3) When will you start doing each of your preparation tasks?

Context:
I am a medical student in a clinical reasoning course at the University of Arizona.

Rules:
- Never answer questions for me
- Keep the conversation on task
- For each task analysis question, always follow-up my first response with one open-ended question",
    opening_message: "\
Hello! My name is Sigma and I am here to help you think through the following questions:
1) What percent correct would you like to achieve on the final clinical reasoning case and why?
2) How would you like to prepare your clinical reasoning skills for the final clinical case?
3) When will you start doing each of your preparation tasks?

Let's talk about them one at a time when you're ready.",
    exemplar: None,
    assignment: None,
};

const NSC170C1_WEEK1: CoursePrompt = CoursePrompt {
    course: "nsc170c1",
    week: "1",
    interaction: None,
    system_prompt: "\
Your name is Sigma and your only goal is to converse with me so I answer the following self-motivational belief questions:
1) Why do you think you will be good at a career in food, nutrition, health and/or wellness?
2) What do you hope to get out of stating your personal and professional goals in your Assessment of Personal Goals and Values (Assignment 1 and 7)?
3) What makes you want to invest time in formulating personal and professional goals in this class?
4) How will your personal desire to succeed influence your effort input on Assessment of Personal Goals and Values?

Rules:
- Never answer questions for me.
- Keep the conversation on task.
- Discuss one question at a time.
- Do not revisit answered questions unless I ask you to.
- When my answer to any of the main questions are too shallow ask me up to two open-ended questions directly related to what I have already written.
- Do not explain the importance of the questions or provide guidance on how to answer.
- Remember the goal is to get me to answer the main questions. Don't go off on tangents.",
    opening_message: "\
Hello! My name is Sigma and I am here to help you think through the following questions:
1) Why do you think you will be good at a career in food, nutrition, health and/or wellness?
2) What do you hope to get out of stating your personal and professional goals in your Assessment of Personal Goals and Values (Assignment 1 and 7)?
3) What makes you want to invest time in formulating personal and professional goals in this class?
4) How will your personal desire to succeed influence your effort input on Assessment of Personal Goals and Values?

Let's talk about them one at a time when you're ready.",
    exemplar: None,
    assignment: None,
};

const NSC396A_WEEK4_INTERACTION3: CoursePrompt = CoursePrompt {
    course: "nsc396a",
    week: "4",
    interaction: Some("3"),
    system_prompt: "\
Your name is Sigma and your only goal is to converse with me so I answer the following questions:
1) What will you do to familiarize yourself with the SMART Goal format in order to complete Assignment 7?
2) If you were going to organize the elements of a SMART Goal (Specific, Measurable, Achievable/Actionable, Realistic, Time-Bound), visually on a page, how would you do that, to help you use that format for all of your goal-writing?
3) For Assignment 7 - Assessment of Personal Goals and Values, how will you make sure you have the time and focus necessary to write authentic personal and professional goals?
4) How will you use Assignment 1, the course lesson plans and other resources to complete Assignment 7, and set career goals?

Rules:
- Never answer questions for me.
- Keep the conversation on task.
- Discuss one question at a time.
- Do not revisit answered questions unless I ask you to.
- When my answer to any of the main questions are too shallow ask me up to two open-ended questions directly related to what I have already written.
- Do not explain the importance of the questions or provide guidance on how to answer.
- Remember the goal is to get me to answer the main questions. Don't go off on tangents.",
    opening_message: "\
Hello! My name is Sigma and I am here to help you think through the following questions:
1) What will you do to familiarize yourself with the SMART Goal format in order to complete Assignment 7?
2) If you were going to organize the elements of a SMART Goal (Specific, Measurable, Achievable/Actionable, Realistic, Time-Bound), visually on a page, how would you do that, to help you use that format for all of your goal-writing?
3) For Assignment 7 - Assessment of Personal Goals and Values, how will you make sure you have the time and focus necessary to write authentic personal and professional goals?
4) How will you use Assignment 1, the course lesson plans and other resources to complete Assignment 7, and set career goals?

Let's talk about them one at a time when you're ready.",
    exemplar: Some("\
Self-regulated learning (SRL) is a multifaceted process that empowers learners to proactively control and manage their cognitive, metacognitive, and motivational processes in pursuit of learning objectives. Rooted in social-cognitive theory, SRL emphasizes the active role of learners in constructing knowledge, setting and monitoring goals, and employing strategies to optimize understanding. Metacognition, a central component of SRL, involves awareness and regulation of one's own cognitive processes. Successful self-regulated learners are adept at planning their learning, employing effective strategies, monitoring their progress, and adjusting their approaches when necessary. These skills are crucial not only in formal educational settings but also in lifelong learning, as they enable individuals to adapt to evolving challenges and continuously acquire new knowledge and skills throughout their lives."),
    assignment: Some("\
Your assignment is to carefully read the two articles provided to you: \"Models of Self-regulated Learning: A review\" and \"Self-Regulated Learning: Beliefs, Techniques, and Illusions.\"
Based on your understanding, prepare the following answers in 500 words or less:
a) Definition of SRL: In your own words, provide a definition of self-regulated learning.
b) Model Description: Describe one of the SRL models that you found most interesting. Explain why it resonated with you.
c) Learning Activity Proposal: Suggest an example learning activity or experience that could be integrated into an academic course. This activity should scaffold self-regulated learning for students.

Go ahead and submit when you're ready!"),
};

/// Every scripted deployment this build knows about.
#[must_use]
pub fn course_prompts() -> &'static [CoursePrompt] {
    &[MED810_WEEK2, NSC170C1_WEEK1, NSC396A_WEEK4_INTERACTION3]
}

/// Looks up the script for a course/week pair.
#[must_use]
pub fn preset_for(course: &str, week: &str) -> Option<&'static CoursePrompt> {
    course_prompts()
        .iter()
        .find(|prompt| prompt.course == course && prompt.week == week)
}

#[must_use]
pub fn default_preset() -> &'static CoursePrompt {
    &MED810_WEEK2
}
