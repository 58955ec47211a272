//! Instruction templates sent ahead of the course material.

/// Separates the text of consecutive documents inside one prompt.
pub const DOCUMENT_BREAK: &str = "\n\n--- DOCUMENT BREAK ---\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tasks,
    Summary,
    Quiz,
}

impl Mode {
    /// Generic message returned to clients when this mode fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Mode::Tasks => "AI analysis failed, please try again later.",
            Mode::Summary => "Summary generation failed, please try again later.",
            Mode::Quiz => "Quiz generation failed, please try again later.",
        }
    }

    fn instructions(self, year: i32) -> String {
        match self {
            Mode::Tasks => format!(
                r#"You are an assistant for university students. The material below may contain a course syllabus and several sets of lecture notes. Find every event that has to be scheduled: homework, reports, projects, quizzes, midterms and finals. If several documents mention the same task, keep the latest deadline and list it once.

Answer with a JSON array. Each element is an object with these keys:
1. "title": (string) the name of the task.
2. "deadline": (string) the due date formatted as "YYYY-MM-DD". When only month and day are given, assume the year {year}.
3. "estimatedTime": (number) a reasonable preparation time in minutes, for example homework=180, report=300, quiz=120, midterm or final exam=600.

If the material contains nothing to schedule, answer with an empty array [].

Reply with plain JSON only, without markdown or explanations.

The text of every document follows, separated by "--- DOCUMENT BREAK ---":
"#
            ),
            Mode::Summary => r#"You are an assistant for university students. Summarize the course material below for revision. Cover the main topics, key definitions and anything that is likely to be examined. Use short paragraphs or bullet points and answer in plain text.

The text of every document follows, separated by "--- DOCUMENT BREAK ---":
"#
            .to_string(),
            Mode::Quiz => r#"You are an assistant for university students. Write a multiple choice quiz that checks understanding of the course material below.

Answer with one JSON object of this shape:
{"title": string, "questions": [{"question": string, "hint": string, "answerOptions": [{"text": string, "isCorrect": boolean, "rationale": string}]}]}

Every question has exactly 4 answer options and exactly one of them has "isCorrect": true. The rationale explains why the option is right or wrong.

Reply with plain JSON only, without markdown or explanations.

The text of every document follows, separated by "--- DOCUMENT BREAK ---":
"#
            .to_string(),
        }
    }
}

/// Full prompt: instructions followed by every document, in storage order.
pub fn build_prompt(mode: Mode, texts: &[String], year: i32) -> String {
    let mut prompt = mode.instructions(year);
    prompt.push_str(&texts.join(DOCUMENT_BREAK));
    prompt
}
