//! Question templates with a fixed, enumerated set of placeholders.

/// A recognized placeholder in a question structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Observation,
    Cause,
    MysticalQuestion,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [Self::Observation, Self::Cause, Self::MysticalQuestion];

    /// The literal token as written in a template, brackets included.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Observation => "[observation]",
            Self::Cause => "[cause]",
            Self::MysticalQuestion => "[mystical_question]",
        }
    }
}

/// A segment of a parsed question template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// The fragments substituted into a question template.
#[derive(Debug, Clone, Copy)]
pub struct QuestionFill<'a> {
    pub observation: &'a str,
    pub cause: &'a str,
    pub mystical_question: &'a str,
}

impl<'a> QuestionFill<'a> {
    fn get(&self, placeholder: Placeholder) -> &'a str {
        match placeholder {
            Placeholder::Observation => self.observation,
            Placeholder::Cause => self.cause,
            Placeholder::MysticalQuestion => self.mystical_question,
        }
    }
}

/// A parsed question structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTemplate {
    pub segments: Vec<Segment>,
}

impl QuestionTemplate {
    /// Split a question structure into literal text and placeholder slots.
    ///
    /// Only the three recognized tokens become slots; any other bracketed
    /// text is kept verbatim. Parsing never fails.
    pub fn parse(input: &str) -> QuestionTemplate {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = input;

        while let Some(open) = rest.find('[') {
            let (before, from_open) = rest.split_at(open);
            literal.push_str(before);

            let slot = Placeholder::ALL
                .into_iter()
                .find(|p| from_open.starts_with(p.token()));
            match slot {
                Some(placeholder) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(placeholder));
                    rest = &from_open[placeholder.token().len()..];
                }
                None => {
                    literal.push('[');
                    rest = &from_open[1..];
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        QuestionTemplate { segments }
    }

    /// How many times a placeholder occurs.
    pub fn occurrences(&self, placeholder: Placeholder) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Slot(p) if *p == placeholder))
            .count()
    }

    /// Substitute fragments. Every occurrence of a placeholder gets the same text.
    pub fn render(&self, fill: &QuestionFill<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(placeholder) => out.push_str(fill.get(*placeholder)),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: QuestionFill<'static> = QuestionFill {
        observation: "the lights flickering",
        cause: "a loose wire",
        mystical_question: "Is the building haunted?",
    };

    #[test]
    fn parse_all_placeholders() {
        let t = QuestionTemplate::parse(
            "Have you noticed [observation]? I wonder if it's because [cause]. [mystical_question]",
        );
        assert_eq!(t.segments.len(), 6);
        assert_eq!(t.segments[0], Segment::Literal("Have you noticed ".to_string()));
        assert_eq!(t.segments[1], Segment::Slot(Placeholder::Observation));
        assert_eq!(
            t.segments[2],
            Segment::Literal("? I wonder if it's because ".to_string())
        );
        assert_eq!(t.segments[3], Segment::Slot(Placeholder::Cause));
        assert_eq!(t.segments[4], Segment::Literal(". ".to_string()));
        assert_eq!(t.segments[5], Segment::Slot(Placeholder::MysticalQuestion));
    }

    #[test]
    fn render_substitutes_literally() {
        let t = QuestionTemplate::parse("[observation]? Because [cause]. [mystical_question]");
        assert_eq!(
            t.render(&FILL),
            "the lights flickering? Because a loose wire. Is the building haunted?"
        );
    }

    #[test]
    fn unknown_brackets_stay_literal() {
        let t = QuestionTemplate::parse("[speaker]: [[cause]] [unclosed");
        assert_eq!(t.occurrences(Placeholder::Cause), 1);
        assert_eq!(t.render(&FILL), "[speaker]: [a loose wire] [unclosed");
    }

    #[test]
    fn repeated_placeholder_gets_same_text() {
        let t = QuestionTemplate::parse("[cause], or was it [cause]?");
        assert_eq!(t.occurrences(Placeholder::Cause), 2);
        assert_eq!(t.render(&FILL), "a loose wire, or was it a loose wire?");
    }

    #[test]
    fn missing_placeholder_renders_without_it() {
        let t = QuestionTemplate::parse("Just [observation].");
        assert_eq!(t.occurrences(Placeholder::MysticalQuestion), 0);
        assert_eq!(t.render(&FILL), "Just the lights flickering.");
    }

    #[test]
    fn literal_only_template() {
        let t = QuestionTemplate::parse("Nothing to fill.");
        assert_eq!(
            t.segments,
            vec![Segment::Literal("Nothing to fill.".to_string())]
        );
    }
}
