//! Prompt assembly for retrieval-augmented answers.

use profchat_protocol::{RetrievalMatch, Turn};

/// Instruction turn sent ahead of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"
You are an AI assistant for "Rate My Professor," dedicated to helping students find the best classes and professors based on their queries. For every user question, retrieve the top 3 professors that best match the user's criteria. Use the information about these professors to provide a detailed, accurate, and helpful answer to the student's query.

For each recommended professor, include the following details when relevant:

    Professor's Name: Full name.
    Department/Subject: The department or subject they teach.
    Rating: Overall rating (e.g., 4.5 out of 5).
    Key Feedback: Highlight key feedback from students (e.g., teaching style, difficulty level, or engagement).
    Course Information: Include details about the courses they teach that are relevant to the user's query.

If the query requires further clarification or additional details to provide the best recommendations, ask follow-up questions. Aim to deliver concise, informative, and actionable responses that will help the student make informed decisions about their classes and professors.
"#;

/// Render one retrieved review as a context block.
pub fn format_match(found: &RetrievalMatch) -> String {
    let meta = &found.metadata;
    format!(
        "\nReturned Results:\nProfessor: {}\nReview: {}\nSubject: {}\nStars: {}\n\n",
        found.id, meta.review, meta.subject, meta.stars
    )
}

/// Concatenate context blocks in retrieval order.
pub fn format_matches(matches: &[RetrievalMatch]) -> String {
    matches.iter().map(format_match).collect()
}

/// Build the history handed to the generator.
///
/// The instruction goes first as a user turn, then the prior turns
/// unchanged, then the newest question with the context blocks appended.
pub fn assemble_history(
    system_prompt: &str,
    history: &[Turn],
    query: &str,
    matches: &[RetrievalMatch],
) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::user(system_prompt));
    turns.extend(history.iter().cloned());
    turns.push(Turn::user(format!("{query}{}", format_matches(matches))));
    turns
}

#[cfg(test)]
mod tests {
    use super::{assemble_history, format_match, format_matches};
    use pretty_assertions::assert_eq;
    use profchat_protocol::{MatchMetadata, RetrievalMatch, Turn};

    fn review(id: &str, subject: &str, stars: f32) -> RetrievalMatch {
        RetrievalMatch {
            id: id.to_string(),
            score: 0.9,
            metadata: MatchMetadata {
                review: format!("{id} explains things well."),
                subject: subject.to_string(),
                stars,
            },
        }
    }

    #[test]
    fn block_layout_is_fixed() {
        assert_eq!(
            format_match(&review("Dr. Smith", "Math", 4.5)),
            "\nReturned Results:\nProfessor: Dr. Smith\nReview: Dr. Smith explains things well.\nSubject: Math\nStars: 4.5\n\n"
        );
    }

    #[test]
    fn whole_star_ratings_render_without_fraction() {
        assert!(format_match(&review("A", "Bio", 5.0)).contains("Stars: 5\n"));
    }

    #[test]
    fn blocks_keep_retrieval_order() {
        let blocks = format_matches(&[review("B", "x", 1.0), review("A", "y", 2.0)]);
        let b = blocks.find("Professor: B").expect("B");
        let a = blocks.find("Professor: A").expect("A");
        assert!(b < a);
        assert_eq!(blocks.matches("Returned Results:").count(), 2);
    }

    #[test]
    fn history_wraps_prior_turns() {
        let prior = vec![Turn::model("Hi!"), Turn::user("first"), Turn::model("reply")];
        let turns = assemble_history("SYS", &prior, "second", &[review("A", "Art", 3.0)]);

        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0], Turn::user("SYS"));
        assert_eq!(&turns[1..4], prior.as_slice());
        let last = &turns[4];
        assert!(last.content.starts_with("second\nReturned Results:"));
        assert!(last.content.ends_with("Stars: 3\n\n"));
    }

    #[test]
    fn no_matches_leaves_query_untouched() {
        let turns = assemble_history("SYS", &[], "hello", &[]);
        assert_eq!(turns, vec![Turn::user("SYS"), Turn::user("hello")]);
    }
}
