//! Prompt context builders shared by the tutor clients.

use studymate_core::defaults::EMPTY_CORPUS_CONTEXT;
use studymate_core::{Note, QuizResult};

/// Plain concatenation of note contents, blank-line separated.
pub fn plain(notes: &[Note]) -> String {
    notes
        .iter()
        .map(Note::content)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One `Topic:` / `Content:` block per note.
pub fn topics(notes: &[Note]) -> String {
    notes
        .iter()
        .map(|n| format!("Topic: {}\nContent: {}", n.name(), n.content()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Named document blocks for chat, or a marker when there are no notes.
pub fn documents(notes: &[Note]) -> String {
    if notes.is_empty() {
        return EMPTY_CORPUS_CONTEXT.to_string();
    }
    notes
        .iter()
        .map(|n| format!("--- Document: {} ---\n{}", n.name(), n.content()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One line per completed quiz.
pub fn quiz_history(history: &[QuizResult]) -> String {
    history
        .iter()
        .map(|r| {
            format!(
                "Quiz Result: {}/{} on {}",
                r.score(),
                r.total(),
                r.timestamp().format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use studymate_core::NoteType;

    fn notes() -> Vec<Note> {
        vec![
            Note::new("cells.txt", "Cells are units of life.", NoteType::Text),
            Note::new("atoms.pdf", "Atoms have nuclei.", NoteType::Pdf),
        ]
    }

    #[test]
    fn test_plain() {
        assert_eq!(
            plain(&notes()),
            "Cells are units of life.\n\nAtoms have nuclei."
        );
    }

    #[test]
    fn test_topics() {
        let text = topics(&notes());
        assert!(text.starts_with("Topic: cells.txt\nContent: Cells are units of life."));
        assert!(text.contains("\n\nTopic: atoms.pdf\nContent: Atoms have nuclei."));
    }

    #[test]
    fn test_documents() {
        let text = documents(&notes());
        assert!(text.starts_with("--- Document: cells.txt ---\nCells"));
        assert_eq!(documents(&[]), "No documents uploaded yet.");
    }

    #[test]
    fn test_quiz_history() {
        let history = vec![
            QuizResult::new(7, 10).unwrap(),
            QuizResult::new(18, 18).unwrap(),
        ];
        let text = quiz_history(&history);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Quiz Result: 7/10 on "));
        assert!(lines[1].starts_with("Quiz Result: 18/18 on "));
    }
}
