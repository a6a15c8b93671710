//! Plain-text comparison of the current batch against the prior batch.

use crate::store::diff::Delta;

pub const NO_PRIOR_DATA: &str = "No previous data available for comparison";

pub fn render(deltas: &[Delta]) -> String {
    let mut lines = Vec::with_capacity(deltas.len() * 4);
    for delta in deltas {
        lines.push(format!("Profile: {}", delta.entity_id));
        lines.push(format!("Interests change: {}", delta.interests.delta));
        lines.push(format!("Skills change: {}", delta.skills.delta));
        lines.push("---".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::diff::Change;

    #[test]
    fn one_block_per_delta() {
        let deltas = vec![
            Delta {
                entity_id: "A".into(),
                interests: Change::between(5, 8),
                skills: Change::between(10, 10),
            },
            Delta {
                entity_id: "B".into(),
                interests: Change::between(4, 1),
                skills: Change::between(0, 2),
            },
        ];
        assert_eq!(
            render(&deltas),
            "Profile: A\nInterests change: 3\nSkills change: 0\n---\n\
             Profile: B\nInterests change: -3\nSkills change: 2\n---"
        );
    }

    #[test]
    fn nothing_to_compare_is_empty() {
        assert_eq!(render(&[]), "");
    }
}
