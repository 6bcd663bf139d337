use crate::pipeline::validate::{validate_order, OrderValidation};
use crate::pipeline::StepConfig;

/// A reordering attempt held open until it either commits or is discarded.
/// A clean proposal is normally committed immediately by the caller; a dirty
/// one is surfaced for explicit confirmation, and confirming still commits;
/// warnings inform, they never block.
#[derive(Debug, Clone)]
pub struct ReorderProposal {
    original: Vec<StepConfig>,
    proposed: Vec<StepConfig>,
    validation: OrderValidation,
}

/// Validates moving the step at `from` to position `to` without touching
/// the input sequence. Returns `None` for out-of-range or no-op moves.
pub fn propose_move(steps: &[StepConfig], from: usize, to: usize) -> Option<ReorderProposal> {
    if from >= steps.len() || to >= steps.len() || from == to {
        return None;
    }
    let mut proposed = steps.to_vec();
    let moved = proposed.remove(from);
    proposed.insert(to, moved);
    let validation = validate_order(&proposed);
    Some(ReorderProposal {
        original: steps.to_vec(),
        proposed,
        validation,
    })
}

impl ReorderProposal {
    pub fn is_clean(&self) -> bool {
        self.validation.is_valid
    }

    pub fn warnings(&self) -> &[String] {
        &self.validation.warnings
    }

    pub fn proposed_order(&self) -> &[StepConfig] {
        &self.proposed
    }

    /// Applies the reorder and restores the order/index invariant.
    pub fn commit(self) -> Vec<StepConfig> {
        let mut steps = self.proposed;
        for (index, step) in steps.iter_mut().enumerate() {
            step.order = index as u32 + 1;
        }
        steps
    }

    /// Abandons the reorder; the original order comes back untouched.
    pub fn discard(self) -> Vec<StepConfig> {
        self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{PipelineConfig, StepName};

    fn steps(entries: &[(&str, &str)]) -> Vec<StepConfig> {
        let mut pipeline = PipelineConfig::default();
        for (name, template) in entries {
            let index = pipeline
                .add_step(StepName::parse(name).expect("step name"))
                .expect("unique step");
            pipeline.steps[index].user_prompt_template = (*template).to_string();
        }
        pipeline.steps
    }

    fn names(steps: &[StepConfig]) -> Vec<&str> {
        steps.iter().map(|step| step.step_name.as_str()).collect()
    }

    #[test]
    fn dirty_proposal_commits_on_confirm_and_restores_on_discard() {
        let sequence = steps(&[("wyckoff", ""), ("merge", "uses {wyckoff_output}")]);

        let proposal = propose_move(&sequence, 1, 0).expect("proposal");
        assert!(!proposal.is_clean());
        assert!(!proposal.warnings().is_empty());
        assert_eq!(names(&sequence), vec!["wyckoff", "merge"]);

        let discarded = proposal.clone().discard();
        assert_eq!(names(&discarded), vec!["wyckoff", "merge"]);
        assert_eq!(discarded[0].order, 1);

        let committed = proposal.commit();
        assert_eq!(names(&committed), vec!["merge", "wyckoff"]);
        assert_eq!(committed[0].order, 1);
        assert_eq!(committed[1].order, 2);
    }

    #[test]
    fn clean_proposal_reports_no_warnings() {
        let sequence = steps(&[("merge", "uses {wyckoff_output}"), ("wyckoff", "")]);
        let proposal = propose_move(&sequence, 0, 1).expect("proposal");
        assert!(proposal.is_clean());
        assert_eq!(names(proposal.proposed_order()), vec!["wyckoff", "merge"]);
    }

    #[test]
    fn out_of_range_and_no_op_moves_are_rejected() {
        let sequence = steps(&[("a", ""), ("b", "")]);
        assert!(propose_move(&sequence, 0, 0).is_none());
        assert!(propose_move(&sequence, 2, 0).is_none());
        assert!(propose_move(&sequence, 0, 2).is_none());
    }
}
