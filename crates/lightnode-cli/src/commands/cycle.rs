//! Single cycle

use anyhow::Result;

use lightnode_core::LightNodeConfig;
use lightnode_sync::{CycleOutcome, CycleReport, TreeAction};

use super::common::build_scheduler;

/// Run one cycle and print what happened to each tree
pub async fn run(config: &LightNodeConfig) -> Result<()> {
    let scheduler = build_scheduler(config)?;
    let report = scheduler.run_cycle().await?;
    print!("{}", render(&report));
    Ok(())
}

fn render(report: &CycleReport) -> String {
    let mut out = String::new();
    for evaluation in &report.evaluations {
        let detail = match &evaluation.action {
            TreeAction::SkippedAsleep { until_ms } | TreeAction::SleepEntered { until_ms } => {
                format!("until {until_ms}")
            }
            TreeAction::FetchFailed(err) => err.to_string(),
            TreeAction::PipelineFailed(failure) => {
                format!("{}: {failure}", failure.stage())
            }
            TreeAction::EmptyLeaves | TreeAction::Verified => String::new(),
        };
        out.push_str(&format!(
            "{:<24} {:<16} {}\n",
            evaluation.tree_id,
            evaluation.action.as_str(),
            detail
        ));
    }

    match &report.outcome {
        CycleOutcome::Verified(result) => out.push_str(&format!(
            "verified tree {} (root {}, receipt {})\n",
            result.tree_id, result.new_root, result.receipt
        )),
        other => out.push_str(&format!("{}\n", other.as_str())),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightnode_core::{TreeId, VerifiedResult};
    use lightnode_sync::TreeEvaluation;

    #[test]
    fn test_render_lists_trees_then_outcome() {
        let report = CycleReport {
            outcome: CycleOutcome::Verified(VerifiedResult {
                tree_id: TreeId::from("t2"),
                receipt: "rcpt".into(),
                new_root: "r2".into(),
                proof_hash: "h".into(),
            }),
            evaluations: vec![
                TreeEvaluation {
                    tree_id: TreeId::from("t1"),
                    action: TreeAction::EmptyLeaves,
                },
                TreeEvaluation {
                    tree_id: TreeId::from("t2"),
                    action: TreeAction::Verified,
                },
            ],
        };

        let text = render(&report);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("t1"));
        assert!(lines[0].contains("empty_leaves"));
        assert_eq!(lines[2], "verified tree t2 (root r2, receipt rcpt)");
    }

    #[test]
    fn test_render_empty_outcome() {
        let report = CycleReport {
            outcome: CycleOutcome::NoTreesAvailable,
            evaluations: vec![],
        };
        assert_eq!(render(&report), "no_trees_available\n");
    }
}
