//! Human-readable run report printed after a flow finishes.

use agent_loop::TaskReport;
use uitrail_core_types::StepRecord;

pub fn print_report(report: &TaskReport, steps: &[StepRecord]) {
    let flow = &report.flow;
    println!();
    println!("Flow {}", flow.id);
    println!("  app:        {}", flow.app_name);
    println!("  prefix:     {}", flow.prefix);
    println!("  status:     {}", flow.status);
    if let Some(reason) = &flow.status_reason {
        println!("  reason:     {reason}");
    }
    println!("  iterations: {}", report.outcome.iterations);
    println!("  steps:      {}", steps.len());

    if !steps.is_empty() {
        println!();
        for step in steps {
            let change = step
                .change
                .as_ref()
                .map(|c| format!("{} ({:.2})", c.summary, c.score))
                .unwrap_or_else(|| "-".to_string());
            println!("  [{:>3}] {:<24} {}", step.index, step.label, change);
            println!("        {}", step.screenshot_key);
        }
    }

    if !report.outcome.history.is_empty() {
        println!();
        println!("History:");
        for line in report.outcome.history.lines() {
            println!("  {line}");
        }
    }
}
