use crate::cli::PlanParams;
use crate::download::{TaskPlan, plan_tasks};
use crate::error::OrderFetchError;

/// Prints the pending downloads, one `url -> path` line each.
pub fn run_plan(params: PlanParams) -> Result<TaskPlan, OrderFetchError> {
    let PlanParams { orders, output_dir } = params;

    let plan = plan_tasks(&orders, &output_dir);
    for task in &plan.tasks {
        println!("{} -> {}", task.source_url, task.destination_path.display());
    }

    tracing::info!(
        pending = plan.total(),
        skipped_existing = plan.skipped_existing,
        duplicates = plan.duplicates,
        rejected = plan.rejected,
        "Plan complete"
    );
    Ok(plan)
}
