use std::fmt::Write;

use crate::config::OutputSchema;
use crate::model::TravelPlan;
use crate::pipeline::{RunContext, WorkUnit};
use crate::workers::Worker;

pub fn system_prompt(worker: &Worker) -> String {
    let mut system = String::new();
    let _ = writeln!(system, "You are {}.", worker.role.trim());
    if !worker.backstory.trim().is_empty() {
        let _ = writeln!(system, "{}", worker.backstory.trim());
    }
    let _ = writeln!(system, "\nYour personal goal is: {}", worker.goal.trim());
    if worker.tools.is_empty() {
        system.push_str("\nYou have no tools; answer from the information you are given.\n");
    } else {
        system.push_str("\nUse your tools to gather facts; never invent search results.\n");
    }
    system.push_str("You work alone and cannot hand the task to anyone else.\n");
    system
}

pub fn task_prompt(unit: &WorkUnit, ctx: &RunContext) -> String {
    let mut user = String::new();
    let _ = writeln!(user, "Current task: {}", ctx.interpolate(unit.description.trim()));
    let _ = writeln!(user, "\nTraveller request: {}", ctx.message());
    let _ = writeln!(user, "Request time: {}", ctx.timestamp());

    if !ctx.outputs().is_empty() {
        user.push_str("\nContext from earlier tasks:\n");
        for entry in ctx.outputs() {
            let _ = writeln!(user, "\n### {}\n{}", entry.unit, entry.output.trim_end());
        }
    }

    let _ = writeln!(
        user,
        "\nThis is the expected criteria for your final answer: {}",
        ctx.interpolate(unit.expected_output.trim())
    );

    match unit.output_schema {
        Some(OutputSchema::TravelPlan) => {
            user.push_str(
                "\nReturn ONLY one JSON object matching this JSON schema, with no prose:\n",
            );
            let _ = writeln!(user, "{}", TravelPlan::json_schema());
            user.push_str("Dates use YYYY-MM-DD. day_plans has one entry per trip day, consecutive from the first day.\n");
        }
        None => {
            user.push_str("\nYou MUST return the actual complete content as the final answer, not a summary.\n");
        }
    }

    user
}
