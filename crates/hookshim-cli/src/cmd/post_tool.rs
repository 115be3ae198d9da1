//! `hookshim post-tool`: review a finished tool call's output.
//!
//! Prints the primary feedback line and, when relevant, a plan-size warning
//! line. Always exits 0; blocking is expressed in the feedback itself.

use crate::output::print_json_line;
use hookshim_core::event::ToolEvent;
use hookshim_core::validation::{self, Feedback};

pub fn run() -> anyhow::Result<i32> {
    let event = match ToolEvent::from_reader(std::io::stdin().lock()) {
        Ok(ev) => ev,
        Err(e) => {
            print_json_line(&Feedback::hook_error(e))?;
            return Ok(0);
        }
    };

    let report = validation::validate(&event);
    print_json_line(&report.primary)?;
    if let Some(warning) = &report.warning {
        print_json_line(warning)?;
    }
    Ok(0)
}
