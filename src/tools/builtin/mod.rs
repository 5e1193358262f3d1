mod calculator;
mod clock;

use std::sync::Arc;

use crate::core::error::Result;

pub use calculator::{CalculatorInput, CalculatorTool, evaluate, format_number};
pub use clock::{CurrentTimeInput, CurrentTimeTool};

use super::ToolRegistry;

/// Registers every built-in tool.
pub fn register_builtins(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(Arc::new(CalculatorTool::new()))?;
    registry.register(Arc::new(CurrentTimeTool::new()))?;
    Ok(())
}
