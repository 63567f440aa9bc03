//! Local date and time lookup.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};

use crate::tools::{Tool, ToolArgs, ToolError, ToolSpec};

/// Reports the current local date and time.
#[derive(Debug)]
pub struct QueryTime {
    spec: ToolSpec,
}

impl QueryTime {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                "query_time",
                "Time Query",
                "A tool for looking up the current date and time. It takes no parameters.",
            ),
        }
    }
}

impl Default for QueryTime {
    fn default() -> Self {
        Self::new()
    }
}

fn format_time<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d %H:%M:%S (%A, UTC%:z)").to_string()
}

#[async_trait]
impl Tool for QueryTime {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, _args: ToolArgs) -> Result<String, ToolError> {
        Ok(format!("The current time is {}", format_time(&Local::now())))
    }
}
