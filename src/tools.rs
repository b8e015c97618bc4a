//! The assistant's tool manifest and the handling of the tool calls it makes.

use serde_json::{json, Value};

use crate::{
    assistants::{
        runs::{ToolCall, ToolOutput},
        Function, Tool,
    },
    market_data::{SeriesKind, StockDataSource, StockQuery},
    Error, Result,
};

pub const STOCK_DATA_TOOL: &str = "retrieve_stock_data";

/// Names the assistant has been seen to use for the stock data tool.
pub const STOCK_DATA_ALIASES: [&str; 2] = [STOCK_DATA_TOOL, "get_stock_data"];

pub fn is_stock_data_tool(name: &str) -> bool {
    STOCK_DATA_ALIASES.contains(&name)
}

pub fn stock_data_function() -> Function {
    let kinds: Vec<&str> = SeriesKind::ALL.iter().map(SeriesKind::as_str).collect();
    Function {
        name: STOCK_DATA_TOOL.to_string(),
        description: Some(
            "Retrieve stock time series data from the Alpha Vantage market data API.".to_string(),
        ),
        parameters: json!({
            "type": "object",
            "properties": {
                "function": {
                    "type": "string",
                    "enum": kinds,
                    "description": "The granularity of the time series to retrieve."
                },
                "symbol": {
                    "type": "string",
                    "description": "The stock ticker symbol, e.g. AAPL."
                }
            },
            "required": ["function", "symbol"]
        }),
    }
}

/// Code execution plus the stock data function.
pub fn manifest() -> Vec<Tool> {
    vec![
        Tool::CodeInterpreter,
        Tool::Function {
            function: stock_data_function(),
        },
    ]
}

pub fn unknown_tool_output(name: &str) -> String {
    json!({ "error": format!("Unknown tool: {name}") }).to_string()
}

/// Answers one tool call.
///
/// Unrecognised tools are answered with an error payload. Malformed
/// arguments and data source failures are returned as errors.
pub async fn fulfill<S>(call: &ToolCall, source: &S) -> Result<ToolOutput>
where
    S: StockDataSource + ?Sized,
{
    let name = call.function.name.as_str();
    let arguments: Value =
        serde_json::from_str(&call.function.arguments).map_err(|source| Error::ToolArguments {
            tool: name.to_string(),
            source,
        })?;

    let output = if is_stock_data_tool(name) {
        let query: StockQuery =
            serde_json::from_value(arguments).map_err(|source| Error::ToolArguments {
                tool: name.to_string(),
                source,
            })?;
        log::info!(
            "Fetching {} for {} (tool call {})",
            query.function,
            query.symbol,
            call.id
        );
        source.fetch(&query).await?.to_string()
    } else {
        log::warn!("Unknown tool `{name}` requested by tool call {}", call.id);
        unknown_tool_output(name)
    };

    Ok(ToolOutput {
        tool_call_id: call.id.clone(),
        output,
    })
}

/// Answers every call in the order given, stopping at the first failure.
pub async fn fulfill_all<S>(calls: &[ToolCall], source: &S) -> Result<Vec<ToolOutput>>
where
    S: StockDataSource + ?Sized,
{
    let mut outputs = Vec::with_capacity(calls.len());
    for call in calls {
        outputs.push(fulfill(call, source).await?);
    }
    Ok(outputs)
}
