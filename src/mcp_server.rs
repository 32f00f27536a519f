//! Minimal MCP stdio server exposing the lab tools.
//!
//! Every mutating tool is one read-modify-write of the inventory document;
//! the document is left untouched when the tool reports an error.

use crate::{
    about,
    catalog::ReagentCatalog,
    config::LabConfig,
    engine::{LabEngine, Operation, run_operation},
    error::{EngineError, ErrorCode},
    ids::ItemId,
    inventory::{InventoryStore, JsonFileStore},
};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::{debug, info};

const MCP_PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "labsim_mcp";
const SERVER_TITLE: &str = "Virtual Lab";

pub const INVALID_ID_MESSAGE: &str =
    "One of the IDs you gave was not valid. Check the inventory to see if it exists.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchOutcome {
    NoResponse,
    Response,
    Exit,
}

#[derive(Debug, Clone, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub fn run_stdio_server(config: &LabConfig) -> Result<(), String> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = BufReader::new(stdin.lock());
    let mut writer = BufWriter::new(stdout.lock());
    info!(
        "Serving lab tools for inventory '{}' and catalog '{}'",
        config.state_path, config.catalog_path
    );
    run_server_loop(config, &mut reader, &mut writer)
}

fn run_server_loop<R: BufRead, W: Write>(
    config: &LabConfig,
    reader: &mut R,
    writer: &mut W,
) -> Result<(), String> {
    loop {
        let Some(message) = read_framed_json(reader)? else {
            return Ok(());
        };
        match handle_message(config, &message, writer)? {
            DispatchOutcome::NoResponse => {}
            DispatchOutcome::Response => {}
            DispatchOutcome::Exit => return Ok(()),
        }
    }
}

fn read_framed_json<R: BufRead>(reader: &mut R) -> Result<Option<Value>, String> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        let bytes_read = reader
            .read_line(&mut line)
            .map_err(|e| format!("Could not read MCP header line: {e}"))?;
        if bytes_read == 0 {
            return if content_length.is_some() {
                Err("Unexpected EOF while reading MCP headers".to_string())
            } else {
                Ok(None)
            };
        }
        let line_trimmed = line.trim_end_matches(['\r', '\n']);
        if line_trimmed.is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }
        if let Some(value) = line_trimmed.strip_prefix("Content-Length:") {
            let len = value
                .trim()
                .parse::<usize>()
                .map_err(|e| format!("Invalid Content-Length header '{line_trimmed}': {e}"))?;
            content_length = Some(len);
        }
    }

    let len = content_length.ok_or_else(|| "Missing Content-Length header".to_string())?;
    let mut body = vec![0u8; len];
    reader
        .read_exact(&mut body)
        .map_err(|e| format!("Could not read MCP JSON payload body: {e}"))?;
    serde_json::from_slice::<Value>(&body)
        .map(Some)
        .map_err(|e| format!("Could not parse MCP JSON payload: {e}"))
}

fn write_framed_json<W: Write>(writer: &mut W, payload: &Value) -> Result<(), String> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| format!("Could not serialize MCP response JSON: {e}"))?;
    writer
        .write_all(format!("Content-Length: {}\r\n\r\n", body.len()).as_bytes())
        .map_err(|e| format!("Could not write MCP response header: {e}"))?;
    writer
        .write_all(&body)
        .map_err(|e| format!("Could not write MCP response body: {e}"))?;
    writer
        .flush()
        .map_err(|e| format!("Could not flush MCP response stream: {e}"))?;
    Ok(())
}

fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

fn tool_list() -> Value {
    json!([
        {
            "name": "list_reagents",
            "title": "List Reagents",
            "description": "List the current available reagents for ordering.",
            "inputSchema": empty_schema()
        },
        {
            "name": "list_inventory",
            "title": "List Inventory",
            "description": "List the current inventory on hand.",
            "inputSchema": empty_schema()
        },
        {
            "name": "order_reagent",
            "title": "Order Reagent",
            "description": "Order an amount of reagent from the available list to add to the inventory.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the reagent to order"
                    },
                    "quantity": {
                        "type": "string",
                        "description": "Amount of the reagent to order (provide units as well)"
                    }
                },
                "required": ["name", "quantity"],
                "additionalProperties": false
            }
        },
        {
            "name": "combine_items",
            "title": "Combine Items",
            "description": "Combine two items from the inventory.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "ID1": {
                        "type": "integer",
                        "description": "ID of the first item to combine"
                    },
                    "ID2": {
                        "type": "integer",
                        "description": "ID of the second item to combine"
                    }
                },
                "required": ["ID1", "ID2"],
                "additionalProperties": false
            }
        },
        {
            "name": "submit",
            "title": "Submit",
            "description": "Submit the current inventory for evaluation.",
            "inputSchema": empty_schema()
        },
        {
            "name": "capabilities",
            "title": "Capabilities",
            "description": "Return engine capabilities.",
            "inputSchema": empty_schema()
        }
    ])
}

fn jsonrpc_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn jsonrpc_error(id: Option<Value>, code: i64, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message
    });
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({
        "jsonrpc": "2.0",
        "id": id.unwrap_or(Value::Null),
        "error": error
    })
}

fn tool_result_text(text: String, is_error: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "isError": is_error
    })
}

fn tool_result_json(value: Value, is_error: bool) -> Value {
    let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "structuredContent": value,
        "isError": is_error
    })
}

fn tool_error(err: &EngineError) -> Value {
    tool_result_json(json!({ "error": err }), true)
}

fn string_arg(args: &Map<String, Value>, key: &str, tool_name: &str) -> Result<String, String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| format!("{tool_name} requires a string '{key}' argument"))
}

fn id_arg(args: &Map<String, Value>, key: &str, tool_name: &str) -> Result<ItemId, String> {
    args.get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| format!("{tool_name} requires a non-negative integer '{key}' argument"))
}

fn list_reagents_result(config: &LabConfig) -> Value {
    match ReagentCatalog::from_json_file(&config.catalog_path) {
        Ok(catalog) => tool_result_json(json!(catalog), false),
        Err(err) => tool_error(&err),
    }
}

fn inventory_result(config: &LabConfig) -> Value {
    match JsonFileStore::new(config.state_path.clone()).read() {
        Ok(inventory) => tool_result_json(json!(inventory), false),
        Err(err) => tool_error(&err),
    }
}

fn apply_tool_operation(config: &LabConfig, op: Operation, done: &str) -> Value {
    let catalog = match ReagentCatalog::from_json_file(&config.catalog_path) {
        Ok(catalog) => catalog,
        Err(err) => return tool_error(&err),
    };
    let store = JsonFileStore::new(config.state_path.clone());
    match run_operation(&store, &catalog, op) {
        Ok(result) => {
            debug!("Tool operation {} succeeded: {:?}", result.op_id, result.messages);
            tool_result_text(done.to_string(), false)
        }
        Err(err) if err.code == ErrorCode::InvalidId => {
            tool_result_text(INVALID_ID_MESSAGE.to_string(), true)
        }
        Err(err) => tool_error(&err),
    }
}

fn order_tool_result(config: &LabConfig, arguments: &Value) -> Value {
    let args = arguments.as_object().cloned().unwrap_or_default();
    let parsed = string_arg(&args, "name", "order_reagent").and_then(|name| {
        string_arg(&args, "quantity", "order_reagent").map(|quantity| (name, quantity))
    });
    match parsed {
        Ok((name, quantity)) => apply_tool_operation(
            config,
            Operation::OrderReagent { name, quantity },
            "The item has been added",
        ),
        Err(err) => tool_result_text(err, true),
    }
}

fn combine_tool_result(config: &LabConfig, arguments: &Value) -> Value {
    let args = arguments.as_object().cloned().unwrap_or_default();
    let parsed = id_arg(&args, "ID1", "combine_items")
        .and_then(|id1| id_arg(&args, "ID2", "combine_items").map(|id2| (id1, id2)));
    match parsed {
        Ok((id1, id2)) => apply_tool_operation(
            config,
            Operation::CombineItems { id1, id2 },
            "The two items have been combined",
        ),
        Err(err) => tool_result_text(err, true),
    }
}

fn tool_call_result(config: &LabConfig, params: ToolCallParams) -> Value {
    match params.name.trim() {
        "list_reagents" => list_reagents_result(config),
        "list_inventory" | "submit" => inventory_result(config),
        "order_reagent" => order_tool_result(config, &params.arguments),
        "combine_items" => combine_tool_result(config, &params.arguments),
        "capabilities" => tool_result_json(json!(LabEngine::capabilities()), false),
        other => tool_result_text(format!("Unknown MCP tool '{other}'"), true),
    }
}

fn write_response<W: Write>(writer: &mut W, value: Value) -> Result<DispatchOutcome, String> {
    write_framed_json(writer, &value)?;
    Ok(DispatchOutcome::Response)
}

fn handle_message<W: Write>(
    config: &LabConfig,
    message: &Value,
    writer: &mut W,
) -> Result<DispatchOutcome, String> {
    let Some(obj) = message.as_object() else {
        return write_response(
            writer,
            jsonrpc_error(None, -32600, "Invalid Request: expected JSON object", None),
        );
    };
    let id = obj.get("id").cloned();
    let Some(method) = obj.get("method").and_then(Value::as_str) else {
        return write_response(
            writer,
            jsonrpc_error(
                id,
                -32600,
                "Invalid Request: missing method field",
                Some(message.clone()),
            ),
        );
    };

    match method {
        "initialize" => {
            let Some(id) = id else {
                return write_response(
                    writer,
                    jsonrpc_error(None, -32600, "Invalid Request: initialize requires id", None),
                );
            };
            let result = json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "title": SERVER_TITLE,
                    "version": about::LABSIM_DISPLAY_VERSION
                }
            });
            write_response(writer, jsonrpc_response(id, result))
        }
        "notifications/initialized" => Ok(DispatchOutcome::NoResponse),
        "ping" | "shutdown" => {
            if let Some(id) = id {
                write_response(writer, jsonrpc_response(id, json!({})))
            } else {
                Ok(DispatchOutcome::NoResponse)
            }
        }
        "tools/list" => {
            let Some(id) = id else {
                return Ok(DispatchOutcome::NoResponse);
            };
            write_response(writer, jsonrpc_response(id, json!({ "tools": tool_list() })))
        }
        "tools/call" => {
            let Some(id) = id else {
                return Ok(DispatchOutcome::NoResponse);
            };
            let params = obj.get("params").cloned().unwrap_or_else(|| json!({}));
            let call = match serde_json::from_value::<ToolCallParams>(params) {
                Ok(call) => call,
                Err(err) => {
                    return write_response(
                        writer,
                        jsonrpc_error(
                            Some(id),
                            -32602,
                            "Invalid params for tools/call",
                            Some(json!({ "details": err.to_string() })),
                        ),
                    );
                }
            };
            debug!("tools/call {}", call.name);
            let result = tool_call_result(config, call);
            write_response(writer, jsonrpc_response(id, result))
        }
        "exit" => Ok(DispatchOutcome::Exit),
        _ => {
            if id.is_none() {
                return Ok(DispatchOutcome::NoResponse);
            }
            write_response(
                writer,
                jsonrpc_error(id, -32601, &format!("Method '{method}' not found"), None),
            )
        }
    }
}
