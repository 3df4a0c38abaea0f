//! Calculator tool: arithmetic on two numbers.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Tool, ToolError};

/// Performs arithmetic on two numbers. Supported operators: add, sub, mul,
/// div. Divide by zero and unknown operators come back as `error` payloads,
/// not failures; the model is expected to read them and recover.
pub struct CalculatorTool;

fn number(args: &Value, key: &str) -> Result<f64, String> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| format!("missing or non-numeric '{key}'"))
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Performs arithmetic operations of two numbers. Supported operations: add, sub, mul, div."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "first": { "type": "number" },
                "second": { "type": "number" },
                "operator": { "type": "string", "enum": ["add", "sub", "mul", "div"] }
            },
            "required": ["first", "second", "operator"]
        })
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let first = match number(&args, "first") {
            Ok(n) => n,
            Err(e) => return Ok(json!({ "error": e })),
        };
        let second = match number(&args, "second") {
            Ok(n) => n,
            Err(e) => return Ok(json!({ "error": e })),
        };
        let operator = args.get("operator").and_then(Value::as_str).unwrap_or("");

        let result = match operator {
            "add" => first + second,
            "sub" => first - second,
            "mul" => first * second,
            "div" => {
                if second == 0.0 {
                    return Ok(json!({ "error": "Cannot divide by zero" }));
                }
                first / second
            }
            _ => return Ok(json!({ "error": "Invalid operator" })),
        };

        Ok(json!({
            "first_number": first,
            "second_number": second,
            "operation": operator,
            "result": result,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: 2 add 3 yields result 5 with the operands echoed back.
    #[tokio::test]
    async fn add_two_and_three() {
        let out = CalculatorTool
            .call(json!({"first": 2, "second": 3, "operator": "add"}))
            .await
            .unwrap();
        assert_eq!(out["result"], json!(5.0));
        assert_eq!(out["operation"], "add");
        assert_eq!(out["first_number"], json!(2.0));
    }

    /// **Scenario**: Each operator computes its operation.
    #[tokio::test]
    async fn all_operators() {
        for (op, expected) in [("sub", -1.0), ("mul", 6.0), ("div", 2.0 / 3.0)] {
            let out = CalculatorTool
                .call(json!({"first": 2, "second": 3, "operator": op}))
                .await
                .unwrap();
            assert_eq!(out["result"], json!(expected), "operator {}", op);
        }
    }

    /// **Scenario**: Division by zero is an error payload, not a failure.
    #[tokio::test]
    async fn divide_by_zero_is_error_payload() {
        let out = CalculatorTool
            .call(json!({"first": 1, "second": 0, "operator": "div"}))
            .await
            .unwrap();
        assert_eq!(out["error"], "Cannot divide by zero");
    }

    /// **Scenario**: Unknown operator is an error payload.
    #[tokio::test]
    async fn invalid_operator_is_error_payload() {
        let out = CalculatorTool
            .call(json!({"first": 1, "second": 2, "operator": "pow"}))
            .await
            .unwrap();
        assert_eq!(out["error"], "Invalid operator");
    }

    /// **Scenario**: Missing or non-numeric arguments are error payloads.
    #[tokio::test]
    async fn missing_argument_is_error_payload() {
        let out = CalculatorTool
            .call(json!({"second": 3, "operator": "add"}))
            .await
            .unwrap();
        assert!(out["error"].as_str().unwrap().contains("first"));

        let out = CalculatorTool
            .call(json!({"first": "two", "second": 3, "operator": "add"}))
            .await
            .unwrap();
        assert!(out["error"].as_str().unwrap().contains("first"));
    }
}
