//! Request conversion to the Gemini `generateContent` body

use super::content::{Content, Part};
use super::messages::LlmRequest;
use crate::error::AgentResult;
use crate::tools::ToolSchema;
use serde_json::{Value, json};

/// Build the JSON body for a `generateContent` call
pub fn to_google_request(request: &LlmRequest) -> AgentResult<Value> {
    let contents: Vec<Content> = request.contents.iter().map(strip_call_ids).collect();
    let mut body = json!({ "contents": contents });

    if let Some(instruction) = request
        .system_instruction
        .as_deref()
        .filter(|s| !s.is_empty())
    {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }

    if !request.tools.is_empty() {
        body["tools"] = json!([{
            "functionDeclarations": to_google_tools(&request.tools)
        }]);
    }

    if !request.generation.is_empty() {
        body["generationConfig"] = serde_json::to_value(&request.generation)?;
    }

    Ok(body)
}

/// Function declarations for the `tools` field
pub fn to_google_tools(tools: &[ToolSchema]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            let mut declaration = json!({
                "name": tool.name,
                "description": tool.description,
            });
            // Gemini rejects OBJECT schemas with no properties
            if tool.has_parameters() {
                declaration["parameters"] = tool.parameters.clone();
            }
            declaration
        })
        .collect()
}

/// Call ids are assigned client-side and must not reach the API
fn strip_call_ids(content: &Content) -> Content {
    let parts = content
        .parts
        .iter()
        .map(|part| match part {
            Part::FunctionCall(call) => {
                let mut call = call.clone();
                call.id = None;
                Part::FunctionCall(call)
            }
            Part::FunctionResponse(response) => {
                let mut response = response.clone();
                response.id = None;
                Part::FunctionResponse(response)
            }
            other => other.clone(),
        })
        .collect();

    Content::new(content.role, parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::content::{FunctionCall, Role};
    use crate::llm::messages::GenerationConfig;
    use crate::tools::empty_object_schema;

    fn request() -> LlmRequest {
        LlmRequest {
            model: "gemini-2.0-flash".to_string(),
            system_instruction: Some("Help user with Math operations.".to_string()),
            contents: vec![
                Content::user_text("How much is 475 * 23?"),
                Content::new(
                    Role::Model,
                    vec![Part::FunctionCall(FunctionCall {
                        id: Some("adk-1234".to_string()),
                        name: "multiply".to_string(),
                        args: json!({"a": 475, "b": 23}),
                    })],
                ),
                Content::new(
                    Role::User,
                    vec![Part::function_response(
                        Some("adk-1234".to_string()),
                        "multiply",
                        json!({"result": "10925"}),
                    )],
                ),
            ],
            tools: vec![
                ToolSchema::new(
                    "multiply",
                    "Multiply two numbers",
                    json!({"type": "object", "properties": {"a": {"type": "number"}, "b": {"type": "number"}}}),
                ),
                ToolSchema::new("now", "Current time", empty_object_schema()),
            ],
            generation: GenerationConfig::default(),
        }
    }

    #[test]
    fn test_request_body() {
        let body = to_google_request(&request()).unwrap();

        assert_eq!(
            body["systemInstruction"],
            json!({"parts": [{"text": "Help user with Math operations."}]})
        );
        assert_eq!(body["contents"][0], json!({"role": "user", "parts": [{"text": "How much is 475 * 23?"}]}));
        assert!(body.get("generationConfig").is_none());

        let declarations = &body["tools"][0]["functionDeclarations"];
        assert_eq!(declarations[0]["name"], "multiply");
        assert_eq!(declarations[0]["parameters"]["properties"]["a"]["type"], "number");
        assert!(declarations[1].get("parameters").is_none());
    }

    #[test]
    fn test_call_ids_are_stripped() {
        let body = to_google_request(&request()).unwrap();

        assert_eq!(
            body["contents"][1]["parts"][0],
            json!({"functionCall": {"name": "multiply", "args": {"a": 475, "b": 23}}})
        );
        assert_eq!(
            body["contents"][2]["parts"][0],
            json!({"functionResponse": {"name": "multiply", "response": {"result": "10925"}}})
        );
    }

    #[test]
    fn test_generation_config() {
        let mut req = request();
        req.system_instruction = None;
        req.tools.clear();
        req.generation = GenerationConfig {
            temperature: Some(0.5),
            max_output_tokens: Some(1024),
            ..GenerationConfig::default()
        };

        let body = to_google_request(&req).unwrap();
        assert_eq!(
            body["generationConfig"],
            json!({"temperature": 0.5, "maxOutputTokens": 1024})
        );
        assert!(body.get("systemInstruction").is_none());
        assert!(body.get("tools").is_none());
    }
}
