use serde::{Deserialize, Serialize};

use super::message::{Message, ToolRequest};

/// Reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of turn or a stop sequence matched
    Stop,
    /// Hit the token limit
    Length,
    /// Model decided to call a tool
    ToolCall,
    /// Output was refused or filtered
    ContentFilter,
    /// Anything else, including degraded completions
    Other,
}

impl FinishReason {
    /// Map a provider stop reason; unknown or missing values become `Other`
    pub fn from_stop_reason(stop_reason: Option<&str>) -> Self {
        match stop_reason {
            Some("end_turn" | "stop_sequence") => Self::Stop,
            Some("max_tokens") => Self::Length,
            Some("tool_use") => Self::ToolCall,
            Some("refusal") => Self::ContentFilter,
            _ => Self::Other,
        }
    }
}

/// Token usage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub input_tokens: u32,
    /// Tokens generated
    pub output_tokens: u32,
    /// Sum of input and output tokens
    pub total_tokens: u32,
}

impl Usage {
    /// Build counters from input and output token counts
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}

/// Canonical generation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Why generation stopped
    pub finish_reason: FinishReason,
    /// Extra detail about the finish (e.g. the matched stop sequence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_message: Option<String>,
    /// Generated message, always with role `model`
    pub message: Message,
    /// Token usage, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl GenerateResponse {
    /// Concatenated text of the output message
    pub fn text(&self) -> String {
        self.message.text()
    }

    /// Tool requests in the output message
    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.message.tool_requests().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_reasons_map_to_finish_reasons() {
        assert_eq!(FinishReason::from_stop_reason(Some("end_turn")), FinishReason::Stop);
        assert_eq!(FinishReason::from_stop_reason(Some("stop_sequence")), FinishReason::Stop);
        assert_eq!(FinishReason::from_stop_reason(Some("max_tokens")), FinishReason::Length);
        assert_eq!(FinishReason::from_stop_reason(Some("tool_use")), FinishReason::ToolCall);
        assert_eq!(FinishReason::from_stop_reason(Some("refusal")), FinishReason::ContentFilter);
    }

    #[test]
    fn unknown_stop_reason_is_other() {
        assert_eq!(FinishReason::from_stop_reason(Some("pause_turn")), FinishReason::Other);
        assert_eq!(FinishReason::from_stop_reason(None), FinishReason::Other);
    }

    #[test]
    fn usage_totals_saturate() {
        assert_eq!(Usage::new(10, 5).total_tokens, 15);
        assert_eq!(Usage::new(u32::MAX, 1).total_tokens, u32::MAX);
    }
}
