//! Prompts for extracting holdings, sectors and asset allocation.

/// System message sent with every relay request.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant designed to extract and format financial data into clean tables or lists.";

/// Name used in the analysis request when the user left it blank.
pub const DEFAULT_FUND_NAME: &str = "the fund";

/// Name used in the manual prompt when the user left it blank.
pub const DEFAULT_MANUAL_FUND_NAME: &str = "the specified fund";

/// User prompt the relay forwards to the provider.
pub fn relay_prompt(fund_name: &str, text_chunk: &str) -> String {
    format!(
        "From the following text about the financial fund '{fund_name}', please extract the data for \"Top Holdings\", \"Top Sectors\", and the asset allocation (Large Cap, Mid Cap, Small Cap, Cash & Equivalent, Others).

Please format the output cleanly. For Holdings and Sectors, list each item with its percentage. For asset allocation, list each category with its percentage. If any data is not available, please state \"Not Found\".

Present the final output in a clear, easy-to-read format. Use markdown for tables if possible.

--- TEXT FROM PDF ---
{text_chunk}
--- END OF TEXT ---"
    )
}

/// Self-contained prompt a user can paste into any chat model when the
/// automatic analysis failed.
pub fn manual_prompt(fund_name: &str, page_text: &str) -> String {
    let fund_name = non_blank_or(fund_name, DEFAULT_MANUAL_FUND_NAME);
    format!(
        "Please analyze this financial document text related to '{fund_name}' and extract:

1. Top Holdings (with percentages)
2. Top Sectors (with percentages)
3. Asset Allocation (e.g., Large Cap, Mid Cap, Small Cap, Cash & Equivalent, Others, with percentages)

Format the results clearly. If any data is not available, please state \"Not Found\".

--- TEXT TO ANALYZE ---
{page_text}
--- END OF TEXT ---"
    )
}

/// Trimmed `value`, or `fallback` when it is blank.
pub fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}
