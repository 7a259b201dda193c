//! Literature search: esearch for identifiers, then esummary for records.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, parse_input};
use crate::error::ToolResult;
use crate::models::SearchPubmedInput;
use crate::normalize::{esearch_ids, esummary_citations};
use crate::query::build_pubmed_search;

/// PubMed search tool.
pub struct SearchPubmedTool;

#[async_trait::async_trait]
impl McpTool for SearchPubmedTool {
    fn name(&self) -> &'static str {
        "search_pubmed"
    }

    fn description(&self) -> &'static str {
        "Find PubMed citations linked to a trial (by NCT identifier) or matching a \
         free-text Entrez query."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "nct_id": {
                    "type": "string",
                    "pattern": "^NCT\\d{8}$",
                    "description": "Trial identifier; takes precedence over query"
                },
                "query": {
                    "type": "string",
                    "description": "Entrez query term"
                },
                "retmax": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 200
                },
                "sort": {
                    "type": "string",
                    "enum": ["RELEVANCE", "PUB_DATE"]
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let params: SearchPubmedInput = parse_input(input)?;
        let search = build_pubmed_search(&params, &ctx.limits)?;

        let ids = esearch_ids(&*ctx.client.esearch(&search).await?);
        if ids.is_empty() {
            return Ok(json!({ "citations": [], "query_used": search }));
        }

        let summaries = ctx.client.esummary(&ids).await?;
        Ok(json!({
            "citations": esummary_citations(&summaries),
            "query_used": search,
        }))
    }
}
